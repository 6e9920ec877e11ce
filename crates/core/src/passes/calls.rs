//! Call-site rewrites that need the function registry.

use crate::ast::*;
use crate::registry::Registry;
use crate::visitor::{Rewriter, mut_walk};

/// Replaces argument labels with the callee's internal parameter names,
/// which is what the target's named arguments refer to.
///
/// A callee missing from the registry keeps the labels as written.
pub struct CallLabelsToParameterNames<'a> {
    registry: &'a Registry,
}

impl<'a> CallLabelsToParameterNames<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        CallLabelsToParameterNames { registry }
    }
}

fn relabel_tuple(tuple: &mut TupleExpr, names: &[String]) {
    if tuple.pairs.len() != names.len() {
        return;
    }
    for (pair, name) in tuple.pairs.iter_mut().zip(names) {
        if pair.label.is_some() {
            pair.label = Some(name.clone());
        }
    }
}

/// Once a slot falls back to its default, every later slot must be named.
fn relabel_shuffle(shuffle: &mut TupleShuffleExpr, names: &[String]) {
    if shuffle.labels().len() != names.len() {
        return;
    }
    let mut after_absent = false;
    let labels: Vec<Option<String>> = shuffle
        .labels()
        .iter()
        .zip(shuffle.indices())
        .zip(names)
        .map(|((label, index), name)| {
            let named = match index {
                ShuffleIndex::Absent => {
                    after_absent = true;
                    false
                }
                _ => label.is_some() || after_absent,
            };
            named.then(|| name.clone())
        })
        .collect();
    if let Err(e) = shuffle.relabel(labels) {
        log::debug!("keeping call labels: {}", e);
    }
}

impl Rewriter for CallLabelsToParameterNames<'_> {
    fn replace_call(&mut self, call: CallExpr) -> Expr {
        let mut call = mut_walk::walk_call(self, call);
        let Some(names) = call
            .signature_key()
            .and_then(|key| self.registry.parameter_names(&key))
        else {
            return Expr::Call(call);
        };
        match call.arguments.as_mut() {
            Expr::Tuple(tuple) => relabel_tuple(tuple, names),
            Expr::TupleShuffle(shuffle) => relabel_shuffle(shuffle, names),
            _ => {}
        }
        Expr::Call(call)
    }
}

/// Marks calls to functions declared pure.
pub struct PureCalls<'a> {
    registry: &'a Registry,
}

impl<'a> PureCalls<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        PureCalls { registry }
    }
}

impl Rewriter for PureCalls<'_> {
    fn replace_call(&mut self, call: CallExpr) -> Expr {
        let mut call = mut_walk::walk_call(self, call);
        if !call.is_pure
            && call
                .signature_key()
                .is_some_and(|key| self.registry.is_pure(&key))
        {
            call.is_pure = true;
        }
        Expr::Call(call)
    }
}
