use crate::ast::{SourceFile, dump_file};
use crate::error::{Diagnostic, Severity};
use crate::registry::{Registry, RegistryBuilder};
use crate::visitor::Rewriter;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{
    calls, collection, control_flow, declarations, standard_library, switches, syntax, warnings,
};

/// Callback invoked after every pass with the pass id and the file as it
/// stands. Used for IR dumps while debugging a translation.
pub type TraceHook = Arc<dyn Fn(&str, &SourceFile) + Send + Sync>;

/// Which phase of the pipeline a pass belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassPhase {
    /// Runs once per file and records into the shared registries.
    Collection = 0,
    /// Runs per file after every file has been collected; reads the frozen registries.
    Transformation = 1,
}

/// Metadata about a rewrite pass
#[derive(Debug, Clone)]
pub struct PassMetadata {
    /// Unique identifier for the pass
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Description of what the pass does
    pub description: &'static str,
    /// Phase the pass runs in
    pub phase: PassPhase,
    /// Pass IDs that must run before this one
    pub dependencies: Vec<&'static str>,
}

/// Statistics about pass execution
#[derive(Debug, Clone, Default)]
pub struct PassStatistics {
    /// Number of times the pass has been run
    pub runs: usize,
    /// Total time spent in the pass
    pub total_duration: Duration,
    /// Average time per run
    pub average_duration: Duration,
    /// Number of errors reported
    pub errors_reported: usize,
    /// Number of warnings reported
    pub warnings_reported: usize,
}

impl PassStatistics {
    fn record_run(&mut self, duration: Duration, errors: usize, warnings: usize) {
        self.runs += 1;
        self.total_duration += duration;
        self.average_duration = self.total_duration / self.runs as u32;
        self.errors_reported += errors;
        self.warnings_reported += warnings;
    }
}

/// Configuration for the pass manager
#[derive(Clone)]
pub struct PassManagerConfig {
    /// Set of disabled pass IDs
    pub disabled_passes: HashSet<String>,
    /// Enable timing statistics
    pub collect_statistics: bool,
    /// Called after every pass
    pub trace: Option<TraceHook>,
}

impl Default for PassManagerConfig {
    fn default() -> Self {
        PassManagerConfig {
            disabled_passes: HashSet::new(),
            collect_statistics: true,
            trace: None,
        }
    }
}

impl fmt::Debug for PassManagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassManagerConfig")
            .field("disabled_passes", &self.disabled_passes)
            .field("collect_statistics", &self.collect_statistics)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}

/// Errors from building an execution order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("pass '{pass}' depends on unknown pass '{dependency}'")]
    UnknownDependency {
        pass: &'static str,
        dependency: &'static str,
    },

    #[error("circular dependency detected involving pass '{0}'")]
    Cycle(String),

    #[error("pass '{pass}' ({pass_phase:?}) cannot depend on '{dependency}' from a later phase")]
    PhaseInversion {
        pass: &'static str,
        pass_phase: PassPhase,
        dependency: &'static str,
    },
}

/// Owns the ordered list of passes and runs them over files.
///
/// A manager is shared between worker threads: running a pass only needs
/// `&self`, statistics are behind a mutex.
pub struct PassManager {
    config: PassManagerConfig,
    /// Registered passes in registration order
    passes: IndexMap<&'static str, PassMetadata>,
    /// Execution order (registration order, validated against dependencies)
    execution_order: Vec<&'static str>,
    statistics: Mutex<HashMap<&'static str, PassStatistics>>,
}

impl PassManager {
    /// Create a pass manager with the default configuration
    pub fn new() -> Self {
        Self::with_config(PassManagerConfig::default())
    }

    /// Create a pass manager with custom configuration
    pub fn with_config(config: PassManagerConfig) -> Self {
        let mut manager = PassManager {
            config,
            passes: IndexMap::new(),
            execution_order: Vec::new(),
            statistics: Mutex::new(HashMap::new()),
        };

        manager.register_default_passes();

        // The default table is static; an inconsistency is a programming error
        // caught by the tests, so fall back to registration order.
        if let Err(e) = manager.compute_execution_order() {
            log::error!("{}", e);
            manager.execution_order = manager.passes.keys().copied().collect();
        }

        manager
    }

    /// Register all default passes
    fn register_default_passes(&mut self) {
        use PassPhase::*;

        self.register_pass(PassMetadata {
            id: "clean_inheritances",
            name: "Clean Inheritances",
            description: "Strips conformances that only exist in the source language",
            phase: Collection,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "record_enums",
            name: "Record Enums",
            description: "Classifies every enum as payload-free or has-payload",
            phase: Collection,
            dependencies: vec!["clean_inheritances"],
        });

        self.register_pass(PassMetadata {
            id: "record_protocols",
            name: "Record Protocols",
            description: "Records protocol names",
            phase: Collection,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "record_functions",
            name: "Record Functions",
            description: "Maps function signatures to internal parameter names and purity",
            phase: Collection,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "record_types",
            name: "Record Types",
            description: "Records struct and class names",
            phase: Collection,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "remove_parentheses",
            name: "Remove Parentheses",
            description: "Drops parentheses the target syntax makes redundant",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "defers_to_finally",
            name: "Defers To Finally",
            description: "Wraps the statements after a defer in try/finally",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "remove_extensions",
            name: "Remove Extensions",
            description: "Turns extension members into top-level members with a receiver",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "optional_inits_to_factories",
            name: "Optional Initializers To Factories",
            description: "Rewrites failable initializers into static factories returning early",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "static_members_to_companion",
            name: "Static Members To Companion",
            description: "Hoists static members into one companion per type",
            phase: Transformation,
            dependencies: vec!["optional_inits_to_factories"],
        });

        self.register_pass(PassMetadata {
            id: "anonymous_parameters",
            name: "Anonymous Parameters",
            description: "Renames $0-style closure parameters",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "double_negatives_in_guards",
            name: "Double Negatives In Guards",
            description: "Collapses the double negation produced by lowering a negated guard",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "return_if_nil",
            name: "Return If Nil",
            description: "Rewrites `if (x == nil) { return }` into a nil-coalescing return",
            phase: Transformation,
            dependencies: vec!["double_negatives_in_guards"],
        });

        self.register_pass(PassMetadata {
            id: "capitalize_enum_cases",
            name: "Capitalize Enum Cases",
            description: "Tags enum case references with their emitted casing",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "is_checks_for_payload_cases",
            name: "Is Checks For Payload Cases",
            description: "Turns switch cases over has-payload enum cases into subtype checks",
            phase: Transformation,
            dependencies: vec!["capitalize_enum_cases"],
        });

        self.register_pass(PassMetadata {
            id: "switches_to_expressions",
            name: "Switches To Expressions",
            description: "Turns switches whose cases all return or assign into one expression",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "remove_breaks_in_switches",
            name: "Remove Breaks In Switches",
            description: "Drops trailing breaks and emptied default cases",
            phase: Transformation,
            dependencies: vec!["switches_to_expressions"],
        });

        self.register_pass(PassMetadata {
            id: "call_labels_to_parameter_names",
            name: "Call Labels To Parameter Names",
            description: "Replaces argument labels with the callee's parameter names",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "pure_calls",
            name: "Pure Calls",
            description: "Marks calls to functions declared pure",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "impure_switch_subjects",
            name: "Impure Switch Subjects",
            description: "Warns about pattern switches that re-evaluate an impure subject",
            phase: Transformation,
            dependencies: vec!["pure_calls", "is_checks_for_payload_cases"],
        });

        self.register_pass(PassMetadata {
            id: "mutable_value_types",
            name: "Mutable Value Types",
            description: "Warns about mutable stored properties in value types",
            phase: Transformation,
            dependencies: vec![],
        });

        self.register_pass(PassMetadata {
            id: "standard_library",
            name: "Standard Library",
            description: "Translates known standard-library members and warns about the rest",
            phase: Transformation,
            dependencies: vec![],
        });
    }

    /// Register a pass with the manager
    fn register_pass(&mut self, metadata: PassMetadata) {
        self.statistics
            .get_mut()
            .insert(metadata.id, PassStatistics::default());
        self.passes.insert(metadata.id, metadata);
    }

    /// Compute the execution order: phase first, then registration order,
    /// with every dependency placed before its dependents.
    fn compute_execution_order(&mut self) -> Result<(), OrderError> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();

        let mut pass_ids: Vec<_> = self.passes.keys().copied().collect();
        // Stable sort keeps registration order within a phase.
        pass_ids.sort_by_key(|id| self.passes.get(id).map(|p| p.phase));

        for pass_id in pass_ids {
            if !visited.contains(pass_id) {
                self.visit_pass(pass_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        self.execution_order = order;
        Ok(())
    }

    /// Visit a pass in topological sort (DFS)
    fn visit_pass(
        &self,
        pass_id: &'static str,
        visited: &mut HashSet<&'static str>,
        temp_mark: &mut HashSet<&'static str>,
        order: &mut Vec<&'static str>,
    ) -> Result<(), OrderError> {
        if visited.contains(pass_id) {
            return Ok(());
        }

        if temp_mark.contains(pass_id) {
            return Err(OrderError::Cycle(pass_id.to_string()));
        }

        temp_mark.insert(pass_id);

        if let Some(metadata) = self.passes.get(pass_id) {
            for &dep in &metadata.dependencies {
                let Some(dependency) = self.passes.get(dep) else {
                    return Err(OrderError::UnknownDependency {
                        pass: metadata.id,
                        dependency: dep,
                    });
                };
                if dependency.phase > metadata.phase {
                    return Err(OrderError::PhaseInversion {
                        pass: metadata.id,
                        pass_phase: metadata.phase,
                        dependency: dep,
                    });
                }
                self.visit_pass(dependency.id, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(pass_id);
        visited.insert(pass_id);
        order.push(pass_id);
        Ok(())
    }

    fn enabled_passes(&self, phase: PassPhase) -> impl Iterator<Item = &'static str> + '_ {
        self.execution_order.iter().copied().filter(move |id| {
            self.passes.get(id).is_some_and(|p| p.phase == phase)
                && !self.config.disabled_passes.contains(*id)
        })
    }

    /// Run every enabled collection pass over one file.
    ///
    /// Collection may annotate the file (enum kinds, cleaned conformances),
    /// so it takes the file mutably.
    pub fn run_collection(&self, file: &mut SourceFile, registry: &RegistryBuilder) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for pass_id in self.enabled_passes(PassPhase::Collection) {
            let start = Instant::now();
            let reported = match pass_id {
                "clean_inheritances" => apply(collection::CleanInheritances, file),
                "record_enums" => apply(collection::RecordEnums::new(registry), file),
                "record_protocols" => collection::record_protocols(file, registry),
                "record_functions" => collection::record_functions(file, registry),
                "record_types" => collection::record_types(file, registry),
                _ => {
                    log::warn!("unknown collection pass '{}'", pass_id);
                    Vec::new()
                }
            };
            self.finish_pass(pass_id, start.elapsed(), file, &reported);
            diagnostics.extend(reported);
        }
        diagnostics
    }

    /// Run every enabled transformation pass over one file.
    ///
    /// Requires the frozen registry, so it can only start once collection has
    /// finished on every file.
    pub fn run_transformation(
        &self,
        mut file: SourceFile,
        registry: &Registry,
    ) -> (SourceFile, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        for pass_id in self.enabled_passes(PassPhase::Transformation) {
            let start = Instant::now();
            let reported = self.run_pass(pass_id, &mut file, registry);
            self.finish_pass(pass_id, start.elapsed(), &file, &reported);
            diagnostics.extend(reported);
        }
        (file, diagnostics)
    }

    /// Run a specific transformation pass
    fn run_pass(&self, pass_id: &str, file: &mut SourceFile, registry: &Registry) -> Vec<Diagnostic> {
        match pass_id {
            "remove_parentheses" => apply(syntax::RemoveParentheses, file),
            "defers_to_finally" => apply(control_flow::DefersToFinally, file),
            "remove_extensions" => apply(declarations::RemoveExtensions, file),
            "optional_inits_to_factories" => apply(declarations::OptionalInitsToFactories::default(), file),
            "static_members_to_companion" => apply(declarations::StaticMembersToCompanion, file),
            "anonymous_parameters" => apply(syntax::AnonymousParameters, file),
            "double_negatives_in_guards" => apply(syntax::DoubleNegativesInGuards, file),
            "return_if_nil" => apply(control_flow::ReturnIfNil, file),
            "capitalize_enum_cases" => apply(switches::CapitalizeEnumCases::new(registry), file),
            "is_checks_for_payload_cases" => apply(switches::IsChecksForPayloadCases, file),
            "switches_to_expressions" => apply(switches::SwitchesToExpressions, file),
            "remove_breaks_in_switches" => apply(switches::RemoveBreaksInSwitches, file),
            "call_labels_to_parameter_names" => {
                apply(calls::CallLabelsToParameterNames::new(registry), file)
            }
            "pure_calls" => apply(calls::PureCalls::new(registry), file),
            "impure_switch_subjects" => apply(switches::ImpureSwitchSubjects::default(), file),
            "mutable_value_types" => apply(warnings::MutableValueTypes::default(), file),
            "standard_library" => apply(standard_library::StandardLibrary::default(), file),
            _ => {
                log::warn!("unknown transformation pass '{}'", pass_id);
                Vec::new()
            }
        }
    }

    fn finish_pass(&self, pass_id: &'static str, duration: Duration, file: &SourceFile, reported: &[Diagnostic]) {
        let errors = reported.iter().filter(|d| d.severity == Severity::Error).count();
        let warnings = reported.len() - errors;

        log::trace!(
            "{}: {} finished in {:?} ({} warnings)",
            file.path.display(),
            pass_id,
            duration,
            warnings
        );

        if self.config.collect_statistics
            && let Some(stats) = self.statistics.lock().get_mut(pass_id)
        {
            stats.record_run(duration, errors, warnings);
        }

        if let Some(trace) = &self.config.trace {
            trace(pass_id, file);
        }
    }

    /// Run both phases over a single file, freezing a registry of its own.
    ///
    /// Convenient for tests and one-file translations; multi-file drivers
    /// must collect every file before transforming any.
    pub fn run_single(&self, mut file: SourceFile) -> (SourceFile, Registry, Vec<Diagnostic>) {
        let builder = RegistryBuilder::new();
        let mut diagnostics = self.run_collection(&mut file, &builder);
        let registry = builder.freeze();
        let (file, transformed) = self.run_transformation(file, &registry);
        diagnostics.extend(transformed);
        (file, registry, diagnostics)
    }

    /// Get statistics for all passes
    pub fn get_statistics(&self) -> HashMap<&'static str, PassStatistics> {
        self.statistics.lock().clone()
    }

    /// Get statistics for a specific pass
    pub fn get_pass_statistics(&self, pass_id: &str) -> Option<PassStatistics> {
        self.statistics.lock().get(pass_id).cloned()
    }

    /// Get all registered passes
    pub fn get_passes(&self) -> &IndexMap<&'static str, PassMetadata> {
        &self.passes
    }

    /// Get execution order
    pub fn get_execution_order(&self) -> &[&'static str] {
        &self.execution_order
    }

    /// Enable a pass
    pub fn enable_pass(&mut self, pass_id: &str) {
        self.config.disabled_passes.remove(pass_id);
    }

    /// Disable a pass
    pub fn disable_pass(&mut self, pass_id: &str) {
        self.config.disabled_passes.insert(pass_id.to_string());
    }

    pub fn is_known_pass(&self, pass_id: &str) -> bool {
        self.passes.contains_key(pass_id)
    }

    /// Get configuration
    pub fn config(&self) -> &PassManagerConfig {
        &self.config
    }

    /// Render the execution order, one pass per line
    pub fn format_execution_order(&self) -> String {
        let mut out = String::from("Rewrite Pass Execution Order:\n");
        out.push_str(&"=".repeat(50));
        out.push('\n');

        for (i, pass_id) in self.execution_order.iter().enumerate() {
            if let Some(metadata) = self.passes.get(pass_id) {
                let disabled = if self.config.disabled_passes.contains(*pass_id) {
                    " [disabled]"
                } else {
                    ""
                };
                out.push_str(&format!(
                    "{:2}. {} ({}, {:?}){}\n",
                    i + 1,
                    metadata.name,
                    metadata.id,
                    metadata.phase,
                    disabled
                ));
                if !metadata.dependencies.is_empty() {
                    out.push_str(&format!("    Dependencies: {:?}\n", metadata.dependencies));
                }
            }
        }
        out
    }

    /// Print execution order
    pub fn print_execution_order(&self) {
        print!("{}", self.format_execution_order());
    }

    /// Print statistics
    pub fn print_statistics(&self) {
        if !self.config.collect_statistics {
            eprintln!("Statistics collection is disabled");
            return;
        }

        let statistics = self.statistics.lock();
        eprintln!("\nRewrite Pass Statistics:");
        eprintln!("{}", "=".repeat(80));
        eprintln!(
            "{:<32} {:>8} {:>12} {:>12} {:>8}",
            "Pass", "Runs", "Total Time", "Avg Time", "Warnings"
        );
        eprintln!("{}", "-".repeat(80));

        for pass_id in &self.execution_order {
            if let Some(stats) = statistics.get(pass_id)
                && stats.runs > 0
                && let Some(metadata) = self.passes.get(pass_id)
            {
                eprintln!(
                    "{:<32} {:>8} {:>12.3?} {:>12.3?} {:>8}",
                    metadata.name,
                    stats.runs,
                    stats.total_duration,
                    stats.average_duration,
                    stats.warnings_reported,
                );
            }
        }
        eprintln!("{}", "=".repeat(80));
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one rewriter over the file in place and collect what it reported.
fn apply<R: Rewriter>(mut rewriter: R, file: &mut SourceFile) -> Vec<Diagnostic> {
    let taken = std::mem::take(file);
    *file = rewriter.rewrite_file(taken);
    rewriter.take_diagnostics()
}

/// A trace hook that logs a full IR dump after every pass.
pub fn dump_trace_hook() -> TraceHook {
    Arc::new(|pass_id: &str, file: &SourceFile| {
        log::trace!("after {}:\n{}", pass_id, dump_file(file));
    })
}
