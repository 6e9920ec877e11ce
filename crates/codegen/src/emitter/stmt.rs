//! Statement emission

use super::Emitter;
use super::expr::error_marker;
use super::operators::Precedence;
use crate::names::escape_identifier;
use crate::types::translate_type;
use tarn_core::ast::*;

fn is_range(expr: &Expr) -> bool {
    matches!(expr.unparenthesized(), Expr::Binary(b) if b.op == "..." || b.op == "..<")
}

impl Emitter<'_> {
    pub(super) fn statement(&self, statement: &Stmt, level: usize, out: &mut String) {
        match statement {
            Stmt::Import(s) => self.import(s, level, out),
            Stmt::Class(s) => self.class(s, level, out),
            Stmt::Struct(s) => self.structure(s, level, out),
            Stmt::Protocol(s) => self.protocol(s, level, out),
            Stmt::Enum(s) => self.enumeration(s, level, out),
            Stmt::Extension(s) => self.extension(s, level, out),
            Stmt::Companion(s) => self.companion(s, level, out),
            Stmt::Function(s) => self.function(s, level, out),
            Stmt::Variable(s) => self.variable(s, level, out),
            Stmt::If(s) => self.if_statement(s, level, out),
            Stmt::Switch(s) => self.switch(s, level, out),
            Stmt::ForEach(s) => {
                let text = format!(
                    "for ({} in {}) {}",
                    self.loop_variable(&s.variable, level),
                    self.expr(&s.collection, level),
                    self.block(level, &s.statements)
                );
                self.line(out, level, &text);
            }
            Stmt::While(s) => {
                let text = format!("while ({}) {}", self.expr(&s.condition, level), self.block(level, &s.statements));
                self.line(out, level, &text);
            }
            Stmt::Do(s) => self.do_catch(s, &[], level, out),
            Stmt::Catch(_) => self.line(out, level, &error_marker("catch without a preceding do")),
            Stmt::Defer(_) => self.line(out, level, &error_marker("defer outside of a do block")),
            Stmt::Throw(s) => self.line(out, level, &format!("throw {}", self.expr(&s.expr, level))),
            Stmt::Return(s) => match &s.expr {
                Some(expr) => self.line(out, level, &format!("return {}", self.expr(expr, level))),
                None => self.line(out, level, "return"),
            },
            Stmt::Break(_) => self.line(out, level, "break"),
            Stmt::Continue(_) => self.line(out, level, "continue"),
            Stmt::Assignment(s) => {
                let text = format!("{} = {}", self.expr(&s.lhs, level), self.expr(&s.rhs, level));
                self.line(out, level, &text);
            }
            Stmt::Expression(s) => self.line(out, level, &self.expr(&s.expr, level)),
            Stmt::Comment(s) => {
                for text in s.text.lines() {
                    self.line(out, level, format!("// {}", text.trim()).trim_end());
                }
            }
            Stmt::Error(s) => self.line(out, level, &error_marker(&s.diagnostic.message)),
        }
    }

    fn loop_variable(&self, variable: &Expr, level: usize) -> String {
        match variable {
            Expr::Tuple(tuple) => {
                let names: Vec<String> = tuple.pairs.iter().map(|p| self.expr(&p.expr, level)).collect();
                format!("({})", names.join(", "))
            }
            other => self.expr(other, level),
        }
    }

    /// Declarations bound by the conditions, and one boolean test per condition.
    fn conditions<'s>(&self, conditions: &'s [IfCondition], level: usize) -> (Vec<&'s VariableDecl>, Vec<String>) {
        let mut declarations = Vec::new();
        let mut tests = Vec::new();
        for condition in conditions {
            match condition {
                IfCondition::Condition(expr) => {
                    tests.push(self.operand(expr, level, Precedence::Conjunction, false));
                }
                IfCondition::Declaration(declaration) => {
                    tests.push(format!("{} != null", escape_identifier(&declaration.name)));
                    declarations.push(declaration);
                }
            }
        }
        (declarations, tests)
    }

    fn if_statement(&self, stmt: &IfStmt, level: usize, out: &mut String) {
        let (declarations, tests) = self.conditions(&stmt.conditions, level);
        for declaration in declarations {
            self.variable(declaration, level, out);
        }
        let condition = if !stmt.is_guard {
            tests.join(" && ")
        } else if stmt.conditions.iter().all(|c| matches!(c, IfCondition::Declaration(_))) {
            stmt.conditions
                .iter()
                .filter_map(|c| match c {
                    IfCondition::Declaration(d) => Some(format!("{} == null", escape_identifier(&d.name))),
                    IfCondition::Condition(_) => None,
                })
                .collect::<Vec<_>>()
                .join(" || ")
        } else {
            self.negation(&stmt.conditions, tests, level)
        };
        let mut text = format!("if ({}) {}", condition, self.block(level, &stmt.statements));
        self.else_branch(stmt, level, &mut text);
        self.line(out, level, &text);
    }

    /// `!(a && b)`, or `!a` when a single test binds tighter than `!`.
    fn negation(&self, conditions: &[IfCondition], tests: Vec<String>, level: usize) -> String {
        if let [IfCondition::Condition(expr)] = conditions {
            let single = self.operand(expr, level, Precedence::Prefix, false);
            return format!("!{}", single);
        }
        format!("!({})", tests.join(" && "))
    }

    fn else_branch(&self, stmt: &IfStmt, level: usize, text: &mut String) {
        let Some(else_statements) = &stmt.else_statements else {
            return;
        };
        match else_statements.as_slice() {
            [Stmt::If(inner)]
                if !inner.is_guard && inner.conditions.iter().all(|c| matches!(c, IfCondition::Condition(_))) =>
            {
                let (_, tests) = self.conditions(&inner.conditions, level);
                text.push_str(&format!(
                    " else if ({}) {}",
                    tests.join(" && "),
                    self.block(level, &inner.statements)
                ));
                self.else_branch(inner, level, text);
            }
            statements => {
                text.push_str(" else ");
                text.push_str(&self.block(level, statements));
            }
        }
    }

    fn switch(&self, stmt: &SwitchStmt, level: usize, out: &mut String) {
        let subjectless = stmt.uses_conditions();
        let mut text = if subjectless {
            "when {\n".to_string()
        } else {
            format!("when ({}) {{\n", self.expr(&stmt.subject, level))
        };

        let inner = self.indent(level + 1);
        for case in &stmt.cases {
            let label = if case.is_default() {
                "else".to_string()
            } else if subjectless {
                let tests: Vec<String> = case
                    .expressions
                    .iter()
                    .map(|e| self.condition_case(stmt, e, level + 1))
                    .collect();
                tests.join(" || ")
            } else {
                let values: Vec<String> = case
                    .expressions
                    .iter()
                    .map(|e| self.subject_case(stmt, e, level + 1))
                    .collect();
                values.join(", ")
            };
            text.push_str(&format!("{}{} -> {}\n", inner, label, self.case_body(&case.statements, level + 1)));
        }
        text.push_str(&self.indent(level));
        text.push('}');

        let text = match &stmt.converts_to {
            None => text,
            Some(SwitchTarget::Return) => format!("return {}", text),
            Some(SwitchTarget::Assign(lhs)) => format!("{} = {}", self.expr(lhs, level), text),
            Some(SwitchTarget::Declare(declaration)) => {
                format!("{} = {}", self.variable_head(declaration), text)
            }
        };
        self.line(out, level, &text);
    }

    /// A case of a subjectless `when`: a full boolean test.
    fn condition_case(&self, stmt: &SwitchStmt, expr: &Expr, level: usize) -> String {
        if stmt.is_condition(expr) {
            return self.operand(expr, level, Precedence::Disjunction, false);
        }
        let (op, precedence) = if is_range(expr) {
            ("in", Precedence::NamedCheck)
        } else {
            ("==", Precedence::Equality)
        };
        format!(
            "{} {} {}",
            self.operand(&stmt.subject, level, precedence, false),
            op,
            self.operand(expr, level, precedence, true)
        )
    }

    /// A case of a `when (subject)`: a value, a range or a type check.
    fn subject_case(&self, stmt: &SwitchStmt, expr: &Expr, level: usize) -> String {
        match expr.unparenthesized() {
            Expr::Binary(b) if stmt.is_subject_check(expr) => format!("is {}", self.expr(&b.rhs, level)),
            other if is_range(other) => format!("in {}", self.expr(other, level)),
            other => self.expr(other, level),
        }
    }

    /// One-statement bodies stay on the case's line.
    fn case_body(&self, statements: &[Stmt], level: usize) -> String {
        if statements.is_empty() {
            return "{}".to_string();
        }
        let mut rendered = String::new();
        self.statements(statements, level, &mut rendered);
        if statements.len() == 1 && rendered.lines().count() == 1 && !matches!(statements[0], Stmt::Variable(_)) {
            return rendered.trim().to_string();
        }
        self.block(level, statements)
    }

    pub(super) fn do_catch(&self, stmt: &DoStmt, catches: &[&CatchStmt], level: usize, out: &mut String) {
        if catches.is_empty() && stmt.finally_statements.is_empty() {
            self.line(out, level, &format!("run {}", self.block(level, &stmt.statements)));
            return;
        }
        let mut text = format!("try {}", self.block(level, &stmt.statements));
        for catch in catches {
            let variable = match &catch.variable {
                Some(v) => format!(
                    "{}: {}",
                    escape_identifier(&v.name),
                    translate_type(v.ty.as_deref().unwrap_or("Error"))
                ),
                None => "error: Exception".to_string(),
            };
            text.push_str(&format!(" catch ({}) {}", variable, self.block(level, &catch.statements)));
        }
        if !stmt.finally_statements.is_empty() {
            text.push_str(" finally ");
            text.push_str(&self.block(level, &stmt.finally_statements));
        }
        self.line(out, level, &text);
    }
}
