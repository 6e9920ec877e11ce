//! Kotlin text emission.
//!
//! A recursive descent over the final IR with one function per node kind.
//! The IR already carries the source's grouping, so the emitter only decides
//! where the target's own precedence rules need extra parentheses and how
//! to lay text out.
//!
//! Declarations, calls and union-case constructors are rendered on one line
//! first. When that line reaches [`EmitConfig::line_limit`] they are rendered
//! again with one parameter or argument per line. Both attempts depend only on
//! the node, the indentation level and the limit.

mod decl;
mod expr;
pub mod operators;
mod stmt;

use tarn_core::ast::*;
use tarn_core::registry::Registry;

/// Layout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitConfig {
    /// Lines this long or longer are broken up where possible.
    pub line_limit: usize,
    /// One level of indentation.
    pub indentation: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            line_limit: 100,
            indentation: "    ".to_string(),
        }
    }
}

/// Whether two adjacent statements are printed without a blank line between them.
pub fn goes_together(previous: &Stmt, next: &Stmt) -> bool {
    matches!(
        (previous, next),
        (Stmt::Comment(_), Stmt::Comment(_))
            | (Stmt::Variable(_), Stmt::Variable(_))
            | (Stmt::Assignment(_), Stmt::Assignment(_))
            | (Stmt::Do(_), Stmt::Catch(_))
            | (Stmt::Catch(_), Stmt::Catch(_))
    ) || (previous.is_call_statement() && next.is_call_statement())
}

pub struct Emitter<'a> {
    registry: &'a Registry,
    config: &'a EmitConfig,
}

impl<'a> Emitter<'a> {
    pub fn new(registry: &'a Registry, config: &'a EmitConfig) -> Self {
        Self { registry, config }
    }

    /// Render a whole file. Top-level statements are gathered into `main`.
    pub fn emit_file(&self, file: &SourceFile) -> String {
        let mut out = String::new();
        self.statements(&file.declarations, 0, &mut out);

        if !file.statements.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str("fun main(args: Array<String>) {\n");
            self.statements(&file.statements, 1, &mut out);
            out.push_str("}\n");
        }
        out
    }

    fn indent(&self, level: usize) -> String {
        self.config.indentation.repeat(level)
    }

    fn line(&self, out: &mut String, level: usize, text: &str) {
        if !text.is_empty() {
            out.push_str(&self.indent(level));
            out.push_str(text);
        }
        out.push('\n');
    }

    /// Whether `text`, starting at `level`, stays under the line limit.
    fn fits(&self, level: usize, text: &str) -> bool {
        let first_line = text.lines().next().unwrap_or_default();
        self.indent(level).len() + first_line.chars().count() < self.config.line_limit
    }

    /// `head(items)tail` on one line, or with one item per line when that
    /// line would be too long. `render` is called again for the broken
    /// layout, one level deeper.
    fn list<T>(
        &self,
        level: usize,
        head: &str,
        items: &[T],
        tail: &str,
        render: impl Fn(&T, usize) -> String,
    ) -> String {
        let single: Vec<String> = items.iter().map(|item| render(item, level)).collect();
        let single = format!("{}({}){}", head, single.join(", "), tail);
        if items.is_empty() || self.fits(level, &single) {
            return single;
        }

        let inner = self.indent(level + 1);
        let broken: Vec<String> = items
            .iter()
            .map(|item| format!("{}{}", inner, render(item, level + 1)))
            .collect();
        format!("{}(\n{}\n{}){}", head, broken.join(",\n"), self.indent(level), tail)
    }

    /// A block body: `{`, the statements one level deeper, then `}` at `level`.
    fn block(&self, level: usize, statements: &[Stmt]) -> String {
        let mut out = String::from("{\n");
        self.statements(statements, level + 1, &mut out);
        out.push_str(&self.indent(level));
        out.push('}');
        out
    }

    fn statements(&self, statements: &[Stmt], level: usize, out: &mut String) {
        let mut previous: Option<&Stmt> = None;
        let mut index = 0;
        while index < statements.len() {
            let statement = &statements[index];
            let mut rendered = String::new();
            let mut last = statement;
            if let Stmt::Do(stmt) = statement {
                let catches: Vec<&CatchStmt> = statements[index + 1..]
                    .iter()
                    .map_while(|s| match s {
                        Stmt::Catch(c) => Some(c),
                        _ => None,
                    })
                    .collect();
                self.do_catch(stmt, &catches, level, &mut rendered);
                index += catches.len();
                last = &statements[index];
            } else {
                self.statement(statement, level, &mut rendered);
            }
            index += 1;

            // Statements with no target counterpart (platform imports) leave nothing behind.
            if rendered.is_empty() {
                continue;
            }
            if let Some(previous) = previous
                && !goes_together(previous, statement)
            {
                out.push('\n');
            }
            out.push_str(&rendered);
            previous = Some(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarn_core::helpers::build::*;

    #[test]
    fn test_goes_together() {
        assert!(goes_together(&comment("a"), &comment("b")));
        assert!(goes_together(&let_decl("a", None, Some(int(1))), &var_decl("b", None, Some(int(2)))));
        assert!(goes_together(
            &expr_stmt(call(decl("f"), vec![])),
            &expr_stmt(call(decl("g"), vec![]))
        ));
        assert!(goes_together(&assign(decl("a"), int(1)), &assign(decl("b"), int(2))));
        assert!(!goes_together(&let_decl("a", None, Some(int(1))), &expr_stmt(call(decl("f"), vec![]))));
        assert!(!goes_together(&expr_stmt(decl("f")), &expr_stmt(decl("g"))));
    }

    #[test]
    fn test_top_level_statements_go_into_main() {
        let file = source_file(
            "main.swift",
            vec![function("run", vec![])],
            vec![expr_stmt(call(decl("run"), vec![]))],
        );
        let registry = Registry::default();
        let config = EmitConfig::default();
        assert_eq!(
            Emitter::new(&registry, &config).emit_file(&file),
            "fun run() {\n}\n\nfun main(args: Array<String>) {\n    run()\n}\n"
        );
    }
}
