//! Command-line interface for tarn.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tarn_codegen::EmitConfig;
use tarn_core::{ErrorCode, PassManagerConfig};
use tarn_core::passes::dump_trace_hook;

use crate::pipeline::TranslationConfig;

/// tarn - translate Swift syntax trees into Kotlin source
#[derive(Parser)]
#[command(name = "tarn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log progress (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate syntax trees (`*.ast.json`, or directories of them) to Kotlin
    Translate(TranslateArgs),

    /// Print the rewrite passes in execution order
    Passes {
        /// Mark a pass as disabled in the listing
        #[arg(long = "disable-pass", value_name = "ID")]
        disabled: Vec<String>,
    },
}

#[derive(Args)]
pub struct TranslateArgs {
    /// Syntax tree files or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write `<name>.kt` files here instead of standard output
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Render declarations and calls on one line while shorter than this
    #[arg(long, default_value_t = 100)]
    pub line_limit: usize,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    pub indent: usize,

    /// Skip a rewrite pass (repeatable)
    #[arg(long = "disable-pass", value_name = "ID")]
    pub disabled: Vec<String>,

    /// Translate one file at a time
    #[arg(long)]
    pub sequential: bool,

    /// Fail when any node could not be translated
    #[arg(short, long)]
    pub strict: bool,

    /// Fail on warnings too
    #[arg(long)]
    pub deny_warnings: bool,

    /// Hide diagnostics with this code (repeatable), e.g. `W4003`
    #[arg(long, value_name = "CODE")]
    pub suppress: Vec<ErrorCode>,

    /// Shell command that regenerates the side tables; run once if a query fails
    #[arg(long, value_name = "CMD")]
    pub refresh: Option<String>,

    /// Write a JSON summary of files and diagnostics
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Log the IR after every pass (at trace level)
    #[arg(long)]
    pub trace: bool,

    /// Print per-pass timing statistics
    #[arg(long)]
    pub stats: bool,
}

impl TranslateArgs {
    pub fn translation_config(&self) -> TranslationConfig {
        TranslationConfig {
            passes: pass_config(&self.disabled, self.trace),
            emit: EmitConfig {
                line_limit: self.line_limit,
                indentation: " ".repeat(self.indent),
            },
            parallel: !self.sequential,
            strict: self.strict,
            warnings_as_errors: self.deny_warnings,
            statistics: self.stats,
        }
    }
}

pub fn pass_config(disabled: &[String], trace: bool) -> PassManagerConfig {
    PassManagerConfig {
        disabled_passes: disabled.iter().cloned().collect(),
        trace: trace.then(dump_trace_hook),
        ..PassManagerConfig::default()
    }
}

impl Cli {
    /// Default log filter, overridable through `RUST_LOG`.
    pub fn log_filter(&self) -> &'static str {
        if let Commands::Translate(args) = &self.command
            && args.trace
        {
            return "trace";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
