mod cli;
mod inputs;
mod pipeline;

use clap::Parser;
use cli::{Cli, Commands, TranslateArgs, pass_config};
use owo_colors::OwoColorize;
use pipeline::PipelineResult;
use std::process;

fn translate(args: &TranslateArgs, verbose: bool) -> PipelineResult<()> {
    let config = args.translation_config();
    let inputs = inputs::collect_inputs(&args.inputs)?;
    let index = inputs::JsonIndex::new(args.refresh.clone());

    let report = pipeline::translate(inputs, &config, &index)?;
    pipeline::display_diagnostics(&report, pipeline::error_config(verbose, &args.suppress));

    let destinations = pipeline::plan_destinations(&report.outcomes, args.out_dir.as_deref())?;
    pipeline::write_outputs(&report.outcomes, &destinations)?;
    if let Some(path) = &args.report {
        pipeline::write_report(path, &report, &destinations)?;
    }

    log::info!("{}", pipeline::summary_line(&report));
    report.check(&config)
}

fn list_passes(disabled: &[String]) -> PipelineResult<()> {
    let manager = pipeline::build_pass_manager(pass_config(disabled, false))?;
    manager.print_execution_order();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    let result = match &cli.command {
        Commands::Translate(args) => translate(args, cli.verbose > 0),
        Commands::Passes { disabled } => list_passes(disabled),
    };

    if let Err(error) = result {
        eprintln!("{} {}", "error:".red().bold(), error);
        process::exit(1);
    }
}
