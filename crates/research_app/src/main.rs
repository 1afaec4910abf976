mod cli;
mod logging;
mod orchestrator;
mod render;

use anyhow::bail;
use clap::Parser;
use client_logging::research_info;
use research_core::{Phase, StagePlan};

use crate::orchestrator::Orchestrator;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::initialize(args.log.into());

    let config = args.research_config();
    config.validate()?;

    let plan = if config.include_reddit {
        StagePlan::multi_source()
    } else {
        StagePlan::pipeline()
    };
    research_info!("Using stage plan {}", plan.id());

    let mut orchestrator = Orchestrator::new(args.channel_settings(), plan)?;
    orchestrator.start(&args.query, config);
    if orchestrator.snapshot().phase != Phase::Running {
        bail!("query rejected: a research question needs at least 3 characters");
    }

    let mut printer = render::ProgressPrinter::new();
    printer.render(&orchestrator.snapshot());
    let view = orchestrator.run_to_terminal(|view| printer.render(view));
    render::print_final(&view);
    if view.phase == Phase::Failed {
        std::process::exit(1);
    }

    if let Some(text) = &args.refine {
        research_info!("Running follow-up refinement");
        orchestrator.refine(text);
        let view = orchestrator.run_to_terminal(|view| printer.render(view));
        if let Some(reason) = &view.refine_error {
            bail!("refinement failed: {reason}");
        }
        render::print_final(&view);
    }

    Ok(())
}
