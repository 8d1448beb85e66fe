/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    File contains main entrypoint for the Histogram Emulator.

--*/

use anyhow::{anyhow, Context};
use clap::Parser;
use histogram_hw_model::InitParams;
use simple_logger::SimpleLogger;
use std::fs::File;
use std::io::{self, Write};

mod cli;
mod config;
mod stimulus;

use cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _ = SimpleLogger::new().with_level(args.log_level()).init();

    let config = config::resolve(&args)?;
    let stimulus = stimulus::load_stimulus(&args.stimulus)?;

    let trace = match &args.trace {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create trace file {}", path.display()))?;
            Some(Box::new(file) as Box<dyn Write>)
        }
        None => None,
    };

    let mut model = histogram_hw_model::new(InitParams { config, trace })
        .map_err(|e| anyhow!("Failed to create model: {e}"))?;

    let stdout = io::stdout();
    let captures = stimulus::run(&mut model, &stimulus, args.max_cycles, &mut stdout.lock())?;
    log::info!(
        "{} steps, {} drains captured",
        stimulus.steps.len(),
        captures.len()
    );

    Ok(())
}
