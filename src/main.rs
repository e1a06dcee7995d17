use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use nand_cpu::components::clock::stop_channel;
use nand_cpu::console::{console_sinks, render_state};
use nand_cpu::BoardConfig;

/// Run the 1-bit computer on the terminal.
#[derive(Debug, Parser)]
#[command(name = "nand_cpu", version, about)]
struct Args {
    /// JSON board configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many half periods
    #[arg(short, long)]
    ticks: Option<u64>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    log_level: Option<String>,

    /// Override the clock half period
    #[arg(long)]
    half_period_ms: Option<u64>,
}

impl Args {
    fn board_config(&self) -> anyhow::Result<BoardConfig> {
        let mut config = match &self.config {
            Some(path) => BoardConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BoardConfig::default(),
        };
        if let Some(ticks) = self.ticks {
            config.max_ticks = Some(ticks);
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(ms) = self.half_period_ms {
            config.half_period_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.board_config()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level()?)
        .with_target(false)
        .init();

    let mut cpu = config
        .build(console_sinks(&config.console))
        .context("assembling the board")?;

    let sys = cpu.system_info();
    info!(
        board = %config.name,
        components = sys.component_count,
        inputs = sys.wiring.inputs,
        lines = sys.wiring.lines,
        half_period_ms = config.half_period_ms,
        program = %sys.program.join(", "),
        "starting"
    );
    if config.max_ticks.is_none() {
        println!("Press Ctrl+C to stop");
    }

    let (stopper, stop) = stop_channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => stopper.stop(),
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl+C");
                // keep the stopper alive, dropping it would stop the clock
                let _stopper = stopper;
                std::future::pending::<()>().await
            }
        }
    });

    let ticks = cpu.run(stop, config.max_ticks).await;
    println!("{}", render_state(&cpu.state(), config.console.color));
    info!(ticks, "stopped");
    Ok(())
}
