//! Runs the process-burst phase, then the dining philosophers.
//!
//! Ctrl-C cancels whichever phase is running; philosophers put their forks
//! down before exiting.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use symposium::{
    run_process_phase, BurstConfig, DiningTable, ForkOrder, SymposiumError, TableConfig,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "symposium")]
#[command(about = "Process-burst simulation followed by the dining philosophers", long_about = None)]
struct Args {
    /// Process records, one `<id> <seconds>` pair per line
    #[arg(long, default_value = "processes.txt")]
    processes: PathBuf,

    /// Wall milliseconds per burst second
    #[arg(long, default_value = "1000")]
    burst_unit_ms: u64,

    /// Skip the process-burst phase
    #[arg(long)]
    skip_bursts: bool,

    /// Philosophers (and forks) around the table
    #[arg(long, default_value = "5")]
    philosophers: usize,

    /// Think/eat cycles per philosopher
    #[arg(long, default_value = "3")]
    cycles: usize,

    /// Upper bound of the thinking pause in milliseconds
    #[arg(long, default_value = "1000")]
    max_think_ms: u64,

    /// Upper bound of the eating pause in milliseconds
    #[arg(long, default_value = "1000")]
    max_eat_ms: u64,

    /// Fork acquisition order
    #[arg(long, value_enum, default_value_t = ForkOrder::Asymmetric)]
    fork_order: ForkOrder,

    /// Pause between picking up the first and second fork, in milliseconds
    #[arg(long, default_value = "0")]
    pickup_pause_ms: u64,

    /// Cancel the table if it has not finished after this many milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Seed for pause durations (uses the thread RNG if not provided)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the dining report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn burst_config(&self) -> BurstConfig {
        BurstConfig {
            input: self.processes.clone(),
            burst_unit: Duration::from_millis(self.burst_unit_ms),
        }
    }

    fn table_config(&self) -> TableConfig {
        TableConfig {
            seats: self.philosophers,
            cycles: self.cycles,
            think_time: Duration::ZERO..Duration::from_millis(self.max_think_ms),
            eat_time: Duration::ZERO..Duration::from_millis(self.max_eat_ms),
            fork_order: self.fork_order,
            pickup_pause: Duration::from_millis(self.pickup_pause_ms),
            deadline: self.deadline_ms.map(Duration::from_millis),
            seed: self.seed,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SymposiumError::from)
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args))
}

async fn run(args: Args) -> ExitCode {
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling");
                shutdown.cancel();
            }
        }
    });

    if args.skip_bursts {
        tracing::info!("process simulation skipped");
    } else {
        match run_process_phase(&args.burst_config(), &shutdown).await {
            Ok(report) => println!("{report}"),
            Err(err) => eprintln!("process simulation aborted: {err}"),
        }
    }

    let table = match DiningTable::new(args.table_config()) {
        Ok(table) => table.shutdown(shutdown.clone()),
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let report = table.run().await;

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => tracing::error!(error = %err, "failed to encode report"),
        }
    } else {
        println!("{report}");
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
