use std::path::PathBuf;
use std::process::exit;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use growpool::{DynamicThreadPool, PoolConfig, Result, ShutdownPolicy};

const DEFAULT_MAX_THREADS: usize = 256;
const DEFAULT_INITIAL_THREADS: usize = 50;
const DEFAULT_JOBS: usize = 200;

#[derive(Parser)]
#[command(name = "pool-demo", version, about = "Exercises a dynamically growing thread pool")]
struct Cli {
    /// Upper bound on worker threads
    #[arg(long, value_name = "N")]
    max_threads: Option<usize>,

    /// Workers spawned when the pool is created
    #[arg(long, value_name = "N")]
    initial_threads: Option<usize>,

    /// Number of jobs to submit
    #[arg(long, default_value_t = DEFAULT_JOBS, value_name = "N")]
    jobs: usize,

    /// How long each job sleeps
    #[arg(long, default_value_t = 1000, value_name = "MS")]
    job_duration_ms: u64,

    /// How long to wait after submitting before shutting down
    #[arg(long, default_value_t = 3000, value_name = "MS")]
    settle_ms: u64,

    /// Run queued jobs at shutdown instead of discarding them
    #[arg(long)]
    drain: bool,

    /// JSON pool configuration; command-line flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    info!("pool-demo {}", env!("CARGO_PKG_VERSION"));
    info!(
        "Pool: max {} threads, {} initial, {:?} on shutdown",
        config.max_threads, config.initial_threads, config.shutdown_policy
    );

    let pool = DynamicThreadPool::with_config(config)?;
    let job_duration = Duration::from_millis(cli.job_duration_ms);

    for index in 0..cli.jobs {
        pool.submit(
            move |index: usize| {
                info!(">>>> Worker {} callback function", index);
                thread::sleep(job_duration);
            },
            index,
        )?;
    }
    info!("Submitted {} jobs", cli.jobs);

    thread::sleep(Duration::from_millis(cli.settle_ms));

    let report = pool.shutdown()?;
    let stats = pool.stats();
    println!("{}", serde_json::to_string(&report)?);
    println!("{}", serde_json::to_string(&stats)?);
    println!(
        "executed {} of {} jobs, discarded {}",
        stats.completed + stats.panicked,
        stats.submitted,
        stats.discarded
    );

    Ok(())
}

/// Layers command-line flags over the config file, or over the demo defaults.
fn resolve_config(cli: &Cli) -> Result<PoolConfig> {
    let mut config = match &cli.config {
        Some(path) => PoolConfig::from_file(path)?,
        None => PoolConfig::new(DEFAULT_MAX_THREADS, DEFAULT_INITIAL_THREADS),
    };

    if let Some(max_threads) = cli.max_threads {
        config.max_threads = max_threads;
    }
    if let Some(initial_threads) = cli.initial_threads {
        config.initial_threads = initial_threads;
    }
    if cli.drain {
        config.shutdown_policy = ShutdownPolicy::Drain;
    }

    Ok(config)
}
