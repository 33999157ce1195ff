//! CLI for training and inspecting three-handed NLHE CFR strategies.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use nlhe_solver_core::cfr::CfrSolver;
use nlhe_solver_core::config::TrainingConfig;
use nlhe_solver_core::export;
use nlhe_solver_core::StrategyTable;

#[derive(Parser)]
#[command(name = "nlhe-trainer")]
#[command(about = "Train CFR strategies for three-handed no-limit hold'em")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a strategy from a YAML config
    Train {
        /// Path to YAML config file
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured iteration count
        #[arg(long)]
        iterations: Option<u64>,
        /// Force full-tree traversal instead of Monte Carlo sampling
        #[arg(long)]
        full_tree: bool,
        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Run iterations in parallel batches
        #[arg(long)]
        parallel: bool,
    },
    /// Dump a saved strategy as an ASCII table
    Export {
        /// Strategy base path (reads <base>.current and <base>.sum)
        #[arg(short, long)]
        strategy: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only show info sets containing this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Write raise-first-in range files for the button and small blind
    Rfi {
        /// Strategy base path (reads <base>.current and <base>.sum)
        #[arg(short, long)]
        strategy: PathBuf,
        /// Number of preflop buckets the strategy was trained with
        #[arg(short, long, default_value = "20")]
        buckets: u32,
        /// Directory for the range files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

/// Terminal + timestamped file logging under `logs/`.
fn init_logging() -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all("logs")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{stamp}.log"))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])?;
    Ok(())
}

fn train(
    config_path: &PathBuf,
    iterations: Option<u64>,
    full_tree: bool,
    seed: Option<u64>,
    parallel: bool,
) -> Result<(), Box<dyn Error>> {
    let mut config = TrainingConfig::load(config_path)?;
    if let Some(n) = iterations {
        config.iterations = n;
    }
    if full_tree {
        config.monte_carlo = false;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let mut solver = CfrSolver::from_config(&config);

    let bar = ProgressBar::new(config.iterations);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} iters | {msg}",
    )?);
    let progress_bar = bar.clone();
    solver.set_progress_callback(Box::new(move |completed, stats| {
        progress_bar.set_position(completed);
        progress_bar.set_message(format!("{} info sets", stats.info_sets));
    }));

    if parallel {
        solver.train_parallel(config.iterations, config.monte_carlo);
    } else {
        solver.train(config.iterations, config.monte_carlo);
    }
    bar.finish();

    std::fs::create_dir_all(&config.output_dir)?;
    let base = PathBuf::from(&config.output_dir).join(&config.name);
    solver.save_strategy(&base)?;

    let stats = solver.stats();
    log::info!(
        "done: {} iterations, {} info sets, {:.1?} total",
        stats.iterations,
        stats.info_sets,
        stats.total_time
    );
    Ok(())
}

fn export(
    strategy: &PathBuf,
    output: Option<PathBuf>,
    filter: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let table = StrategyTable::new();
    table.load(strategy)?;
    match output {
        Some(path) => export::export_strategy_file(&table, path, filter)?,
        None => {
            let stdout = std::io::stdout();
            export::write_average_strategies(&table, &mut stdout.lock(), filter)?;
        }
    }
    Ok(())
}

fn rfi(strategy: &PathBuf, buckets: u32, output_dir: &std::path::Path) -> Result<(), Box<dyn Error>> {
    let table = StrategyTable::new();
    table.load(strategy)?;
    std::fs::create_dir_all(output_dir)?;
    let btn = output_dir.join("btn_rfi_range.txt");
    let sb = output_dir.join("sb_rfi_range.txt");
    export::write_rfi_ranges(&table, buckets, &btn, &sb)?;
    log::info!("RFI ranges written to {} and {}", btn.display(), sb.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    let cli = Cli::parse();
    match cli.command {
        Commands::Train {
            config,
            iterations,
            full_tree,
            seed,
            parallel,
        } => train(&config, iterations, full_tree, seed, parallel),
        Commands::Export {
            strategy,
            output,
            filter,
        } => export(&strategy, output, filter.as_deref()),
        Commands::Rfi {
            strategy,
            buckets,
            output_dir,
        } => rfi(&strategy, buckets, &output_dir),
    }
}
