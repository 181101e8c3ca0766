use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use songsim::config::AppConfig;
use songsim::recommend::Recommendation;
use songsim::session::{Session, SessionState};
use songsim::FEATURE_COLUMNS;
use std::path::PathBuf;

/// Most recommendations the CLI will show per query.
const MAX_TOP_N: u64 = 10;

#[derive(Parser)]
#[command(name = "songsim", version, about = "Content-based song recommender")]
struct Cli {
    /// Path to the song dataset (CSV)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Maximum number of songs in the working catalog (at least 2)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(2..))]
    cap: Option<u64>,

    /// Sampling seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Number of parallel workers (0 = auto-detect from config)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    jobs: usize,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List songs in the working catalog
    Songs {
        /// Only songs whose name contains this (case-insensitive)
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Recommend songs similar to a given song
    Recommend {
        /// Song name (exact match; first occurrence wins)
        #[arg(required_unless_present = "index")]
        song: Option<String>,

        /// Select the song by working-catalog row instead of name
        #[arg(long, conflicts_with = "song")]
        index: Option<usize>,

        /// Number of recommendations (1-10)
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..=MAX_TOP_N))]
        limit: Option<u64>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show catalog and normalization statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let mut config = AppConfig::load();
    if let Some(cap) = cli.cap {
        config.sample_cap = cap as usize;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if cli.jobs > 0 {
        config.workers = cli.jobs;
    }

    // Resolve dataset path: CLI > config
    let dataset = match cli.dataset.or(config.dataset.clone()) {
        Some(path) => path,
        None => anyhow::bail!(
            "No dataset given. Pass --dataset or set dataset in config."
        ),
    };
    log::info!("Dataset: {}", dataset.display());

    let table = songsim::catalog::loader::load_csv(&dataset)
        .with_context(|| format!("Failed to load {}", dataset.display()))?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} songs ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let mut state = SessionState::default();
    state
        .load(&table, &config.session_options(), &pb)
        .context("Failed to build recommender")?;
    let session = state
        .session()
        .context("Recommender is not initialized")?;

    match cli.command {
        Commands::Songs { filter, limit } => {
            let needle = filter.map(|f| f.to_lowercase());
            let matches: Vec<(usize, &String)> = session
                .names()
                .iter()
                .enumerate()
                .filter(|(_, name)| {
                    needle
                        .as_deref()
                        .is_none_or(|n| name.to_lowercase().contains(n))
                })
                .take(limit.unwrap_or(usize::MAX))
                .collect();

            if matches.is_empty() {
                println!("No songs found.");
                return Ok(());
            }

            println!("{:>6}  {}", "Index", "Song");
            println!("{}", "-".repeat(50));
            for (i, name) in matches {
                println!("{:>6}  {}", i, name);
            }
        }

        Commands::Recommend { song, index, limit, json } => {
            let top_n = limit
                .map(|n| n as usize)
                .unwrap_or(config.default_top_n)
                .clamp(1, MAX_TOP_N as usize);

            let (query, results) = match (index, song) {
                (Some(i), _) => (i, session.recommend(i, top_n)?),
                (None, Some(name)) => {
                    let i = session
                        .find(&name)
                        .with_context(|| format!("No song named \"{}\" in the catalog", name))?;
                    (i, session.recommend(i, top_n)?)
                }
                (None, None) => anyhow::bail!("Give a song name or --index"),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_recommendations(session, query, &results);
            }
        }

        Commands::Stats => {
            let stats = session.stats();
            println!("Catalog Statistics");
            println!("==================");
            println!("Dataset rows:      {}", stats.total_rows);
            println!("Eligible songs:    {}", stats.eligible_rows);
            println!("Dropped (missing): {}", stats.dropped_rows);
            println!("Working catalog:   {}", stats.working_size);
            println!("Zero-norm songs:   {}", stats.degenerate_rows);
            println!();

            let scaler = session.scaler();
            println!("{:<18} {:>14} {:>14}", "Feature", "Mean", "Std");
            println!("{}", "-".repeat(48));
            for (d, name) in FEATURE_COLUMNS.iter().enumerate() {
                println!(
                    "{:<18} {:>14.4} {:>14.4}",
                    name, scaler.means[d], scaler.stds[d]
                );
            }

            if !stats.constant_features.is_empty() {
                println!();
                println!("Constant features: {}", stats.constant_features.join(", "));
            }
        }
    }

    Ok(())
}

/// Print ranked recommendations for a query song.
fn print_recommendations(session: &Session, query: usize, results: &[Recommendation]) {
    let title = session.names().get(query).map(String::as_str).unwrap_or("?");
    println!("Top {} recommendations for \"{}\":", results.len(), title);
    println!();
    for r in results {
        println!("{} (Similarity: {:.2})", r.name, r.score);
    }
}
