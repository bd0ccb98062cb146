//! Yodelr CLI
//!
//! Command-line interface for Yodelr:
//! - Replay command scripts
//! - Import posts from CSV
//! - Run the synthetic performance workload
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yodelr::workload::{self, CommandOutput, CsvImporter, ReplayReport, WorkloadGenerator};
use yodelr::{Config, EventSink, LoggingConfig, MemorySink, TeeSink, Timestamp, TracingSink, YodelrEngine};

#[derive(Parser)]
#[command(name = "yodelr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory micro-blogging index with trending topics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Dump buffered index events after the run
    #[arg(long, global = true)]
    pub events: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a command script
    Replay {
        /// Path to the script
        script: PathBuf,
    },

    /// Import posts from CSV (user,timestamp,text)
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Print trending topics for an inclusive window after importing
        #[arg(long, num_args = 2, value_names = ["FROM", "TO"], allow_negative_numbers = true)]
        trending: Option<Vec<Timestamp>>,
    },

    /// Time add_post and every query over a generated workload
    Perf {
        /// Number of words to generate
        #[arg(short, long)]
        words: Option<usize>,
        /// Seed for reproducible workloads
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, source) = Config::resolve(cli.config.as_deref())?;
    init_tracing(&config.logging);
    source.log();

    tracing::debug!("Yodelr v{}", env!("CARGO_PKG_VERSION"));

    let memory = Arc::new(MemorySink::new(config.index.event_buffer));

    match cli.command {
        Commands::Replay { script } => {
            let engine = build_engine(&config, &memory);
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {:?}", script))?;
            let commands = workload::parse_script(&text)?;
            let report = workload::replay(&engine, commands)?;

            match cli.format {
                OutputFormat::Json => {
                    let body = serde_json::json!({
                        "report": report,
                        "stats": engine.stats()?,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Table => {
                    print_replay(&report);
                    println!();
                    println!("Stats: {}", engine.stats()?);
                }
            }
        }

        Commands::Import { path, trending } => {
            let engine = build_engine(&config, &memory);
            let result = CsvImporter::new().import(&engine, &path)?;
            let ranked = match trending.as_deref() {
                Some([from, to]) => Some(engine.get_trending_entries(*from, *to)?),
                _ => None,
            };

            match cli.format {
                OutputFormat::Json => {
                    let body = serde_json::json!({
                        "rows_processed": result.rows_processed,
                        "rows_failed": result.rows_failed,
                        "users": result.users,
                        "errors": result.errors,
                        "trending": ranked,
                        "stats": engine.stats()?,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                OutputFormat::Table => {
                    println!(
                        "Imported {} posts from {} users ({} rows failed)",
                        result.rows_processed,
                        result.users.len(),
                        result.rows_failed
                    );
                    for error in &result.errors {
                        println!("  {}", error);
                    }
                    if let Some(ranked) = ranked {
                        println!();
                        println!("{:<30} {:>8}", "TOPIC", "POSTS");
                        println!("{}", "-".repeat(39));
                        for entry in ranked {
                            println!("{:<30} {:>8}", entry.topic, entry.count);
                        }
                    }
                    println!();
                    println!("Stats: {}", engine.stats()?);
                }
            }
        }

        Commands::Perf { words, seed } => {
            let mut workload_config = config.workload.clone();
            if let Some(words) = words {
                workload_config.words = words;
            }
            if seed.is_some() {
                workload_config.seed = seed;
            }

            // Per-post tracing would dominate the timings
            let engine = YodelrEngine::with_sink(&config.index, memory.clone());
            let mut generator = WorkloadGenerator::new(&workload_config, config.index.max_post_chars);
            let posts = generator.posts();
            let report = workload::run_perf(&engine, generator.users(), &posts)?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => println!("{}", report),
            }
        }

        Commands::Config { output } => {
            let config = yodelr::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    if cli.events {
        print_events(&memory, cli.format)?;
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("yodelr={}", logging.level)));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays machine-readable
    if logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_engine(config: &Config, memory: &Arc<MemorySink>) -> YodelrEngine {
    let sink: Arc<dyn EventSink> = Arc::new(
        TeeSink::new()
            .with(Arc::new(TracingSink))
            .with(memory.clone()),
    );
    YodelrEngine::with_sink(&config.index, sink)
}

fn print_replay(report: &ReplayReport) {
    for result in &report.results {
        println!("{:>4}  {}", result.line, result.command);

        if let Some(error) = &result.error {
            println!("      ! {}", error);
            continue;
        }
        match &result.output {
            Some(CommandOutput::Posts(posts)) => {
                if posts.is_empty() {
                    println!("      (no posts)");
                }
                for post in posts {
                    println!("      - {}", post);
                }
            }
            Some(CommandOutput::Topics(topics)) => {
                if topics.is_empty() {
                    println!("      (no topics)");
                }
                for (rank, topic) in topics.iter().enumerate() {
                    println!("      {}. {}", rank + 1, topic);
                }
            }
            Some(CommandOutput::Done) | None => {}
        }
    }

    println!();
    println!(
        "{} commands, {} ok, {} rejected",
        report.results.len(),
        report.succeeded(),
        report.failed
    );
}

fn print_events(memory: &MemorySink, format: OutputFormat) -> anyhow::Result<()> {
    let events = memory.drain();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Table => {
            println!();
            println!("Events ({} buffered, capacity {}):", events.len(), memory.capacity());
            for event in &events {
                println!("  {}", serde_json::to_string(event)?);
            }
        }
    }
    Ok(())
}
