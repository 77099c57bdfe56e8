use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskdash::config::{DashConfig, LogFormat, LoggingConfig};
use taskdash::loaders::Dashboard;
use taskdash::table::TableQuery;

#[derive(Parser)]
#[command(
    name = "taskdash",
    about = "Read-only dashboard for scheduled task exit logs and upcoming runs",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data location: a directory or an http(s) base URL
    #[arg(long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard over HTTP
    Serve {
        /// Bind address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Write the dashboard as a static HTML page
    Render {
        /// Output file path
        #[arg(long, default_value = "index.html")]
        output: PathBuf,
    },

    /// Print the dashboard to the terminal
    Status {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

/// Stderr subscriber used while the config file is still being chosen.
fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = tracing::subscriber::with_default(bootstrap_subscriber(), || {
        DashConfig::resolve(cli.config.as_deref())
    })?;
    if let Some(source) = cli.source {
        config.source.location = source;
    }
    init_tracing(&config.logging);

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            tracing::info!(bind = %config.server.bind, "Starting taskdash server");
            taskdash::serve(&config).await?;
        }
        Commands::Render { output } => {
            let html = taskdash::render_once(&config).await?;
            std::fs::write(&output, html)
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!(output = %output.display(), "Dashboard rendered");
        }
        Commands::Status { json } => {
            let source = taskdash::source::open_source(&config.source.location);
            let dashboard = Dashboard::load(source.as_ref()).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&dashboard)?);
            } else {
                print_status(&dashboard, &config);
            }
        }
    }

    Ok(())
}

fn print_status(dashboard: &Dashboard, config: &DashConfig) {
    println!("\n=== {} ===", config.display.title);
    match &dashboard.last_updated {
        Some(view) => println!("Last updated: {}", view.text()),
        None => println!("Last updated: (unavailable)"),
    }

    println!("\nExit Log");
    match &dashboard.exit_log {
        Some(rows) => {
            let query = TableQuery {
                page_size: config.display.page_size,
                ..TableQuery::default()
            };
            let page = query.apply(rows);
            println!(
                "{:<32} | {:<16} | {:<20} | {:>9} | Status",
                "Timestamp", "Project", "Script", "Exit Code"
            );
            println!("{:-<32}-|-{:-<16}-|-{:-<20}-|-{:-<9}-|-{:-<8}", "", "", "", "", "");
            for row in &page.rows {
                println!(
                    "{:<32} | {:<16} | {:<20} | {:>9} | {}",
                    row.timestamp.long(),
                    row.project_name,
                    row.script_name,
                    row.exit_code,
                    row.status.label()
                );
            }
            println!("{}", page.counter());
        }
        None => println!("(unavailable)"),
    }

    println!("\nNext Executions");
    match &dashboard.next_executions {
        Some(entries) if entries.is_empty() => println!("No upcoming runs."),
        Some(entries) => {
            for entry in entries {
                println!("{:<20} : {}", entry.project_name, entry.next_run.long());
            }
        }
        None => println!("(unavailable)"),
    }
    println!();
}
