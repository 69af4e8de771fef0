use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use covid_panels::config::Config;
use covid_panels::dashboard::{Dashboard, DEFAULT_PANELS};
use covid_panels::models::{Method, Metric, RollingWindow, Scope};
use covid_panels::panel::PanelEvent;
use covid_panels::store::RecordStore;
use covid_panels::{cache, report, scope};

#[derive(Parser)]
#[command(name = "covid-panels")]
#[command(about = "Interactive-style COVID-19 panels over the NYT county dataset", long_about = None)]
struct Cli {
    /// Cached copy of the dataset
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
    /// Where to download the dataset from
    #[arg(long, global = true)]
    url: Option<String>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refresh the cached dataset if it is older than one day
    Update {
        /// Download even if the cache is fresh
        #[arg(long)]
        force: bool,
    },
    /// List every state in the dataset
    States,
    /// List counties, for one state or for all of them
    Counties {
        #[arg(long)]
        state: Option<String>,
    },
    /// Build the panels and render them
    Report {
        /// Scope per panel: national, state:<name> or county:<state>:<county>
        #[arg(long = "scope")]
        scopes: Vec<Scope>,
        /// Metric per panel: cases or deaths
        #[arg(long = "metric")]
        metrics: Vec<Metric>,
        /// Method per panel: cumulative or difference
        #[arg(long = "method")]
        methods: Vec<Method>,
        /// Shared rolling-average window (1-14)
        #[arg(long, default_value_t = 1)]
        window: u32,
        #[arg(long, default_value_t = DEFAULT_PANELS)]
        panels: usize,
        /// Copy the first panel's scope into the others
        #[arg(long)]
        synchronize: bool,
        /// Refresh a stale cache before reading it
        #[arg(long)]
        update: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

async fn load_store(config: &Config, update: bool) -> anyhow::Result<RecordStore> {
    cache::ensure_cache(config, update)
        .await
        .context("dataset unavailable")?;
    RecordStore::load_csv(&config.cache_file)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::resolve(cli.cache, cli.url);
    info!(cache = %config.cache_file.display(), url = %config.data_url, "configuration");

    match cli.command {
        Commands::Update { force } => {
            if force {
                let bytes = cache::download(&config.data_url, &config.cache_file).await?;
                println!(
                    "Downloaded {bytes} bytes to {}.",
                    config.cache_file.display()
                );
            } else {
                let status = cache::ensure_cache(&config, true).await?;
                println!("Cache {:?}: {}.", status, config.cache_file.display());
            }
        }
        Commands::States => {
            let store = load_store(&config, false).await?;
            for state in store.distinct_states() {
                println!("{state}");
            }
        }
        Commands::Counties { state } => {
            let store = load_store(&config, false).await?;
            match state {
                Some(state) => {
                    let counties = scope::distinct_counties(&store, &state);
                    if counties.is_empty() {
                        println!("No counties found for {state}.");
                    }
                    for county in counties {
                        println!("{county}");
                    }
                }
                None => {
                    for (state, county) in store.regions() {
                        println!("{state}: {county}");
                    }
                }
            }
        }
        Commands::Report {
            scopes,
            metrics,
            methods,
            window,
            panels,
            synchronize,
            update,
            format,
            out,
        } => {
            let window = RollingWindow::new(window)?;
            let store = load_store(&config, update).await?;
            let count = panels.max(scopes.len()).max(metrics.len()).max(methods.len());
            let mut dashboard = Dashboard::new(store, count)?;

            for (index, scope) in scopes.into_iter().enumerate() {
                dashboard.dispatch(index, PanelEvent::SetScope(scope))?;
            }
            for (index, metric) in metrics.into_iter().enumerate() {
                dashboard.dispatch(index, PanelEvent::SetMetric(metric))?;
            }
            for (index, method) in methods.into_iter().enumerate() {
                dashboard.dispatch(index, PanelEvent::SetMethod(method))?;
            }
            dashboard.set_shared_window(window);
            if synchronize {
                dashboard.synchronize();
            }

            let view = report::DashboardView::from_dashboard(&dashboard);
            let rendered = match format {
                OutputFormat::Markdown => report::render_markdown(&view),
                OutputFormat::Json => report::render_json(&view)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
    }

    Ok(())
}
