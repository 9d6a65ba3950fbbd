use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use physics_catalog::{
    api, browser,
    catalog::ResourceStore,
    client::CatalogClient,
    config::{Config, DEFAULT_PORT},
    db::Database,
    models::{SeedReport, SeedRun, SeedStatus},
    seed::{self, DATASETS},
};

#[derive(Parser)]
#[command(name = "physcat")]
#[command(about = "Browse and serve a catalog of physics learning resources")]
struct Cli {
    /// Database file (overrides PHYSCAT_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the catalog HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Apply built-in datasets that are missing or outdated
    Seed {
        /// Only this dataset (e.g. "Khan Academy")
        #[arg(short, long)]
        source: Option<String>,

        /// Reapply even when the recorded version is current
        #[arg(short, long)]
        force: bool,

        /// Seed through the server at PHYSCAT_URL (a named source is always reapplied)
        #[arg(short, long)]
        remote: bool,
    },
    /// Delete every resource and seed from scratch
    Reset {
        /// Reset through the server at PHYSCAT_URL
        #[arg(short, long)]
        remote: bool,
    },
    /// List applied dataset versions
    Seeds {
        /// Query the server at PHYSCAT_URL instead of the local database
        #[arg(short, long)]
        remote: bool,
    },
    /// Print the resource tree, or search results
    Browse {
        /// Show matching resources instead of the tree
        #[arg(short, long)]
        search: Option<String>,

        /// Query the server at PHYSCAT_URL instead of the local database
        #[arg(short, long)]
        remote: bool,
    },
    /// Print one resource
    Show {
        id: Uuid,

        /// Query the server at PHYSCAT_URL instead of the local database
        #[arg(short, long)]
        remote: bool,
    },
}

/// Server logs go to stdout; every other command keeps stdout for its output.
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "physics_catalog=debug,tower_http=debug".into()),
    );

    if use_stderr {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_database(config: &Config) -> anyhow::Result<Database> {
    let path = config.db_path()?;
    let db = Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))?;
    db.migrate()?;
    Ok(db)
}

fn print_reports(reports: &[SeedReport]) {
    for report in reports {
        match report.status {
            SeedStatus::Applied => println!(
                "{} v{}: {} resources ({} removed)",
                report.source, report.version, report.node_count, report.removed
            ),
            SeedStatus::UpToDate => println!(
                "{} v{}: up to date",
                report.source, report.version
            ),
        }
    }
}

fn print_runs(runs: &[SeedRun]) {
    for run in runs {
        println!(
            "{} v{}: {} resources, applied {}",
            run.source,
            run.version,
            run.node_count,
            run.applied_at.to_rfc3339()
        );
    }
}

async fn seed_remote(
    client: &CatalogClient,
    source: Option<String>,
    force: bool,
) -> anyhow::Result<Vec<SeedReport>> {
    let reports = match (source, force) {
        (Some(source), _) => vec![client.reseed(&source).await?],
        (None, true) => {
            let mut reports = Vec::with_capacity(DATASETS.len());
            for dataset in DATASETS {
                reports.push(client.reseed(dataset.source).await?);
            }
            reports
        }
        (None, false) => client.seed_all().await?,
    };
    Ok(reports)
}

async fn serve(config: &Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting catalog server on port {}", port);

    let db = open_database(config)?;
    seed::seed_all(&db)?;

    let app = api::create_router(db, config.security());

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Catalog server listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Some(Commands::Serve { port }) => serve(&config, port).await?,
        Some(Commands::Seed {
            source,
            force,
            remote,
        }) => {
            let reports = if remote {
                seed_remote(&CatalogClient::from_config(&config), source, force).await?
            } else {
                let db = open_database(&config)?;
                match (source, force) {
                    (Some(source), _) => vec![seed::seed_source(&db, &source, force)?],
                    (None, true) => seed::seed_all_forced(&db)?,
                    (None, false) => seed::seed_all(&db)?,
                }
            };
            print_reports(&reports);
        }
        Some(Commands::Reset { remote }) => {
            let reports = if remote {
                CatalogClient::from_config(&config).reset().await?
            } else {
                seed::reset(&open_database(&config)?)?
            };
            print_reports(&reports);
        }
        Some(Commands::Seeds { remote }) => {
            let runs = if remote {
                CatalogClient::from_config(&config).seed_runs().await?
            } else {
                open_database(&config)?.get_seed_runs()?
            };
            print_runs(&runs);
        }
        Some(Commands::Browse { search, remote }) => {
            let view = if remote {
                CatalogClient::from_config(&config)
                    .browse(search.as_deref())
                    .await?
            } else {
                let db = open_database(&config)?;
                seed::seed_all(&db)?;
                let mut tree = browser::Browser::new();
                if let Some(term) = search {
                    tree.set_search(term);
                }
                tree.view(&db)?
            };
            print!("{}", browser::render_view(&view));
        }
        Some(Commands::Show { id, remote }) => {
            let resource = if remote {
                CatalogClient::from_config(&config).get_resource(id).await?
            } else {
                let db = open_database(&config)?;
                db.get(id)?
            };
            match resource {
                Some(resource) => println!("{}", serde_json::to_string_pretty(&resource)?),
                None => anyhow::bail!("Resource {} not found", id),
            }
        }
        None => serve(&config, DEFAULT_PORT).await?,
    }

    Ok(())
}
