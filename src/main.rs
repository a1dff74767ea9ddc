use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lms_scope::config::Config;
use lms_scope::pipeline::{run_dataset_page, PageOutcome};
use lms_scope::{
    dataset, db, report, Dataset, EntityKind, FilterSet, Principal, Role, ShapeContext,
};

#[derive(Parser)]
#[command(name = "lms-scope")]
#[command(about = "Role-scoped dashboard views over LMS data", long_about = None)]
struct Cli {
    /// JSON dataset to read instead of Postgres or the demo data
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PrincipalArgs {
    /// Principal id, e.g. teacher_1
    #[arg(long = "as")]
    id: String,
    #[arg(long)]
    role: Role,
}

impl PrincipalArgs {
    fn principal(&self) -> Principal {
        Principal::new(self.id.clone(), self.role)
    }
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    query: Option<String>,
    /// Folder id, or `uncategorized`
    #[arg(long)]
    folder: Option<String>,
    #[arg(long)]
    favorites: bool,
    #[arg(long)]
    from: Option<String>,
    #[arg(long)]
    to: Option<String>,
    /// all, high-engagement, high-performance or needs-attention
    #[arg(long)]
    threshold: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    sort: Option<String>,
}

impl FilterArgs {
    fn params(&self) -> Vec<(&str, &str)> {
        let mut params = Vec::new();
        let optional = [
            ("status", &self.status),
            ("category", &self.category),
            ("query", &self.query),
            ("folder", &self.folder),
            ("from", &self.from),
            ("to", &self.to),
            ("threshold", &self.threshold),
            ("subject", &self.subject),
            ("sort", &self.sort),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.push((key, value.as_str()));
            }
        }
        if self.favorites {
            params.push(("favorites", "true"));
        }
        params
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load the demo data into Postgres
    Seed,
    /// Import students from a roster CSV
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show one page as a principal sees it
    View {
        #[command(flatten)]
        principal: PrincipalArgs,
        #[arg(long)]
        page: EntityKind,
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report covering every page
    Report {
        #[command(flatten)]
        principal: PrincipalArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Check the dataset for broken invariants
    Validate,
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to a Postgres instance")?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load_dataset(data: Option<&Path>, config: &Config) -> anyhow::Result<Dataset> {
    if let Some(path) = data {
        return Ok(dataset::load_json(path)?);
    }
    if config.database_url.is_some() {
        let pool = connect(config).await?;
        return db::fetch_dataset(&pool).await;
    }
    info!("no dataset configured, using demo data");
    Ok(Dataset::demo()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lms_scope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::InitDb => {
            let pool = connect(&config).await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect(&config).await?;
            db::seed(&pool, &Dataset::demo()?).await?;
            println!("Demo data seeded.");
        }
        Commands::Import { csv } => {
            let pool = connect(&config).await?;
            let inserted = db::import_students_csv(&pool, &csv).await?;
            println!("Inserted {inserted} students from {}.", csv.display());
        }
        Commands::View {
            principal,
            page,
            filters,
            json,
        } => {
            let directory = config.directory()?;
            let dataset = load_dataset(cli.data.as_deref(), &config).await?;
            let ctx = ShapeContext::new(&directory, config.today).with_metrics(config.metrics);
            let principal = principal.principal();

            let (filters, mut ignored) = FilterSet::from_params(filters.params());
            let outcome = run_dataset_page(page, &principal, &ctx, &dataset, &filters)
                .context("failed to render page")?;
            if let PageOutcome::Ready(view) = &outcome {
                ignored.extend(view.ignored.iter().cloned());
            }
            for problem in &ignored {
                eprintln!("Ignored filter: {problem}");
            }

            match outcome {
                PageOutcome::Denied(denied) if json => {
                    let body = serde_json::json!({ "kind": page, "denied": denied.to_string() });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                PageOutcome::Denied(denied) => println!("Access denied: {denied}."),
                PageOutcome::Ready(view) if json => {
                    println!("{}", serde_json::to_string_pretty(&view)?)
                }
                PageOutcome::Ready(view) if view.items.is_empty() => {
                    print!("{}", report::render_page(&view));
                    println!("No items match.");
                }
                PageOutcome::Ready(view) => print!("{}", report::render_page(&view)),
            }
        }
        Commands::Report { principal, out } => {
            let directory = config.directory()?;
            let dataset = load_dataset(cli.data.as_deref(), &config).await?;
            let ctx = ShapeContext::new(&directory, config.today).with_metrics(config.metrics);
            let report = report::build_report(&principal.principal(), &ctx, &dataset);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Validate => {
            let directory = config.directory()?;
            let dataset = load_dataset(cli.data.as_deref(), &config).await?;
            let violations = dataset.validate(&directory);
            if violations.is_empty() {
                println!("Dataset is clean.");
            } else {
                println!("{} problems found:", violations.len());
                for violation in &violations {
                    println!("- {violation}");
                }
            }
        }
    }

    Ok(())
}
