//! Command line interface for loading DC-NDL records into a catalog and searching them.
use clap::{Parser, Subcommand};
use opac::config::{Config, Settings, DEFAULT_CONFIG_FILE};
use opac::dcndl::loader::RecordLoader;
use opac::store::{Catalog, SearchQuery};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "opac-io", version, about = "Loads and searches DC-NDL (Simple) records")]
struct Cli {
    /// The YAML config file to use.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parses and validates a single XML file without storing anything.
    Load {
        /// The XML file to read.
        file: PathBuf,
    },

    /// Loads all XML files of the data directory into the catalog.
    Populate {
        /// Overrides the directory configured as loader.data_dir.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Searches the catalog.
    Search {
        /// Searches in titles and creators.
        #[arg(long)]
        q: Option<String>,

        /// Searches in titles.
        #[arg(long)]
        title: Option<String>,

        /// Searches in creators.
        #[arg(long)]
        creator: Option<String>,

        /// The page to show, starting at 1.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// The number of items per page (defaults to search.per_page).
        #[arg(long)]
        per_page: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    opac::init_logging();
    log::info!("Starting opac-io {}...", opac::OPAC_VERSION);

    if let Err(error) = run(Cli::parse()).await {
        log::error!("{:#}", error);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::new(&cli.config);
    config.load().await?;
    let settings = config.settings();

    match cli.command {
        Command::Load { file } => load(&settings, file).await,
        Command::Populate { data_dir } => populate(&settings, data_dir).await,
        Command::Search {
            q,
            title,
            creator,
            page,
            per_page,
        } => {
            let query = SearchQuery {
                q,
                title,
                creator,
                page,
                per_page: per_page.unwrap_or(settings.search.per_page),
            };
            search(&settings, &query).await
        }
    }
}

async fn load(settings: &Settings, file: PathBuf) -> anyhow::Result<()> {
    let loader = RecordLoader::new(settings.loader.max_logged_rejections);
    let stats = tokio::task::spawn_blocking(move || {
        let report = loader.load_file(&file)?;
        Ok::<_, anyhow::Error>((report.records.len(), report.skipped))
    })
    .await??;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "valid": stats.0,
            "skipped": stats.1,
        }))?
    );

    Ok(())
}

async fn populate(settings: &Settings, data_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let mut catalog = match &settings.database.file {
        Some(path) => Catalog::open(path).await?,
        None => {
            log::warn!("No database.file configured. The populated catalog will not be saved.");
            Catalog::new()
        }
    };

    let data_dir = data_dir.unwrap_or_else(|| settings.loader.data_dir.clone());
    let report = opac::populate::populate(&mut catalog, &data_dir, &settings.loader).await?;

    if let Some(path) = &settings.database.file {
        catalog.save(path).await?;
    }

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn search(settings: &Settings, query: &SearchQuery) -> anyhow::Result<()> {
    let path = settings.database.file.as_ref().ok_or_else(|| {
        anyhow::anyhow!("No database.file configured. Run 'populate' with a configured file first.")
    })?;

    let catalog = Catalog::open(path).await?;
    let page = catalog.search(query)?;
    println!("{}", serde_json::to_string_pretty(&page)?);

    Ok(())
}
