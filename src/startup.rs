//! Process wiring: loads the configuration, opens the outcome store, imports the
//! library and starts the crawl and/or the query server.
//!
//! The crawl and the server share nothing but the store. In [`Mode::Run`] the crawl
//! runs as a background task while the server answers queries; stopping the process
//! loses nothing that was committed, and the next run picks up where this one ended.

use crate::api_client::HttpFetcher;
use crate::configuration::{self, ConfigFolder, Settings};
use crate::foundation::database::{self, OutcomeStore, SledOutcomeStore};
use crate::library::{self, Release};
use crate::process::{CrawlReport, CrawlScheduler};
use crate::query::{self, QueryService, Rating};
use actix_web::{middleware, web, App, HttpServer};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Crawl in the background and serve queries.
    Run,
    /// Crawl to completion, then exit.
    Crawl,
    /// Serve queries only.
    Serve,
}

pub async fn run(cfg_folder: ConfigFolder, mode: Mode) -> Result<()> {
    let settings = load_settings(&cfg_folder)?;
    let store = open_store(&settings, &cfg_folder)?;
    info!("{} albums already resolved", store.len()?);

    match mode {
        Mode::Crawl => {
            crawl_once(&settings, store).await?;
        }
        Mode::Serve => serve(&settings, store).await?,
        Mode::Run => {
            let releases = load_releases(&settings)?;
            let mut scheduler = build_scheduler(&settings, store.clone())?;
            let crawl = tokio::spawn(async move { scheduler.run(&releases).await });

            serve(&settings, store).await?;

            if !crawl.is_finished() {
                warn!("Server stopped while the crawl was still running; it resumes on the next run");
            }
            crawl.abort();
        }
    }

    Ok(())
}

/// Reads one album's rating straight from the store.
pub fn lookup(cfg_folder: &ConfigFolder, album_slug: &str) -> Result<Option<Rating>> {
    let settings = load_settings(cfg_folder)?;
    let store = open_store(&settings, cfg_folder)?;
    Ok(QueryService::new(store).lookup(album_slug)?)
}

fn load_settings(cfg_folder: &ConfigFolder) -> Result<Settings> {
    if !cfg_folder.config_file.exists() {
        bail!(
            "Configuration file {} not found. Please run 'musrank config' first.",
            cfg_folder.config_file.display()
        );
    }

    let config_file = cfg_folder
        .config_file
        .to_str()
        .context("Configuration path is not valid UTF-8")?;
    configuration::get_configuration(config_file).context("Unable to parse configuration file")
}

fn open_store(settings: &Settings, cfg_folder: &ConfigFolder) -> Result<Arc<dyn OutcomeStore>> {
    let db_path = settings.database_path(cfg_folder);
    let db_path_as_str = db_path
        .to_str()
        .context("Failed to convert the database path to a string")?;

    let db = database::open_database(db_path_as_str)
        .with_context(|| format!("Failed to open the database at {}", db_path_as_str))?;
    Ok(Arc::new(SledOutcomeStore::new(db)))
}

fn load_releases(settings: &Settings) -> Result<Vec<Release>> {
    let releases = library::import_library(Path::new(&settings.library_path), settings.library_format)
        .with_context(|| format!("Failed to import the library at {}", settings.library_path))?;
    info!("# of albums is {}", releases.len());
    Ok(releases)
}

fn build_scheduler(
    settings: &Settings,
    store: Arc<dyn OutcomeStore>,
) -> Result<CrawlScheduler<HttpFetcher>> {
    let crawl = &settings.crawl_settings;
    let pacing = crawl.pacing()?;
    let fetcher = HttpFetcher::new(crawl.request_timeout(), &crawl.user_agent)
        .context("Failed to build the HTTP client")?;

    Ok(CrawlScheduler::new(fetcher, store, &crawl.base_url, pacing).with_progress(progress_bar()?))
}

fn progress_bar() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{elapsed_precise} [{bar:40.cyan/blue}] {pos}/{len} releases {msg}")?
            .progress_chars("##-"),
    );
    Ok(progress)
}

async fn serve(settings: &Settings, store: Arc<dyn OutcomeStore>) -> Result<()> {
    let address = settings.server_settings.address();
    let service = web::Data::new(QueryService::new(store));
    info!("Query server listening on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(middleware::Logger::default())
            .configure(query::configure)
    })
    .bind(&address)
    .with_context(|| format!("Failed to bind {}", address))?
    .run()
    .await?;

    Ok(())
}

/// Crawls every release of the configured library once, without serving queries.
pub async fn crawl_once(settings: &Settings, store: Arc<dyn OutcomeStore>) -> Result<CrawlReport> {
    let releases = load_releases(settings)?;
    let mut scheduler = build_scheduler(settings, store)?;
    Ok(scheduler.run(&releases).await)
}
