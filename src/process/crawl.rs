//! The crawl loop: each release is normalized, checked against the outcome store and,
//! only when nothing is recorded for it yet, fetched and extracted.
//!
//! Fetches are strictly sequential and separated by a [`Pacing`] delay. Only definitive
//! answers (a rating, or a page without any rating markup) are written to the store, so
//! an interrupted or partly failed crawl is resumed simply by running it again.

use crate::api_client::{extract, Fetcher, MalformedDocumentError, TransportError};
use crate::foundation::database::{Outcome, OutcomeStore, StoreError};
use crate::foundation::utils::{normalize, CanonicalKey, NormalizationError};
use crate::library::Release;
use crate::process::Pacing;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to a single release during a crawl.
#[derive(Debug)]
pub enum ReleaseStatus {
    /// An outcome was already recorded, or the album was attempted earlier in this run.
    Skipped,
    /// Fetched, extracted and committed.
    Resolved(Outcome),
    /// The release cannot be turned into a key; treated as missing, nothing fetched.
    Unresolvable(NormalizationError),
    Transient(TransportError),
    Malformed(MalformedDocumentError),
    StoreFailed(StoreError),
}

/// Tally of a finished crawl.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub found: usize,
    pub missing: usize,
    pub skipped: usize,
    pub unresolvable: usize,
    pub transient: usize,
    pub malformed: usize,
    pub store_failures: usize,
    pub fetches: usize,
}

impl CrawlReport {
    fn record(&mut self, status: &ReleaseStatus) {
        match status {
            ReleaseStatus::Skipped => self.skipped += 1,
            ReleaseStatus::Resolved(Outcome::Found { .. }) => self.found += 1,
            ReleaseStatus::Resolved(Outcome::Missing) => self.missing += 1,
            ReleaseStatus::Unresolvable(_) => self.unresolvable += 1,
            ReleaseStatus::Transient(_) => self.transient += 1,
            ReleaseStatus::Malformed(_) => self.malformed += 1,
            ReleaseStatus::StoreFailed(_) => self.store_failures += 1,
        }
    }

    /// Releases left for a later run.
    pub fn retryable(&self) -> usize {
        self.transient + self.malformed + self.store_failures
    }
}

pub struct CrawlScheduler<F> {
    fetcher: F,
    store: Arc<dyn OutcomeStore>,
    base_url: String,
    pacing: Pacing,
    progress: ProgressBar,
    attempted: HashSet<String>,
    fetches: usize,
}

impl<F: Fetcher> CrawlScheduler<F> {
    pub fn new(fetcher: F, store: Arc<dyn OutcomeStore>, base_url: &str, pacing: Pacing) -> Self {
        Self {
            fetcher,
            store,
            base_url: base_url.to_string(),
            pacing,
            progress: ProgressBar::hidden(),
            attempted: HashSet::new(),
            fetches: 0,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Number of page requests issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Crawls `releases` in order. Failures are logged and counted, never returned.
    pub async fn run(&mut self, releases: &[Release]) -> CrawlReport {
        let mut report = CrawlReport::default();
        let fetches_before = self.fetches;
        let total = releases.len();
        self.progress.set_length(total as u64);

        for (index, release) in releases.iter().enumerate() {
            self.progress
                .set_message(format!("{} - {}", release.artist, release.title));
            let status = self.resolve(release).await;
            log_status(index + 1, total, release, &status);
            report.record(&status);
            self.progress.inc(1);
        }

        report.fetches = self.fetches - fetches_before;
        self.progress.finish_with_message("crawl finished");
        info!(
            found = report.found,
            missing = report.missing,
            skipped = report.skipped,
            unresolvable = report.unresolvable,
            retryable = report.retryable(),
            fetches = report.fetches,
            "Crawl finished"
        );
        report
    }

    /// Takes one release through the whole pipeline.
    pub async fn resolve(&mut self, release: &Release) -> ReleaseStatus {
        let key = match normalize(&release.title, &release.artist) {
            Ok(key) => key,
            Err(e) => return ReleaseStatus::Unresolvable(e),
        };

        match self.store.get(&key.album_slug) {
            Ok(Some(_)) => return ReleaseStatus::Skipped,
            Ok(None) => {}
            Err(e) => return ReleaseStatus::StoreFailed(e),
        }

        if !self.attempted.insert(key.album_slug.clone()) {
            return ReleaseStatus::Skipped;
        }

        let document = match self.fetch(&key).await {
            Ok(document) => document,
            Err(e) => return ReleaseStatus::Transient(e),
        };

        let outcome = match extract(&document) {
            Ok(outcome) => outcome,
            Err(e) => return ReleaseStatus::Malformed(e),
        };

        let committed = match &outcome {
            Outcome::Found {
                rating,
                review_count,
            } => self.store.put_found(&key.album_slug, rating, review_count),
            Outcome::Missing => self.store.put_missing(&key.album_slug),
        };

        match committed {
            Ok(()) => ReleaseStatus::Resolved(outcome),
            Err(e) => ReleaseStatus::StoreFailed(e),
        }
    }

    /// Issues one request, waiting out the pacing delay first unless it is the first
    /// request of this scheduler.
    async fn fetch(&mut self, key: &CanonicalKey) -> Result<String, TransportError> {
        if self.fetches > 0 {
            let delay = self.pacing.next_delay();
            debug!("Waiting {:?} before the next request", delay);
            tokio::time::sleep(delay).await;
        }
        self.fetches += 1;

        let url = key.url(&self.base_url);
        debug!("Fetching {}", url);
        let response = self.fetcher.fetch(&url).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                url,
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

fn log_status(position: usize, total: usize, release: &Release, status: &ReleaseStatus) {
    let (title, artist) = (&release.title, &release.artist);
    match status {
        ReleaseStatus::Skipped => info!(
            "({}/{}) {} by {} already known, skipped",
            position, total, title, artist
        ),
        ReleaseStatus::Resolved(Outcome::Found {
            rating,
            review_count,
        }) => info!(
            "({}/{}) {} by {} has an average of {} from {} reviews",
            position, total, title, artist, rating, review_count
        ),
        ReleaseStatus::Resolved(Outcome::Missing) => info!(
            "({}/{}) Couldn't find {} by {} on the catalogue",
            position, total, title, artist
        ),
        ReleaseStatus::Unresolvable(e) => warn!(
            "({}/{}) {} by {} cannot be looked up: {}",
            position, total, title, artist, e
        ),
        ReleaseStatus::Transient(e) => warn!(
            "({}/{}) {} by {} will be retried next run: {}",
            position, total, title, artist, e
        ),
        ReleaseStatus::Malformed(e) => warn!(
            "({}/{}) {} by {} returned an unexpected page, will be retried next run: {}",
            position, total, title, artist, e
        ),
        ReleaseStatus::StoreFailed(e) => error!(
            "({}/{}) {} by {} could not be recorded: {}",
            position, total, title, artist, e
        ),
    }
}
