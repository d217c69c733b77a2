use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::extract;
use crate::fetch;
use crate::input::InputRecord;
use crate::normalize;
use crate::output::{AppRecord, FilteredIndex};

static INSTA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)insta").unwrap());

const DUAL_LANGUAGES: [&str; 2] = ["Spanish", "Tagalog"];

pub struct PipelineConfig {
    pub concurrency: usize,
    /// Collect and report per-record failures instead of aborting on the
    /// first one.
    pub keep_going: bool,
}

pub struct RunStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

pub struct PipelineOutcome {
    pub apps: Vec<AppRecord>,
    pub filtered: FilteredIndex,
    pub stats: RunStats,
}

struct TaskResult {
    name: String,
    url: String,
    result: Result<AppRecord>,
}

/// Scrape every record concurrently, aggregating results as they arrive.
/// Workers own their record until the send; the receive loop below is the
/// only place the output collections are touched.
pub async fn run(records: Vec<InputRecord>, config: &PipelineConfig) -> Result<PipelineOutcome> {
    let client = fetch::build_client()?;
    let semaphore = Arc::new(Semaphore::new(config.concurrency));
    let total = records.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let (tx, mut rx) = mpsc::channel::<TaskResult>(config.concurrency * 2);

    let mut handles = Vec::with_capacity(total);
    for record in records {
        let client = client.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            let result = process_record(&client, &record).await;
            let _ = tx
                .send(TaskResult {
                    name: record.name,
                    url: record.url,
                    result,
                })
                .await;
        }));
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut aggregator = Aggregator::default();
    let mut errors = 0usize;

    while let Some(task) = rx.recv().await {
        match task.result {
            Ok(record) => aggregator.consume(record),
            Err(e) if config.keep_going => {
                warn!("Skipping {:?}: {:#}", task.name, e);
                errors += 1;
            }
            Err(e) => {
                // Baseline policy: first failure abandons everything still
                // in flight and fails the run.
                for handle in &handles {
                    handle.abort();
                }
                pb.finish_and_clear();
                return Err(e)
                    .with_context(|| format!("scrape failed for {:?} ({})", task.name, task.url));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let (apps, filtered) = aggregator.finish();
    let ok = apps.len();
    info!("Scraped {} pages ({} ok, {} errors)", total, ok, errors);

    Ok(PipelineOutcome {
        apps,
        filtered,
        stats: RunStats { total, ok, errors },
    })
}

/// One record's whole journey: fetch the page, pull the attribute blocks,
/// normalize into a record. The DOM never crosses an await point.
async fn process_record(client: &reqwest::Client, record: &InputRecord) -> Result<AppRecord> {
    let app_id = extract::app_identifier(&record.url)?;
    let body = fetch::fetch_page(client, &record.url).await?;
    let raw = extract::attribute_map(&body);
    let app = normalize::normalize(&raw, &record.name, &app_id)?;
    Ok(app)
}

/// Single consumer of completed records. Classification is independent per
/// filter; an app can land in zero, one, or both indexes.
#[derive(Default)]
pub struct Aggregator {
    apps: Vec<AppRecord>,
    filtered: FilteredIndex,
}

impl Aggregator {
    pub fn consume(&mut self, record: AppRecord) {
        match record.app_identifier.parse::<u64>() {
            Ok(id) => {
                if INSTA_RE.is_match(&record.name) {
                    self.filtered.apps_with_insta_in_name.push(id);
                }
                if DUAL_LANGUAGES
                    .iter()
                    .all(|wanted| record.languages.iter().any(|l| l == wanted))
                {
                    self.filtered.apps_in_spanish_and_tagalog.push(id);
                }
            }
            // The filtered output contract is numeric; an identifier too
            // large for u64 cannot appear there.
            Err(_) => warn!(
                "identifier {:?} for {:?} does not fit the numeric index",
                record.app_identifier, record.name
            ),
        }

        self.apps.push(record);
    }

    pub fn finish(mut self) -> (Vec<AppRecord>, FilteredIndex) {
        self.filtered.sort();
        (self.apps, self.filtered)
    }
}

// ── Tests ──
