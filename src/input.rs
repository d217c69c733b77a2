use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

/// Path segment that marks a US storefront page. The crawl only covers the
/// US store; any other region means the whole input batch is wrong.
const REGION_SEGMENT: &str = "/us/";

/// One crawl target from the input CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "App Name")]
    pub name: String,
    #[serde(rename = "App Store URL")]
    pub url: String,
}

/// Read the headered input CSV into crawl targets.
pub fn read_records(path: &Path) -> Result<Vec<InputRecord>> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open input CSV {}", path.display()))?;
    let records = collect_records(reader)?;
    info!("Loaded {} crawl targets from {}", records.len(), path.display());
    Ok(records)
}

fn collect_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<InputRecord>> {
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: InputRecord = row.context("malformed CSV row")?;
        records.push(record);
    }
    Ok(records)
}

/// Fail fast if any target is not a US storefront URL.
pub fn ensure_us_storefront(records: &[InputRecord]) -> Result<()> {
    for record in records {
        if !record.url.contains(REGION_SEGMENT) {
            bail!(
                "not a US storefront URL for {:?}: {} (only URLs with {} are supported)",
                record.name,
                record.url,
                REGION_SEGMENT
            );
        }
    }
    Ok(())
}
