use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::error;

/// Canonical per-app output, one per successfully scraped page. Field
/// names are the wire names in apps.json.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub app_identifier: String,
    pub name: String,
    pub languages: Vec<String>,
    pub minimum_version: String,
}

/// The two derived identifier sets, serialized as filtered_apps.json.
/// Identifiers are numbers on the wire and each vector is sorted ascending
/// numerically once, at end of run.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredIndex {
    pub apps_in_spanish_and_tagalog: Vec<u64>,
    pub apps_with_insta_in_name: Vec<u64>,
}

impl FilteredIndex {
    /// One-shot end-of-run ordering; the sets hold unique identifiers.
    pub fn sort(&mut self) {
        self.apps_in_spanish_and_tagalog.sort_unstable();
        self.apps_in_spanish_and_tagalog.dedup();
        self.apps_with_insta_in_name.sort_unstable();
        self.apps_with_insta_in_name.dedup();
    }
}

/// Overwrite `path` with pretty-printed JSON. A write failure is reported
/// and the run continues; the computed data stays in memory either way.
pub fn write_json<T: Serialize>(path: &Path, data: &T) {
    let json = match serde_json::to_string_pretty(data) {
        Ok(json) => json,
        Err(e) => {
            error!("failed to serialize {}: {}", path.display(), e);
            return;
        }
    };
    if let Err(e) = std::fs::write(path, json) {
        error!("I/O error writing {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<AppRecord> {
        vec![
            AppRecord {
                app_identifier: "1023".into(),
                name: "InstaBlend".into(),
                languages: vec!["English".into(), "Spanish".into(), "Tagalog".into()],
                minimum_version: "13.0".into(),
            },
            AppRecord {
                app_identifier: "87".into(),
                name: "Banana".into(),
                languages: vec!["English".into()],
                minimum_version: "9.3".into(),
            },
        ]
    }

    #[test]
    fn apps_json_round_trip() {
        let path = std::env::temp_dir().join("appstore_scraper_round_trip.json");
        let apps = sample();
        write_json(&path, &apps);
        let json = std::fs::read_to_string(&path).unwrap();
        let back: Vec<AppRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, apps);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn record_wire_names() {
        let json = serde_json::to_value(&sample()[0]).unwrap();
        assert_eq!(json["app_identifier"], "1023");
        assert_eq!(json["name"], "InstaBlend");
        assert_eq!(json["languages"][2], "Tagalog");
        assert_eq!(json["minimum_version"], "13.0");
    }

    #[test]
    fn filtered_identifiers_are_numbers() {
        let index = FilteredIndex {
            apps_in_spanish_and_tagalog: vec![87, 500, 1023],
            apps_with_insta_in_name: vec![1023],
        };
        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["apps_in_spanish_and_tagalog"][0], 87);
        assert!(json["apps_in_spanish_and_tagalog"][0].is_u64());
        assert_eq!(
            json.as_object().unwrap().len(),
            2,
            "filtered_apps.json carries exactly the two index keys"
        );
    }

    #[test]
    fn sort_is_numeric_not_lexicographic() {
        let mut index = FilteredIndex {
            apps_in_spanish_and_tagalog: vec![1023, 87, 500],
            apps_with_insta_in_name: vec![500, 500, 87],
        };
        index.sort();
        assert_eq!(index.apps_in_spanish_and_tagalog, [87, 500, 1023]);
        assert_eq!(index.apps_with_insta_in_name, [87, 500]);
    }
}
