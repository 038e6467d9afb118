//! Pest → pesticide lookup table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use cropwise_core::defaults::{MAX_REMEDIES, PESTICIDE_DESCRIPTION};
use cropwise_core::{Error, RemedyEntry, Result};
use tracing::{debug, info};

const PEST_COLUMN: &str = "Pest Name";
const REMEDY_COLUMN: &str = "Most Commonly Used Pesticides";

/// Static remedy table keyed by exact pest label.
///
/// Each row holds a comma-separated remedy list. When a label appears on
/// several rows the last one wins.
#[derive(Debug, Clone, Default)]
pub struct LookupRecommender {
    table: HashMap<String, String>,
}

impl LookupRecommender {
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::ModelLoad(format!("Failed to open remedy table {}: {}", path.display(), e))
        })?;
        let recommender = Self::from_reader(file)?;
        info!(
            subsystem = "predict",
            component = "lookup",
            path = %path.display(),
            entries = recommender.len(),
            "Loaded remedy table"
        );
        Ok(recommender)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr
            .headers()
            .map_err(|e| Error::ModelLoad(format!("Invalid remedy table header: {}", e)))?
            .clone();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::ModelLoad(format!("Remedy table lacks column {:?}", name)))
        };
        let pest_idx = column(PEST_COLUMN)?;
        let remedy_idx = column(REMEDY_COLUMN)?;

        let mut table = HashMap::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(|e| {
                Error::ModelLoad(format!("Invalid remedy table row {}: {}", line + 2, e))
            })?;
            let Some(pest) = record.get(pest_idx).filter(|p| !p.trim().is_empty()) else {
                continue;
            };
            // Rows with no remedy cell carry no recommendation.
            match record.get(remedy_idx).filter(|r| !r.trim().is_empty()) {
                Some(remedies) => {
                    table.insert(pest.to_string(), remedies.to_string());
                }
                None => {
                    table.remove(pest);
                }
            }
        }

        Ok(Self { table })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Up to three remedies for a label, in table order. Unknown labels
    /// yield an empty list.
    pub fn recommend(&self, label: &str) -> Vec<RemedyEntry> {
        let remedies: Vec<RemedyEntry> = match self.table.get(label) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .take(MAX_REMEDIES)
                .map(|name| RemedyEntry::new(name, PESTICIDE_DESCRIPTION))
                .collect(),
            None => Vec::new(),
        };
        debug!(label, remedy_count = remedies.len(), "Remedy lookup");
        remedies
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
