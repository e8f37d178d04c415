//! Category filter and free-text search over scan history.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::domain::ScanRecord;
use crate::verification::status::{AUTHENTIC, COUNTERFEIT_SUSPECTED, EXPIRED, TAMPERED_QR};

/// Verdict groupings offered as history filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Authentic,
    Counterfeit,
    Expired,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Authentic, Category::Counterfeit, Category::Expired];

    /// Status codes belonging to this category.
    pub fn statuses(&self) -> &'static [&'static str] {
        match self {
            Category::Authentic => &[AUTHENTIC],
            Category::Counterfeit => &[COUNTERFEIT_SUSPECTED, TAMPERED_QR],
            Category::Expired => &[EXPIRED],
        }
    }

    pub fn contains(&self, status: &str) -> bool {
        self.statuses().contains(&status)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Authentic => "authentic",
            Category::Counterfeit => "counterfeit",
            Category::Expired => "expired",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authentic" => Ok(Category::Authentic),
            "counterfeit" => Ok(Category::Counterfeit),
            "expired" => Ok(Category::Expired),
            other => Err(format!("unknown category '{}': expected authentic, counterfeit or expired", other)),
        }
    }
}

/// Filter state of the history view. Category and search compose with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub category: Option<Category>,
    pub search: String,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Single-select: pressing the active category clears it.
    pub fn toggle_category(&mut self, category: Category) {
        self.category = if self.category == Some(category) { None } else { Some(category) };
    }

    pub fn matches(&self, record: &ScanRecord) -> bool {
        if let Some(category) = self.category {
            if !category.contains(record.status()) {
                return false;
            }
        }
        if self.search.trim().is_empty() {
            return true;
        }
        matches_search(record, &self.search.to_lowercase())
    }

    pub fn apply(&self, records: &[ScanRecord]) -> Vec<ScanRecord> {
        records.iter().filter(|record| self.matches(record)).cloned().collect()
    }
}

/// Case-insensitive substring match over name, manufacturer, serial and batch.
fn matches_search(record: &ScanRecord, needle: &str) -> bool {
    let drug = &record.drug_info;
    let fields = [
        Some(drug.name.clone()),
        record.manufacturer(),
        drug.serial_number.clone(),
        drug.batch_number.clone(),
    ];
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Records matching `filter`, in their original order.
pub fn filter(records: &[ScanRecord], filter: &HistoryFilter) -> Vec<ScanRecord> {
    filter.apply(records)
}

/// Per-category totals for filter badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub authentic: usize,
    pub counterfeit: usize,
    pub expired: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Authentic => self.authentic,
            Category::Counterfeit => self.counterfeit,
            Category::Expired => self.expired,
        }
    }
}

pub fn category_counts(records: &[ScanRecord]) -> CategoryCounts {
    records.iter().fold(CategoryCounts::default(), |mut counts, record| {
        counts.total += 1;
        let status = record.status();
        if Category::Authentic.contains(status) {
            counts.authentic += 1;
        } else if Category::Counterfeit.contains(status) {
            counts.counterfeit += 1;
        } else if Category::Expired.contains(status) {
            counts.expired += 1;
        }
        counts
    })
}
