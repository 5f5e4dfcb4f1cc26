use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Warehouse label used when a record carries none
pub const UNKNOWN_WAREHOUSE: &str = "Unknown";

/// Loosely typed record as handed over by uploads or API callers:
/// field name -> value, numbers and dates possibly encoded as strings
pub type RawCountRecord = serde_json::Map<String, serde_json::Value>;

/// One physical cycle count of one item at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecord {
    pub item_id: String,
    pub description: String,
    pub location: String,
    pub warehouse: String,
    pub unit: String,
    pub system_count: Option<BigDecimal>,
    pub actual_count: Option<BigDecimal>,
    /// actual_count - system_count; positive = overage, negative = shortage
    pub variance: BigDecimal,
    pub cycle_date: NaiveDate,
    pub notes: String,
}

/// Row of `cycle_counts` joined with the warehouse name
#[derive(Debug, Clone, FromRow)]
pub struct CycleCountRow {
    pub item_id: String,
    pub description: String,
    pub location: String,
    pub warehouse: Option<String>,
    pub unit: Option<String>,
    pub system_count: BigDecimal,
    pub actual_count: BigDecimal,
    pub variance: BigDecimal,
    pub cycle_date: NaiveDate,
    pub notes: Option<String>,
}

impl From<CycleCountRow> for CountRecord {
    fn from(row: CycleCountRow) -> Self {
        Self {
            item_id: row.item_id,
            description: row.description,
            location: row.location,
            warehouse: row
                .warehouse
                .filter(|w| !w.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_WAREHOUSE.to_string()),
            unit: row.unit.unwrap_or_default(),
            system_count: Some(row.system_count),
            actual_count: Some(row.actual_count),
            variance: row.variance,
            cycle_date: row.cycle_date,
            notes: row.notes.unwrap_or_default(),
        }
    }
}
