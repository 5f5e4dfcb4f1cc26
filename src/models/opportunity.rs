use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Current variance of an item at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationVariance {
    pub location: String,
    pub warehouse: String,
    pub variance: BigDecimal,
    pub date: NaiveDate,
}

/// An item whose overages and shortages across locations can be netted
/// by moving stock. Computed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOpportunity {
    pub item_id: String,
    pub description: String,
    pub unit: String,
    /// variance > 0, largest first
    pub overage_locations: Vec<LocationVariance>,
    /// variance < 0, largest absolute value first
    pub shortage_locations: Vec<LocationVariance>,
    pub total_overage: BigDecimal,
    /// Sum of negative variances, itself negative
    pub total_shortage: BigDecimal,
    pub net_variance: BigDecimal,
    /// min(total_overage, |total_shortage|)
    pub potential_benefit: BigDecimal,
}
