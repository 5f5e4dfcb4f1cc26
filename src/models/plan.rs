use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Overage side of a transfer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSource {
    pub location: String,
    pub warehouse: String,
    pub qty_to_move: BigDecimal,
}

/// Shortage side of a transfer row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferDestination {
    pub location: String,
    pub warehouse: String,
    /// Absolute value of the shortage
    pub missing_qty: BigDecimal,
}

/// One line of a transfer plan. Either side may be blank when the
/// overage and shortage lists differ in length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRow {
    pub source: Option<TransferSource>,
    pub destination: Option<TransferDestination>,
    pub completed: bool,
}

/// Transfer plan of a single item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTransferPlan {
    pub item_id: String,
    pub description: String,
    pub unit: String,
    pub total_overage: BigDecimal,
    pub total_shortage: BigDecimal,
    pub net_variance: BigDecimal,
    pub potential_benefit: BigDecimal,
    pub rows: Vec<TransferRow>,
}

/// Summary table line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub item_id: String,
    pub description: String,
    pub unit: String,
    pub total_overage: BigDecimal,
    pub total_shortage: BigDecimal,
    pub potential_benefit: BigDecimal,
}

/// Everything a report serializer needs for the consolidated export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub generated_at: NaiveDateTime,
    pub summary: Vec<SummaryRow>,
    pub total_overage: BigDecimal,
    pub total_shortage: BigDecimal,
    pub total_potential_benefit: BigDecimal,
    /// Same order as the input opportunities
    pub plans: Vec<ItemTransferPlan>,
}

impl ConsolidatedReport {
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
