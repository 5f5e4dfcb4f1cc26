pub mod opportunity;
pub mod plan;
pub mod record;

pub use opportunity::{LocationVariance, ReconciliationOpportunity};
pub use plan::{
    ConsolidatedReport, ItemTransferPlan, SummaryRow, TransferDestination, TransferRow,
    TransferSource,
};
pub use record::{CountRecord, CycleCountRow, RawCountRecord, UNKNOWN_WAREHOUSE};
