pub mod finder;
pub mod normalize;
pub mod planner;
pub mod reconciler;

pub use finder::{find_opportunities, find_opportunities_in_raw, ReconcileParams};
pub use normalize::{normalize_record, normalize_records, parse_cycle_date};
pub use planner::{build_consolidated_plan, build_item_plan, build_transfer_plan};
pub use reconciler::{Attachment, OpportunitySet, ReconciliationService};
