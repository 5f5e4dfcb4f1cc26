use crate::config::ReconciliationConfig;
use crate::db::queries;
use crate::error::{ReconcileError, Result};
use crate::export;
use crate::models::{RawCountRecord, ReconciliationOpportunity};
use crate::service::finder::{find_opportunities, find_opportunities_in_raw, ReconcileParams};
use crate::service::planner::{build_consolidated_plan, build_item_plan};
use bigdecimal::{BigDecimal, Zero};
use chrono::Local;
use serde::Serialize;
use sqlx::PgPool;

/// Ranked opportunities together with the window they were computed for
#[derive(Debug, Clone, Serialize)]
pub struct OpportunitySet {
    pub params: ReconcileParamsView,
    pub total_potential_benefit: BigDecimal,
    pub opportunities: Vec<ReconciliationOpportunity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileParamsView {
    pub lookback_days: u32,
    pub as_of: chrono::NaiveDate,
    pub cutoff: chrono::NaiveDate,
}

impl OpportunitySet {
    fn new(params: ReconcileParams, opportunities: Vec<ReconciliationOpportunity>) -> Self {
        let total_potential_benefit = opportunities
            .iter()
            .fold(BigDecimal::zero(), |acc, o| acc + &o.potential_benefit);
        Self {
            params: ReconcileParamsView {
                lookback_days: params.lookback_days,
                as_of: params.as_of,
                cutoff: params.cutoff(),
            },
            total_potential_benefit,
            opportunities,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}

/// A rendered report ready for download
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Reconciliation over the count record store
pub struct ReconciliationService {
    pool: PgPool,
    settings: ReconciliationConfig,
}

impl ReconciliationService {
    pub fn new(pool: PgPool, settings: ReconciliationConfig) -> Self {
        Self { pool, settings }
    }

    /// Resolve and range-check the caller's look-back against today
    pub fn params(&self, lookback_days: Option<u32>) -> Result<ReconcileParams> {
        let days = self.settings.validate_lookback(lookback_days)?;
        Ok(ReconcileParams::today(days))
    }

    /// Opportunities from the store for the window, optionally one warehouse
    pub async fn opportunities(
        &self,
        lookback_days: Option<u32>,
        warehouse: Option<&str>,
    ) -> Result<OpportunitySet> {
        let params = self.params(lookback_days)?;
        let records = queries::list_cycle_counts_since(&self.pool, params.cutoff(), warehouse).await?;
        tracing::info!(
            "Loaded {} count records since {} (warehouse: {})",
            records.len(),
            params.cutoff(),
            warehouse.unwrap_or("all")
        );

        let opportunities =
            tokio::task::spawn_blocking(move || find_opportunities(&records, params)).await?;
        Ok(OpportunitySet::new(params, opportunities))
    }

    /// Opportunities over caller-supplied raw records; the store is not read
    pub async fn opportunities_in_raw(
        &self,
        lookback_days: Option<u32>,
        records: Vec<RawCountRecord>,
    ) -> Result<OpportunitySet> {
        let params = self.params(lookback_days)?;
        let opportunities =
            tokio::task::spawn_blocking(move || find_opportunities_in_raw(&records, params))
                .await??;
        Ok(OpportunitySet::new(params, opportunities))
    }

    /// Consolidated CSV report of every opportunity in the window
    pub async fn consolidated_report(
        &self,
        lookback_days: Option<u32>,
        warehouse: Option<&str>,
    ) -> Result<Attachment> {
        let set = self.opportunities(lookback_days, warehouse).await?;
        let generated_at = Local::now().naive_local();
        let report = build_consolidated_plan(&set.opportunities, generated_at);

        let mut bytes = Vec::new();
        export::write_consolidated_report(&report, &mut bytes)?;
        tracing::info!(
            "Consolidated report generated: {} items, total benefit {}",
            report.plans.len(),
            report.total_potential_benefit
        );

        Ok(Attachment {
            file_name: export::report_file_name(generated_at),
            bytes,
        })
    }

    /// Printable transfer plan for one item
    pub async fn opportunity_report(
        &self,
        item_id: &str,
        lookback_days: Option<u32>,
        warehouse: Option<&str>,
    ) -> Result<Attachment> {
        let set = self.opportunities(lookback_days, warehouse).await?;
        let Some(opportunity) = set.opportunities.iter().find(|o| o.item_id == item_id) else {
            return Err(ReconcileError::NotFound(format!(
                "no reconciliation opportunity for item {} in the last {} days",
                item_id, set.params.lookback_days
            )));
        };

        let generated_at = Local::now().naive_local();
        let plan = build_item_plan(opportunity);
        let mut bytes = Vec::new();
        export::write_opportunity_report(&plan, generated_at, &mut bytes)?;

        Ok(Attachment {
            file_name: export::opportunity_file_name(item_id, generated_at),
            bytes,
        })
    }

    /// Warehouse names for the filter
    pub async fn warehouses(&self) -> Result<Vec<String>> {
        Ok(queries::list_warehouse_names(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountRecord;
    use chrono::NaiveDate;

    fn rec(item: &str, loc: &str, variance: i64) -> CountRecord {
        CountRecord {
            item_id: item.to_string(),
            description: String::new(),
            location: loc.to_string(),
            warehouse: "Main".to_string(),
            unit: String::new(),
            system_count: None,
            actual_count: None,
            variance: BigDecimal::from(variance),
            cycle_date: NaiveDate::from_ymd_opt(2025, 6, 14).unwrap(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_opportunity_set_totals_and_window() {
        let params = ReconcileParams::new(7, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let records = vec![
            rec("A", "L1", 4),
            rec("A", "L2", -6),
            rec("B", "L1", 3),
            rec("B", "L2", -1),
        ];
        let set = OpportunitySet::new(params, find_opportunities(&records, params));

        assert!(!set.is_empty());
        assert_eq!(set.total_potential_benefit, BigDecimal::from(5));
        assert_eq!(set.params.cutoff, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
    }

    #[test]
    fn test_empty_opportunity_set() {
        let params = ReconcileParams::new(7, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        let set = OpportunitySet::new(params, Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.total_potential_benefit, BigDecimal::zero());
    }
}
