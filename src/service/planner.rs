use crate::models::{
    ConsolidatedReport, ItemTransferPlan, ReconciliationOpportunity, SummaryRow,
    TransferDestination, TransferRow, TransferSource,
};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;

/// Pair overages with shortages by rank: the i-th largest surplus goes
/// next to the i-th largest deficit. The shorter side is padded with
/// blanks so every location appears exactly once.
pub fn build_transfer_plan(opportunity: &ReconciliationOpportunity) -> Vec<TransferRow> {
    let mut overages: Vec<_> = opportunity.overage_locations.iter().collect();
    let mut shortages: Vec<_> = opportunity.shortage_locations.iter().collect();

    // Stable sorts: equal variances keep the finder's order
    overages.sort_by(|a, b| b.variance.cmp(&a.variance));
    shortages.sort_by(|a, b| b.variance.abs().cmp(&a.variance.abs()));

    let rows = overages.len().max(shortages.len());
    (0..rows)
        .map(|i| TransferRow {
            source: overages.get(i).map(|o| TransferSource {
                location: o.location.clone(),
                warehouse: o.warehouse.clone(),
                qty_to_move: o.variance.clone(),
            }),
            destination: shortages.get(i).map(|s| TransferDestination {
                location: s.location.clone(),
                warehouse: s.warehouse.clone(),
                missing_qty: s.variance.abs(),
            }),
            completed: false,
        })
        .collect()
}

/// Plan of one item with its headline numbers
pub fn build_item_plan(opportunity: &ReconciliationOpportunity) -> ItemTransferPlan {
    ItemTransferPlan {
        item_id: opportunity.item_id.clone(),
        description: opportunity.description.clone(),
        unit: opportunity.unit.clone(),
        total_overage: opportunity.total_overage.clone(),
        total_shortage: opportunity.total_shortage.clone(),
        net_variance: opportunity.net_variance.clone(),
        potential_benefit: opportunity.potential_benefit.clone(),
        rows: build_transfer_plan(opportunity),
    }
}

/// Summary table, grand totals and every item's plan, in input order
pub fn build_consolidated_plan(
    opportunities: &[ReconciliationOpportunity],
    generated_at: NaiveDateTime,
) -> ConsolidatedReport {
    let mut total_overage = BigDecimal::zero();
    let mut total_shortage = BigDecimal::zero();
    let mut total_potential_benefit = BigDecimal::zero();
    let mut summary = Vec::with_capacity(opportunities.len());
    let mut plans = Vec::with_capacity(opportunities.len());

    for opp in opportunities {
        total_overage += &opp.total_overage;
        total_shortage += &opp.total_shortage;
        total_potential_benefit += &opp.potential_benefit;

        summary.push(SummaryRow {
            item_id: opp.item_id.clone(),
            description: opp.description.clone(),
            unit: opp.unit.clone(),
            total_overage: opp.total_overage.clone(),
            total_shortage: opp.total_shortage.clone(),
            potential_benefit: opp.potential_benefit.clone(),
        });
        plans.push(build_item_plan(opp));
    }

    ConsolidatedReport {
        generated_at,
        summary,
        total_overage,
        total_shortage,
        total_potential_benefit,
        plans,
    }
}
