use crate::error::Result;
use crate::models::{CountRecord, LocationVariance, RawCountRecord, ReconciliationOpportunity};
use crate::service::normalize::{coerce_cycle_dates, normalize_dated};
use bigdecimal::{BigDecimal, Zero};
use chrono::{Days, Local, NaiveDate};
use indexmap::map::Entry;
use indexmap::IndexMap;
use rayon::prelude::*;

/// Inputs of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileParams {
    /// Trailing window in days; callers keep it >= 1
    pub lookback_days: u32,
    /// Reference "today" the window is measured from
    pub as_of: NaiveDate,
}

impl ReconcileParams {
    pub fn new(lookback_days: u32, as_of: NaiveDate) -> Self {
        Self {
            lookback_days,
            as_of,
        }
    }

    /// Window ending on the local calendar date
    pub fn today(lookback_days: u32) -> Self {
        Self::new(lookback_days, Local::now().date_naive())
    }

    /// Oldest `cycle_date` still inside the window
    pub fn cutoff(&self) -> NaiveDate {
        self.as_of
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Find reconciliation opportunities in normalized records, most
/// beneficial first. Equal benefits are ordered by item id.
pub fn find_opportunities(
    records: &[CountRecord],
    params: ReconcileParams,
) -> Vec<ReconciliationOpportunity> {
    let cutoff = params.cutoff();
    let in_window: Vec<&CountRecord> = records
        .iter()
        .filter(|r| r.cycle_date >= cutoff)
        .collect();

    if in_window.is_empty() {
        tracing::debug!(
            "No count records since {} ({} supplied)",
            cutoff,
            records.len()
        );
        return Vec::new();
    }

    // 1. Latest count per (item_id, location)
    let current = latest_per_location(&in_window);

    // 2. Group by item, keeping first-seen order
    let mut by_item: IndexMap<&str, Vec<&CountRecord>> = IndexMap::new();
    for rec in current.into_values() {
        by_item.entry(rec.item_id.as_str()).or_default().push(rec);
    }

    // 3. Per-item aggregation
    let groups: Vec<Vec<&CountRecord>> = by_item
        .into_values()
        .filter(|recs| recs.len() > 1)
        .collect();
    let mut opportunities: Vec<ReconciliationOpportunity> = groups
        .into_par_iter()
        .filter_map(|recs| build_opportunity(&recs))
        .collect();

    // 4. Rank
    opportunities.sort_by(|a, b| {
        b.potential_benefit
            .cmp(&a.potential_benefit)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    tracing::info!(
        "Reconciliation window {}..={}: {} records in window, {} opportunities",
        cutoff,
        params.as_of,
        in_window.len(),
        opportunities.len()
    );

    opportunities
}

/// Same as [`find_opportunities`] over raw field maps. Every `cycle_date`
/// is checked first; required fields only on records inside the window.
pub fn find_opportunities_in_raw(
    raws: &[RawCountRecord],
    params: ReconcileParams,
) -> Result<Vec<ReconciliationOpportunity>> {
    if raws.is_empty() {
        return Ok(Vec::new());
    }

    let dates = coerce_cycle_dates(raws)?;
    let cutoff = params.cutoff();
    let records = raws
        .iter()
        .zip(dates)
        .enumerate()
        .filter(|(_, (_, date))| *date >= cutoff)
        .map(|(index, (raw, date))| normalize_dated(raw, index, date))
        .collect::<Result<Vec<_>>>()?;

    Ok(find_opportunities(&records, params))
}

/// On equal dates the record that appears later in the input wins.
fn latest_per_location<'a>(
    records: &[&'a CountRecord],
) -> IndexMap<(&'a str, &'a str), &'a CountRecord> {
    let mut latest: IndexMap<(&str, &str), &CountRecord> = IndexMap::new();
    for &rec in records {
        let key = (rec.item_id.as_str(), rec.location.as_str());
        match latest.entry(key) {
            Entry::Occupied(mut slot) => {
                if rec.cycle_date >= slot.get().cycle_date {
                    slot.insert(rec);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(rec);
            }
        }
    }
    latest
}

fn build_opportunity(records: &[&CountRecord]) -> Option<ReconciliationOpportunity> {
    let zero = BigDecimal::zero();

    let mut overages: Vec<LocationVariance> = records
        .iter()
        .filter(|r| r.variance > zero)
        .map(|r| location_variance(r))
        .collect();
    let mut shortages: Vec<LocationVariance> = records
        .iter()
        .filter(|r| r.variance < zero)
        .map(|r| location_variance(r))
        .collect();

    if overages.is_empty() || shortages.is_empty() {
        return None;
    }

    overages.sort_by(|a, b| {
        b.variance
            .cmp(&a.variance)
            .then_with(|| a.location.cmp(&b.location))
    });
    // Most negative first == largest absolute shortage first
    shortages.sort_by(|a, b| {
        a.variance
            .cmp(&b.variance)
            .then_with(|| a.location.cmp(&b.location))
    });

    let total_overage = sum_variance(&overages);
    let total_shortage = sum_variance(&shortages);
    let net_variance = &total_overage + &total_shortage;
    let potential_benefit = total_overage.clone().min(total_shortage.abs());

    let description = records
        .iter()
        .map(|r| r.description.as_str())
        .find(|d| !d.is_empty())
        .unwrap_or_default()
        .to_string();
    let unit = records
        .iter()
        .map(|r| r.unit.as_str())
        .find(|u| !u.is_empty())
        .unwrap_or_default()
        .to_string();

    Some(ReconciliationOpportunity {
        item_id: records[0].item_id.clone(),
        description,
        unit,
        overage_locations: overages,
        shortage_locations: shortages,
        total_overage,
        total_shortage,
        net_variance,
        potential_benefit,
    })
}

fn location_variance(rec: &CountRecord) -> LocationVariance {
    LocationVariance {
        location: rec.location.clone(),
        warehouse: rec.warehouse.clone(),
        variance: rec.variance.clone(),
        date: rec.cycle_date,
    }
}

fn sum_variance(locations: &[LocationVariance]) -> BigDecimal {
    locations
        .iter()
        .fold(BigDecimal::zero(), |acc, l| acc + &l.variance)
}
