use crate::error::Result;
use crate::models::{ConsolidatedReport, ItemTransferPlan, TransferRow};
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use csv::{Writer, WriterBuilder};
use std::io::Write;

const TRANSFER_HEADER: [&str; 7] = [
    "SOURCE LOCATION (Overage)",
    "Warehouse",
    "Qty to Move",
    "DESTINATION LOCATION (Shortage)",
    "Warehouse",
    "Missing Qty",
    "Transfer Complete",
];

const UNCHECKED: &str = "\u{25A1}";
const CHECKED: &str = "\u{2611}";
const NOTE_LINES: usize = 5;

/// Download name for the consolidated report
pub fn report_file_name(generated_at: NaiveDateTime) -> String {
    format!(
        "reconciliation_report_{}.csv",
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Download name for a single item's plan
pub fn opportunity_file_name(item_id: &str, generated_at: NaiveDateTime) -> String {
    let safe: String = item_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!(
        "reconciliation_plan_{}_{}.csv",
        safe,
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Render the consolidated report: title block, summary table with grand
/// totals, then one transfer table per item in report order.
pub fn write_consolidated_report<W: Write>(report: &ConsolidatedReport, out: W) -> Result<()> {
    let mut wtr = grid_writer(out);

    wtr.write_record(["Inventory Reconciliation Opportunities"])?;
    wtr.write_record([generated_line(report.generated_at)])?;
    wtr.write_record([format!("Total opportunities: {}", report.plans.len())])?;

    // Summary
    wtr.write_record([
        "Item ID",
        "Description",
        "Unit",
        "Total Overage",
        "Total Shortage",
        "Potential Benefit",
    ])?;
    for row in &report.summary {
        wtr.write_record([
            row.item_id.clone(),
            row.description.clone(),
            row.unit.clone(),
            signed(&row.total_overage),
            signed(&row.total_shortage),
            quantity(&row.potential_benefit),
        ])?;
    }
    wtr.write_record([
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        signed(&report.total_overage),
        signed(&report.total_shortage),
        quantity(&report.total_potential_benefit),
    ])?;

    // Per-item plans
    wtr.write_record(["DETAILED TRANSFER PLANS"])?;
    for plan in &report.plans {
        wtr.write_record([
            "ITEM:".to_string(),
            plan.item_id.clone(),
            plan.description.clone(),
            format!("Unit: {}", plan.unit),
            format!("Benefit: {}", quantity(&plan.potential_benefit)),
        ])?;
        wtr.write_record(TRANSFER_HEADER)?;
        for row in &plan.rows {
            wtr.write_record(transfer_cells(row))?;
        }
    }

    wtr.flush()?;
    tracing::debug!("Consolidated report written: {} items", report.plans.len());
    Ok(())
}

/// Render a printable plan for one item, with action steps, a completion
/// checkbox per row and blank lines for notes.
pub fn write_opportunity_report<W: Write>(
    plan: &ItemTransferPlan,
    generated_at: NaiveDateTime,
    out: W,
) -> Result<()> {
    let mut wtr = grid_writer(out);

    wtr.write_record(["Inventory Reconciliation Plan"])?;
    wtr.write_record([generated_line(generated_at)])?;
    wtr.write_record([
        "Item ID:".to_string(),
        plan.item_id.clone(),
        "Description:".to_string(),
        plan.description.clone(),
    ])?;
    wtr.write_record(["Unit:".to_string(), plan.unit.clone()])?;

    wtr.write_record(["RECONCILIATION SUMMARY"])?;
    wtr.write_record([
        "Total Overage:".to_string(),
        signed(&plan.total_overage),
        "Total Shortage:".to_string(),
        signed(&plan.total_shortage),
    ])?;
    wtr.write_record([
        "Net Variance After Reconciliation:".to_string(),
        signed(&plan.net_variance),
        "Potential Benefit:".to_string(),
        quantity(&plan.potential_benefit),
    ])?;

    wtr.write_record(["ACTION PLAN"])?;
    wtr.write_record(["1. Verify current quantities at all locations listed below"])?;
    wtr.write_record([
        "2. Transfer inventory from 'Source' locations to 'Destination' locations as indicated",
    ])?;
    wtr.write_record(["3. Update system counts after physical transfer is complete"])?;

    wtr.write_record(TRANSFER_HEADER)?;
    for row in &plan.rows {
        wtr.write_record(transfer_cells(row))?;
    }

    wtr.write_record(["NOTES:"])?;
    for _ in 0..NOTE_LINES {
        wtr.write_record(["", "", "", "", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

fn grid_writer<W: Write>(out: W) -> Writer<W> {
    WriterBuilder::new().flexible(true).from_writer(out)
}

fn generated_line(at: NaiveDateTime) -> String {
    format!("Generated: {}", at.format("%Y-%m-%d %H:%M"))
}

fn transfer_cells(row: &TransferRow) -> [String; 7] {
    let (src_loc, src_wh, src_qty) = match &row.source {
        Some(s) => (s.location.clone(), s.warehouse.clone(), signed(&s.qty_to_move)),
        None => Default::default(),
    };
    let (dst_loc, dst_wh, dst_qty) = match &row.destination {
        Some(d) => (d.location.clone(), d.warehouse.clone(), quantity(&d.missing_qty)),
        None => Default::default(),
    };
    let marker = if row.completed { CHECKED } else { UNCHECKED };
    [src_loc, src_wh, src_qty, dst_loc, dst_wh, dst_qty, marker.to_string()]
}

/// Rounded half away from zero to two decimals, no sign
fn quantity(value: &BigDecimal) -> String {
    two_places(value).to_string()
}

/// Like [`quantity`]; overages carry an explicit `+` so they read apart from shortages
fn signed(value: &BigDecimal) -> String {
    let rounded = two_places(value);
    if rounded > BigDecimal::zero() {
        format!("+{}", rounded)
    } else {
        rounded.to_string()
    }
}

fn two_places(value: &BigDecimal) -> BigDecimal {
    value.round(2).with_scale(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SummaryRow, TransferDestination, TransferSource};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(14, 30, 5)
            .unwrap()
    }

    fn plan() -> ItemTransferPlan {
        ItemTransferPlan {
            item_id: "D400".to_string(),
            description: "Pallet wrap".to_string(),
            unit: "RL".to_string(),
            total_overage: BigDecimal::from(15),
            total_shortage: BigDecimal::from(-10),
            net_variance: BigDecimal::from(5),
            potential_benefit: BigDecimal::from(10),
            rows: vec![
                TransferRow {
                    source: Some(TransferSource {
                        location: "S1".to_string(),
                        warehouse: "North".to_string(),
                        qty_to_move: BigDecimal::from(8),
                    }),
                    destination: Some(TransferDestination {
                        location: "D1".to_string(),
                        warehouse: "South".to_string(),
                        missing_qty: BigDecimal::from(6),
                    }),
                    completed: false,
                },
                TransferRow {
                    source: Some(TransferSource {
                        location: "S3".to_string(),
                        warehouse: "North".to_string(),
                        qty_to_move: BigDecimal::from(2),
                    }),
                    destination: None,
                    completed: false,
                },
            ],
        }
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(report_file_name(at()), "reconciliation_report_20250615_143005.csv");
        assert_eq!(
            opportunity_file_name("A/100 x", at()),
            "reconciliation_plan_A_100_x_20250615_143005.csv"
        );
    }

    #[test]
    fn test_consolidated_layout() {
        let p = plan();
        let report = ConsolidatedReport {
            generated_at: at(),
            summary: vec![SummaryRow {
                item_id: p.item_id.clone(),
                description: p.description.clone(),
                unit: p.unit.clone(),
                total_overage: p.total_overage.clone(),
                total_shortage: p.total_shortage.clone(),
                potential_benefit: p.potential_benefit.clone(),
            }],
            total_overage: BigDecimal::from(15),
            total_shortage: BigDecimal::from(-10),
            total_potential_benefit: BigDecimal::from(10),
            plans: vec![p],
        };

        let text = render(|buf| write_consolidated_report(&report, buf));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Inventory Reconciliation Opportunities");
        assert_eq!(lines[1], "Generated: 2025-06-15 14:30");
        assert_eq!(lines[2], "Total opportunities: 1");
        assert_eq!(lines[4], "D400,Pallet wrap,RL,+15.00,-10.00,10.00");
        assert_eq!(lines[5], "TOTAL,,,+15.00,-10.00,10.00");
        assert_eq!(lines[6], "DETAILED TRANSFER PLANS");
        assert_eq!(lines[7], "ITEM:,D400,Pallet wrap,Unit: RL,Benefit: 10.00");
        assert!(lines[8].starts_with(
            "SOURCE LOCATION (Overage),Warehouse,Qty to Move,DESTINATION LOCATION (Shortage),Warehouse,Missing Qty"
        ));
        assert_eq!(lines[9], "S1,North,+8.00,D1,South,6.00,\u{25A1}");
        assert_eq!(lines[10], "S3,North,+2.00,,,,\u{25A1}");
    }

    #[test]
    fn test_single_plan_layout() {
        let text = render(|buf| write_opportunity_report(&plan(), at(), buf));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Inventory Reconciliation Plan");
        assert_eq!(lines[2], "Item ID:,D400,Description:,Pallet wrap");
        assert_eq!(lines[5], "Total Overage:,+15.00,Total Shortage:,-10.00");
        assert_eq!(lines[6], "Net Variance After Reconciliation:,+5.00,Potential Benefit:,10.00");
        assert!(text.contains("NOTES:"));
        assert!(lines.last().unwrap().starts_with(",,,,"));
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_quantities_round_to_two_places() {
        assert_eq!(quantity(&dec("2.999")), "3.00");
        assert_eq!(quantity(&dec("-2.999")), "-3.00");
        assert_eq!(quantity(&dec("1.005")), "1.01");
        assert_eq!(quantity(&dec("1.004")), "1.00");
        assert_eq!(quantity(&dec("2.5")), "2.50");
        assert_eq!(signed(&dec("2.999")), "+3.00");
        assert_eq!(signed(&dec("-2.999")), "-3.00");
        // Too small to show as an overage
        assert_eq!(signed(&dec("0.004")), "0.00");
    }

    #[test]
    fn test_fractional_transfer_row() {
        let row = TransferRow {
            source: Some(TransferSource {
                location: "S1".to_string(),
                warehouse: "North".to_string(),
                qty_to_move: dec("2.999"),
            }),
            destination: Some(TransferDestination {
                location: "D1".to_string(),
                warehouse: "South".to_string(),
                missing_qty: dec("1.255"),
            }),
            completed: false,
        };
        let cells = transfer_cells(&row);
        assert_eq!(cells[2], "+3.00");
        assert_eq!(cells[5], "1.26");
    }
}
