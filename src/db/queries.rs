use crate::models::{CountRecord, CycleCountRow};
use chrono::NaiveDate;
use futures::TryStreamExt;
use sqlx::PgPool;

/// Count records with `cycle_date >= since`, optionally for one warehouse.
/// Upload order is kept so later uploads win ties on the same date.
pub async fn list_cycle_counts_since(
    pool: &PgPool,
    since: NaiveDate,
    warehouse: Option<&str>,
) -> Result<Vec<CountRecord>, sqlx::Error> {
    sqlx::query_as::<_, CycleCountRow>(
        r#"
        SELECT cc.item_id,
               cc.description,
               cc.location,
               w.name AS warehouse,
               cc.unit,
               cc.system_count,
               cc.actual_count,
               cc.variance,
               cc.cycle_date,
               cc.notes
        FROM cycle_counts cc
        LEFT JOIN warehouses w ON w.id = cc.warehouse_id
        WHERE cc.cycle_date >= $1
          AND ($2::text IS NULL OR w.name = $2)
        ORDER BY cc.uploaded_at, cc.id
        "#
    )
    .bind(since)
    .bind(warehouse)
    .fetch(pool)
    .map_ok(CountRecord::from)
    .try_collect()
    .await
}

/// Names of all warehouses, for the warehouse filter
pub async fn list_warehouse_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT name
        FROM warehouses
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await
}
