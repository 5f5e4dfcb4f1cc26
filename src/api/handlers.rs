use crate::error::ReconcileError;
use crate::models::RawCountRecord;
use crate::service::{Attachment, OpportunitySet, ReconciliationService};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query string shared by the reconciliation endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileQuery {
    pub lookback_days: Option<u32>,
    pub warehouse: Option<String>,
}

impl ReconcileQuery {
    fn warehouse(&self) -> Option<&str> {
        self.warehouse
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}

/// Request body: raw count records to reconcile
#[derive(Debug, Deserialize)]
pub struct RawReconcileRequest {
    pub lookback_days: Option<u32>,
    pub records: Vec<RawCountRecord>,
}

/// Response body
#[derive(Debug, Serialize)]
pub struct OpportunitiesResponse {
    pub success: bool,
    pub message: String,
    pub result: Option<OpportunitySet>,
}

#[derive(Debug, Serialize)]
pub struct WarehousesResponse {
    pub success: bool,
    pub warehouses: Vec<String>,
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Ranked opportunities from the count record store
pub async fn list_opportunities(
    State(service): State<Arc<ReconciliationService>>,
    Query(query): Query<ReconcileQuery>,
) -> Response {
    match service
        .opportunities(query.lookback_days, query.warehouse())
        .await
    {
        Ok(set) => opportunities_response(set),
        Err(e) => error_response(e),
    }
}

/// Ranked opportunities over records posted by the caller
pub async fn reconcile_records(
    State(service): State<Arc<ReconciliationService>>,
    Json(req): Json<RawReconcileRequest>,
) -> Response {
    tracing::info!("Reconciling {} posted records", req.records.len());
    match service
        .opportunities_in_raw(req.lookback_days, req.records)
        .await
    {
        Ok(set) => opportunities_response(set),
        Err(e) => error_response(e),
    }
}

/// Consolidated CSV report download
pub async fn consolidated_report(
    State(service): State<Arc<ReconciliationService>>,
    Query(query): Query<ReconcileQuery>,
) -> Response {
    match service
        .consolidated_report(query.lookback_days, query.warehouse())
        .await
    {
        Ok(attachment) => csv_download(attachment),
        Err(e) => error_response(e),
    }
}

/// Single-item transfer plan download
pub async fn opportunity_report(
    State(service): State<Arc<ReconciliationService>>,
    Path(item_id): Path<String>,
    Query(query): Query<ReconcileQuery>,
) -> Response {
    match service
        .opportunity_report(&item_id, query.lookback_days, query.warehouse())
        .await
    {
        Ok(attachment) => csv_download(attachment),
        Err(e) => error_response(e),
    }
}

/// Warehouse names available for filtering
pub async fn list_warehouses(State(service): State<Arc<ReconciliationService>>) -> Response {
    match service.warehouses().await {
        Ok(warehouses) => (
            StatusCode::OK,
            Json(WarehousesResponse {
                success: true,
                warehouses,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

fn opportunities_response(set: OpportunitySet) -> Response {
    let message = if set.is_empty() {
        format!(
            "No reconciliation opportunities found in the last {} days",
            set.params.lookback_days
        )
    } else {
        format!(
            "Found {} reconciliation opportunities, total potential variance reduction {}",
            set.opportunities.len(),
            set.total_potential_benefit
        )
    };
    let response = OpportunitiesResponse {
        success: true,
        message,
        result: Some(set),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn csv_download(attachment: Attachment) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", attachment.file_name),
        ),
    ];
    (StatusCode::OK, headers, attachment.bytes).into_response()
}

/// Map an error to its status code
pub fn error_status(err: &ReconcileError) -> StatusCode {
    match err {
        ReconcileError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        ReconcileError::MissingField { .. } | ReconcileError::DataFormat { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReconcileError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ReconcileError) -> Response {
    let status = error_status(&err);
    if err.is_client_error() {
        tracing::warn!("Reconciliation request rejected: {}", err);
    } else if status == StatusCode::NOT_FOUND {
        tracing::info!("{}", err);
    } else {
        tracing::error!("Reconciliation failed: {}", err);
    }

    let response = ErrorResponse {
        success: false,
        message: format!("Error: {}", err),
    };
    (status, Json(response)).into_response()
}
