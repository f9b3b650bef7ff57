//! HTTP handlers for stock reports

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use shared::types::DateRange;

use crate::error::AppResult;
use crate::services::reporting::{LowStockEntry, ReportingService};
use crate::AppState;

/// Query parameters for the deviation report
#[derive(Debug, Deserialize)]
pub struct DeviationReportParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// "json" (default) or "csv"
    pub format: Option<String>,
}

/// Deviation report over a date range, as JSON or CSV
pub async fn get_deviation_report(
    State(state): State<AppState>,
    Query(params): Query<DeviationReportParams>,
) -> AppResult<Response> {
    let range = DateRange {
        start: params.start_date,
        end: params.end_date,
    };
    let entries = ReportingService::new(state.db.clone())
        .get_deviation_report(&range)
        .await?;

    if params.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&entries)?;
        return Ok(([(header::CONTENT_TYPE, "text/csv")], csv).into_response());
    }

    Ok(Json(entries).into_response())
}

/// Products at or below their reorder threshold
pub async fn get_low_stock_report(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LowStockEntry>>> {
    let entries = ReportingService::new(state.db.clone())
        .get_low_stock_report()
        .await?;
    Ok(Json(entries))
}
