use serde::Serialize;
use sqlx::FromRow;

/// Yearly statistics for one station. A field is `None` when every daily
/// value behind it was missing.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct YearlyAggregate {
    pub station: String,
    pub year: i64,
    #[sqlx(rename = "avg_max_temp_degC")]
    #[serde(rename = "avg_max_temp_degC")]
    pub avg_max_temp_deg_c: Option<f64>,
    #[sqlx(rename = "avg_min_temp_degC")]
    #[serde(rename = "avg_min_temp_degC")]
    pub avg_min_temp_deg_c: Option<f64>,
    pub total_precipitation_cm: Option<f64>,
}
