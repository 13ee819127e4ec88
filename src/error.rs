// =============================================================================
// Service Errors
// =============================================================================
//
// Every failure a request can hit on its way through the pipeline. Calculators
// never produce these: insufficient history degrades to an empty result, and
// numerical edge cases (VPT divide-by-zero, RSI zero-loss) become undefined
// values locally.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The `simulated_date` string is not `YYYY-MM-DD`.
    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDateFormat,

    /// No bars exist for the symbol at all.
    #[error("No data found for symbol {0}")]
    SymbolNotFound(String),

    /// Bars exist for the symbol, but none fall inside the resolved window.
    #[error("No data found for {symbol} in timeframe {timeframe}")]
    NoDataInWindow { symbol: String, timeframe: String },

    /// No bar exists on or before the requested date.
    #[error("No data found for {symbol} on or before {date}")]
    NoDataOnOrBefore { symbol: String, date: NaiveDate },

    /// The series extractor was handed an empty bar sequence.
    #[error("No bars to extract a series from")]
    NoData,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidDateFormat | Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::SymbolNotFound(_)
            | Self::NoDataInWindow { .. }
            | Self::NoDataOnOrBefore { .. }
            | Self::NoData => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_have_distinct_messages() {
        let missing = ServiceError::SymbolNotFound("AAPL".into());
        let window = ServiceError::NoDataInWindow {
            symbol: "AAPL".into(),
            timeframe: "1W".into(),
        };
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(window.status_code(), StatusCode::NOT_FOUND);
        assert_ne!(missing.to_string(), window.to_string());
        assert_eq!(window.to_string(), "No data found for AAPL in timeframe 1W");
    }

    #[test]
    fn bad_input_maps_to_400() {
        assert_eq!(
            ServiceError::InvalidDateFormat.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InvalidParameter("period".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
