use chrono::NaiveDate;
use contracts::dashboards::d402_ecommerce_sales::{DashboardErrorCode, DashboardErrorResponse};
use thiserror::Error;

/// Ошибки построения дашборда
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A source table could not be fetched or decoded. Fatal for the request.
    #[error("{source_name} dataset unavailable: {reason}")]
    DataUnavailable { source_name: String, reason: String },

    /// Start date after end date. Recoverable, nothing is aggregated.
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("{field} is not a valid date (expected YYYY-MM-DD): {value}")]
    InvalidDate { field: &'static str, value: String },
}

impl DashboardError {
    pub fn data_unavailable(source_name: &str, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn code(&self) -> DashboardErrorCode {
        match self {
            Self::DataUnavailable { .. } => DashboardErrorCode::DataUnavailable,
            Self::InvalidRange { .. } => DashboardErrorCode::InvalidRange,
            Self::InvalidDate { .. } => DashboardErrorCode::InvalidDate,
        }
    }

    /// Caller-side validation problem (as opposed to an upstream failure)
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::DataUnavailable { .. })
    }

    pub fn to_response(&self) -> DashboardErrorResponse {
        DashboardErrorResponse::new(self.code(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = DashboardError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2018, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
        };
        assert!(err.is_user_error());
        let body = err.to_response();
        assert_eq!(body.code, DashboardErrorCode::InvalidRange);
        assert_eq!(body.message, "start date 2018-02-01 is after end date 2018-01-01");
    }

    #[test]
    fn test_data_unavailable_is_not_user_error() {
        let err = DashboardError::data_unavailable("orders", "connection refused");
        assert!(!err.is_user_error());
        assert_eq!(err.code(), DashboardErrorCode::DataUnavailable);
        assert_eq!(err.to_string(), "orders dataset unavailable: connection refused");
    }
}
