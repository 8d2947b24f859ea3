use crate::{config::AppConfig, errors::ServiceError, services::{DateRange, Page}};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::IntoParams;

/// JSON body extractor whose rejections are [`ServiceError`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string extractor whose rejections are [`ServiceError`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Offset pagination shared by every list endpoint
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Number of records to skip (default 0)
    #[param(minimum = 0)]
    pub skip: Option<u64>,
    /// Maximum number of records to return (default 100, capped by configuration)
    #[param(minimum = 1)]
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn page(&self, config: &AppConfig) -> Result<Page, ServiceError> {
        let limit = match self.limit {
            Some(0) => {
                return Err(ServiceError::ValidationError(
                    "limit must be at least 1".to_string(),
                ))
            }
            Some(limit) => limit.min(config.api_max_page_size),
            None => config.api_default_page_size,
        };
        Ok(Page::new(self.skip.unwrap_or(0), limit))
    }
}

/// Optional inclusive date bounds
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeParams {
    /// Inclusive lower bound (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`, UTC)
    pub start_date: Option<String>,
    /// Inclusive upper bound (same formats as `start_date`)
    pub end_date: Option<String>,
}

impl DateRangeParams {
    pub fn range(&self) -> Result<DateRange, ServiceError> {
        DateRange::new(
            parse_optional_timestamp("start_date", self.start_date.as_deref())?,
            parse_optional_timestamp("end_date", self.end_date.as_deref())?,
        )
    }
}

/// Parses an ISO-8601 date or timestamp. Values without an offset are UTC;
/// a bare date means midnight UTC.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    let value = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(ServiceError::ValidationError(format!(
        "{} must be an ISO-8601 date or timestamp, got '{}'",
        field, raw
    )))
}

pub fn parse_optional_timestamp(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ServiceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_timestamp(field, value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "development".into(),
        )
    }

    #[rstest]
    #[case("2024-03-01T10:30:00Z", Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())]
    #[case("2024-03-01T12:30:00+02:00", Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())]
    #[case("2024-03-01T10:30:00", Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())]
    #[case("2024-03-01 10:30:00", Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap())]
    #[case("2024-03-01", Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())]
    fn parses_supported_formats(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_timestamp("start_date", raw).unwrap(), expected);
    }

    #[test]
    fn keeps_fractional_seconds() {
        let parsed = parse_timestamp("start_date", "2024-03-01T10:30:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2024-13-01")]
    #[case("01/03/2024")]
    fn rejects_unparseable_values(#[case] raw: &str) {
        let err = parse_timestamp("end_date", raw).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(ref msg) if msg.contains("end_date")));
    }

    #[test]
    fn blank_optional_timestamp_is_unbounded() {
        assert_eq!(parse_optional_timestamp("start_date", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_timestamp("start_date", None).unwrap(), None);
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        let cfg = config();
        assert_eq!(
            PaginationParams::default().page(&cfg).unwrap(),
            Page::new(0, 100)
        );
        let large = PaginationParams {
            skip: Some(20),
            limit: Some(50_000),
        };
        assert_eq!(large.page(&cfg).unwrap(), Page::new(20, 1000));
        let zero = PaginationParams {
            skip: None,
            limit: Some(0),
        };
        assert!(zero.page(&cfg).is_err());
    }
}
