use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::server::AppState;

/// Raw query parameters of `GET /mean`.
///
/// Kept as strings so that a non-integer value produces the service's own error
/// message instead of the extractor's rejection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MeanQuery {
    pub requests: Option<String>,
    pub length: Option<String>,
}

impl MeanQuery {
    /// Collect the parameters from decoded query pairs. A repeated name keeps its
    /// first value; unknown names are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = MeanQuery::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "requests" => &mut query.requests,
                "length" => &mut query.length,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    /// Parse both parameters as integers, `requests` first. Bounds are checked by
    /// the aggregator.
    pub fn parse(&self) -> Result<(i64, i64), AppError> {
        let requests = parse_param("requests", self.requests.as_deref())?;
        let length = parse_param("length", self.length.as_deref())?;
        Ok((requests, length))
    }
}

/// Absent or empty means 1.
fn parse_param(name: &'static str, raw: Option<&str>) -> Result<i64, AppError> {
    match raw {
        None | Some("") => Ok(1),
        Some(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::not_an_integer(name)),
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn mean(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = MeanQuery::from_pairs(pairs);
    debug!(?query, "mean request");
    let (requests, length) = query.parse()?;
    let result = state.aggregator.aggregate(requests, length).await?;
    if result.is_fully_degraded() {
        warn!(requests, "every upstream fetch failed");
    }

    let body = serde_json::to_vec(&result)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
