//! Minimal GraphQL-over-HTTP envelope: a POSTed `{query, operationName, variables}`
//! body and a `{data, errors}` response.

use crate::utils::error::{Result, ScrapeError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Any reported error fails the whole response, even alongside partial data.
    pub fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let message = self
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ScrapeError::GraphQlError { message });
        }

        self.data.ok_or_else(|| ScrapeError::GraphQlError {
            message: "response contained no data".to_string(),
        })
    }
}
