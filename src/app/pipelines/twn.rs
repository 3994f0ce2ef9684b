use crate::config::toml_config::TwnSettings;
use crate::core::export;
use crate::core::graphql::{GraphQlRequest, GraphQlResponse};
use crate::core::http::{HttpClient, Throttle};
use crate::domain::listings::{TwnListing, TWN_COLUMNS};
use crate::domain::model::{
    ColumnLayout, Dataset, LoadOptions, LoadOutcome, Record, TransformResult,
};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const OPERATION_NAME: &str = "GetListings";

const GET_LISTINGS_QUERY: &str = r#"
query GetListings($record: GetListingsInput) {
  getListings(record: $record) {
    listings {
      _id
      name
      slug
      category
      state
      city
      address
      venue {
        minCapacity
        maxCapacity
        minPrice
        maxPrice
        indoorOutdoor
      }
    }
    totalCount
  }
}
"#;

#[derive(Debug, Serialize)]
struct ListingsVariables<'a> {
    record: ListingsFilter<'a>,
}

#[derive(Debug, Serialize)]
struct ListingsFilter<'a> {
    category: &'a str,
    page: u32,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingsData {
    get_listings: ListingsPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingsPage {
    #[serde(default)]
    listings: Vec<Value>,
    total_count: Option<u64>,
}

/// Pages through The Wedding Notebook `getListings` GraphQL query.
pub struct TwnPipeline<S: Storage> {
    storage: S,
    http: HttpClient,
    throttle: Throttle,
    endpoint: String,
    page_size: usize,
    category: String,
    state: Option<String>,
    limit: Option<usize>,
    load_options: LoadOptions,
    dataset: Dataset,
}

impl<S: Storage> TwnPipeline<S> {
    pub fn new(storage: S, http: HttpClient, settings: &TwnSettings, stem: impl Into<String>) -> Self {
        Self {
            storage,
            http,
            throttle: Throttle::from_secs_f64(1.0),
            endpoint: settings.endpoint.clone(),
            page_size: settings.page_size,
            category: settings.category.clone(),
            state: None,
            limit: None,
            load_options: LoadOptions::default(),
            dataset: Dataset {
                source: "twn",
                name: "listings",
                stem: stem.into(),
                required_fields: &["_id", "name"],
                columns: ColumnLayout::Fixed(TWN_COLUMNS.iter().map(|c| c.to_string()).collect()),
            },
        }
    }

    pub fn with_state(mut self, state: Option<String>) -> Self {
        self.state = state;
        self
    }

    /// Overrides the configured category when given.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        if let Some(category) = category {
            self.category = category;
        }
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_load_options(mut self, load_options: LoadOptions) -> Self {
        self.load_options = load_options;
        self
    }

    async fn fetch_page(&self, page: u32) -> Result<ListingsPage> {
        let request = GraphQlRequest {
            query: GET_LISTINGS_QUERY,
            operation_name: Some(OPERATION_NAME),
            variables: ListingsVariables {
                record: ListingsFilter {
                    category: &self.category,
                    page,
                    limit: self.page_size,
                    state: self.state.as_deref(),
                },
            },
        };

        let response: GraphQlResponse<ListingsData> =
            self.http.post_json(&self.endpoint, &request).await?;
        Ok(response.into_data()?.get_listings)
    }
}

/// Typed conversion of one raw listing; entries that do not fit the listing
/// shape are logged and dropped.
fn listing_record(raw: Value) -> Option<Record> {
    let converted = serde_json::from_value::<TwnListing>(raw)
        .map_err(ScrapeError::from)
        .and_then(|listing| Record::from_item(&listing));
    match converted {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!("⚠️ Skipping malformed listing: {}", e);
            None
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for TwnPipeline<S> {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    async fn extract(&self) -> Result<Vec<Record>> {
        match &self.state {
            Some(state) => tracing::info!("💍 Scraping {} in {}...", self.category, state),
            None => tracing::info!("💍 Scraping {}...", self.category),
        }

        let mut records = Vec::new();
        let mut page = 1;

        loop {
            if page > 1 {
                self.throttle.pause().await;
            }

            let result = self.fetch_page(page).await?;
            let received = result.listings.len();
            records.extend(result.listings.into_iter().filter_map(listing_record));

            tracing::info!(
                "Page {}: Got {} listings (total: {}/{})",
                page,
                received,
                records.len(),
                result
                    .total_count
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );

            if let Some(limit) = self.limit {
                if records.len() >= limit {
                    records.truncate(limit);
                    break;
                }
            }
            if received < self.page_size {
                break;
            }

            page += 1;
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        export::transform_records(&self.dataset, data, &self.load_options.formats)
    }

    async fn load(&self, result: TransformResult) -> Result<LoadOutcome> {
        export::load_result(&self.storage, &self.dataset, &self.load_options, &result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_omit_missing_state() {
        let filter = ListingsVariables {
            record: ListingsFilter {
                category: "venues",
                page: 2,
                limit: 50,
                state: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"record": {"category": "venues", "page": 2, "limit": 50}})
        );

        let filter = ListingsVariables {
            record: ListingsFilter {
                category: "venues",
                page: 1,
                limit: 50,
                state: Some("Selangor"),
            },
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap()["record"]["state"],
            json!("Selangor")
        );
    }

    #[test]
    fn test_listing_record_skips_malformed_entries() {
        assert!(listing_record(json!({"_id": "a1", "name": "Hall"})).is_some());
        assert!(listing_record(json!({"_id": 42, "name": "Hall"})).is_none());
        assert!(listing_record(json!("not an object")).is_none());
    }

    #[test]
    fn test_listing_record_keeps_text_prices() {
        let record = listing_record(json!({
            "_id": "a1",
            "name": "Hall",
            "venue": {"minPrice": "RM 120", "maxCapacity": "500"}
        }))
        .unwrap();
        assert_eq!(record.data["venue"]["minPrice"], json!("RM 120"));
        assert_eq!(record.data["venue"]["maxCapacity"], json!("500"));
    }

    #[test]
    fn test_response_shape() {
        let response: GraphQlResponse<ListingsData> = serde_json::from_value(json!({
            "data": {"getListings": {"listings": [{"_id": "a1"}], "totalCount": 120}}
        }))
        .unwrap();

        let page = response.into_data().unwrap().get_listings;
        assert_eq!(page.listings.len(), 1);
        assert_eq!(page.total_count, Some(120));
    }
}
