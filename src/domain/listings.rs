//! Typed listing shapes, one per dataset. Each converts into a [`Record`]
//! through serde, so the field names here are the JSON keys and CSV headers.
//!
//! [`Record`]: crate::domain::model::Record

use serde::{Deserialize, Serialize};

/// A venue detail page on Blissful Brides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BbVenue {
    pub id: String,
    pub slug: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    pub has_price_list: bool,
    pub price_list_count: usize,
    /// Present only when the price list page listed PDF links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_list_pdfs: Option<Vec<String>>,
}

impl BbVenue {
    pub fn set_price_lists(&mut self, pdfs: Vec<String>) {
        self.has_price_list = !pdfs.is_empty();
        self.price_list_count = pdfs.len();
        self.price_list_pdfs = Some(pdfs);
    }

    pub fn clear_price_lists(&mut self) {
        self.has_price_list = false;
        self.price_list_count = 0;
        self.price_list_pdfs = None;
    }
}

/// A wedding marketplace package page on Blissful Brides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketplacePackage {
    pub id: String,
    pub slug: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One row of the Blissful Brides banquet price table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BanquetVendor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dinner_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_max: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_lists: Option<Vec<String>>,
}

/// A listing returned by The Wedding Notebook `getListings` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwnListing {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub venue: Option<TwnVenueDetails>,
}

/// Values are kept as received, whether the API sends numbers or strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwnVenueDetails {
    pub min_capacity: Option<serde_json::Value>,
    pub max_capacity: Option<serde_json::Value>,
    pub min_price: Option<serde_json::Value>,
    pub max_price: Option<serde_json::Value>,
    pub indoor_outdoor: Option<serde_json::Value>,
}

/// CSV column order for Wedding Notebook listings.
pub const TWN_COLUMNS: [&str; 12] = [
    "_id",
    "name",
    "slug",
    "category",
    "state",
    "city",
    "address",
    "venue_minCapacity",
    "venue_maxCapacity",
    "venue_minPrice",
    "venue_maxPrice",
    "venue_indoorOutdoor",
];

/// A venue page on Bridely. Missing values are written as null.
///
/// The static pages carry no capacity, address, rating or package details, so
/// those columns are always null (and `amenities` empty) but kept for a stable
/// CSV layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridelyVenue {
    pub url: String,
    pub venue_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub capacity: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub rating: Option<String>,
    pub review_count: Option<u64>,
    pub price_range: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub amenities: Vec<String>,
    pub venue_type: Option<String>,
    pub indoor_outdoor: Option<String>,
    pub package_info: Option<String>,
}

/// A venue brochure page on Bridely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridelyBrochure {
    pub url: String,
    pub brochure_id: Option<String>,
    pub venue_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub download_link: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;

    #[test]
    fn test_bb_venue_omits_missing_optionals() {
        let venue = BbVenue {
            id: "12".to_string(),
            slug: "grand-hall".to_string(),
            url: "https://example.com/detail/12/grand-hall".to_string(),
            name: Some("Grand Hall".to_string()),
            ..Default::default()
        };

        let record = Record::from_item(&venue).unwrap();
        assert_eq!(record.get_str("name"), Some("Grand Hall"));
        assert!(!record.data.contains_key("phone"));
        assert!(!record.data.contains_key("price_list_pdfs"));
        assert_eq!(record.data["has_price_list"], serde_json::json!(false));
        assert_eq!(record.data["price_list_count"], serde_json::json!(0));
    }

    #[test]
    fn test_set_price_lists_updates_flags() {
        let mut venue = BbVenue::default();
        venue.set_price_lists(vec!["a.pdf".to_string(), "b.pdf".to_string()]);
        assert!(venue.has_price_list);
        assert_eq!(venue.price_list_count, 2);

        venue.set_price_lists(vec![]);
        assert!(!venue.has_price_list);
        assert_eq!(venue.price_list_pdfs, Some(vec![]));
    }

    #[test]
    fn test_twn_listing_keeps_wire_names() {
        let listing: TwnListing = serde_json::from_value(serde_json::json!({
            "_id": "abc",
            "name": "Garden Terrace",
            "state": "Selangor",
            "venue": {"minCapacity": 100, "maxPrice": 250.5, "indoorOutdoor": "Outdoor"}
        }))
        .unwrap();

        let record = Record::from_item(&listing).unwrap();
        assert_eq!(record.get_str("_id"), Some("abc"));
        assert_eq!(record.data["venue"]["minCapacity"], serde_json::json!(100));
        assert_eq!(record.data["venue"]["maxPrice"], serde_json::json!(250.5));
        assert!(record.data["city"].is_null());
    }

    #[test]
    fn test_twn_venue_details_accept_text_values() {
        let listing: TwnListing = serde_json::from_value(serde_json::json!({
            "_id": "a1",
            "name": "Hall",
            "venue": {"minPrice": "RM 120", "maxCapacity": "500", "minCapacity": 80}
        }))
        .unwrap();

        let venue = listing.venue.unwrap();
        assert_eq!(venue.min_price, Some(serde_json::json!("RM 120")));
        assert_eq!(venue.max_capacity, Some(serde_json::json!("500")));
        assert_eq!(venue.min_capacity, Some(serde_json::json!(80)));
    }
}
