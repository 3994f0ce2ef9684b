use crate::core::html::{self, non_empty};
use crate::domain::listings::{BridelyBrochure, BridelyVenue};
use crate::utils::error::Result;
use scraper::Html;

const LISTING_ID_MARKER: &str = "/r/";
const SITE_HOST: &str = "bridely.sg";

/// Sitemap URLs grouped by page type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlCatalog {
    pub vendors: Vec<String>,
    pub venues: Vec<String>,
    pub venue_brochures: Vec<String>,
    pub articles: Vec<String>,
    pub other: Vec<String>,
}

impl UrlCatalog {
    pub fn categorize(base_url: &str, urls: &[String]) -> Self {
        let prefix = format!("{}/", base_url.trim_end_matches('/'));
        let mut catalog = Self::default();

        for url in urls {
            let path = url.strip_prefix(&prefix).unwrap_or(url);
            let bucket = if path.starts_with("vendor/") {
                &mut catalog.vendors
            } else if path.starts_with("venue/") && path.contains(LISTING_ID_MARKER) {
                &mut catalog.venues
            } else if path.starts_with("venue-brochures/") {
                &mut catalog.venue_brochures
            } else if path.starts_with("articles/") {
                &mut catalog.articles
            } else {
                &mut catalog.other
            };
            bucket.push(url.clone());
        }

        tracing::info!(
            "vendors: {}, venues: {}, venue_brochures: {}, articles: {}, other: {}",
            catalog.vendors.len(),
            catalog.venues.len(),
            catalog.venue_brochures.len(),
            catalog.articles.len(),
            catalog.other.len()
        );
        catalog
    }
}

fn listing_id(url: &str) -> Option<String> {
    url.rsplit_once(LISTING_ID_MARKER)
        .and_then(|(_, id)| non_empty(id))
}

fn first_href(document: &Html, predicate: impl Fn(&str) -> bool) -> Result<Option<String>> {
    Ok(html::hrefs(document)?.into_iter().find(|href| predicate(href)))
}

pub fn parse_venue_page(url: &str, page: &str) -> Result<BridelyVenue> {
    let document = Html::parse_document(page);

    let phone = first_href(&document, |h| h.contains("tel:"))?
        .and_then(|h| non_empty(&h.replace("tel:", "")));
    let email = first_href(&document, |h| h.contains("mailto:"))?.and_then(|h| {
        let address = h.replace("mailto:", "");
        non_empty(address.split('?').next().unwrap_or_default())
    });

    Ok(BridelyVenue {
        url: url.to_string(),
        venue_id: listing_id(url),
        name: html::first_text(&document, "h1")?.and_then(|t| non_empty(&t)),
        kind: "venue".to_string(),
        description: html::meta_content(&document, r#"meta[name="description"]"#)?,
        phone,
        email,
        website: first_href(&document, |h| h.starts_with("http") && !h.contains(SITE_HOST))?,
        instagram: first_href(&document, |h| h.contains("instagram.com"))?,
        facebook: first_href(&document, |h| h.contains("facebook.com"))?,
        ..Default::default()
    })
}

pub fn parse_brochure_page(url: &str, page: &str) -> Result<BridelyBrochure> {
    let document = Html::parse_document(page);

    Ok(BridelyBrochure {
        url: url.to_string(),
        brochure_id: listing_id(url),
        venue_name: html::first_text(&document, "h1")?.and_then(|t| non_empty(&t)),
        kind: "brochure".to_string(),
        download_link: first_href(&document, |h| h.ends_with(".pdf"))?,
        description: html::meta_content(&document, r#"meta[name="description"]"#)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_urls() {
        let base = "https://www.bridely.sg";
        let urls: Vec<String> = [
            "https://www.bridely.sg/vendor/photo-studio",
            "https://www.bridely.sg/venue/grand-hall/r/abc123",
            "https://www.bridely.sg/venue/listing-page",
            "https://www.bridely.sg/venue-brochures/grand-hall/r/b55",
            "https://www.bridely.sg/articles/how-to-plan",
            "https://www.bridely.sg/",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let catalog = UrlCatalog::categorize(base, &urls);
        assert_eq!(catalog.vendors.len(), 1);
        assert_eq!(catalog.venues, vec!["https://www.bridely.sg/venue/grand-hall/r/abc123"]);
        assert_eq!(catalog.venue_brochures.len(), 1);
        assert_eq!(catalog.articles.len(), 1);
        assert_eq!(catalog.other.len(), 2);
    }

    #[test]
    fn test_parse_venue_page() {
        let page = r#"
        <html><head><meta name="description" content=" Rooftop venue "></head>
        <body>
          <h1>Sky Garden</h1>
          <a href="https://www.bridely.sg/venues">All venues</a>
          <a href="tel:+6590001111">Call</a>
          <a href="mailto:hello@skygarden.sg?subject=Wedding">Mail</a>
          <a href="https://www.instagram.com/skygarden">IG</a>
          <a href="https://facebook.com/skygarden">FB</a>
        </body></html>"#;

        let venue =
            parse_venue_page("https://www.bridely.sg/venue/sky-garden/r/v42", page).unwrap();

        assert_eq!(venue.venue_id.as_deref(), Some("v42"));
        assert_eq!(venue.name.as_deref(), Some("Sky Garden"));
        assert_eq!(venue.kind, "venue");
        assert_eq!(venue.description.as_deref(), Some("Rooftop venue"));
        assert_eq!(venue.phone.as_deref(), Some("+6590001111"));
        assert_eq!(venue.email.as_deref(), Some("hello@skygarden.sg"));
        // the first external link is the Instagram profile
        assert_eq!(venue.website.as_deref(), Some("https://www.instagram.com/skygarden"));
        assert_eq!(venue.instagram.as_deref(), Some("https://www.instagram.com/skygarden"));
        assert_eq!(venue.facebook.as_deref(), Some("https://facebook.com/skygarden"));
    }

    #[test]
    fn test_parse_brochure_page() {
        let page = r#"<h1>Sky Garden Brochure</h1>
            <a href="/files/preview.png">Preview</a>
            <a href="https://cdn.example.com/sky-garden.pdf">Download</a>"#;

        let brochure =
            parse_brochure_page("https://www.bridely.sg/venue-brochures/sky/r/b7", page).unwrap();

        assert_eq!(brochure.brochure_id.as_deref(), Some("b7"));
        assert_eq!(brochure.venue_name.as_deref(), Some("Sky Garden Brochure"));
        assert_eq!(brochure.kind, "brochure");
        assert_eq!(
            brochure.download_link.as_deref(),
            Some("https://cdn.example.com/sky-garden.pdf")
        );
        assert!(brochure.description.is_none());
    }

    #[test]
    fn test_page_without_listing_id() {
        let venue = parse_venue_page("https://www.bridely.sg/venue/sky", "<p>x</p>").unwrap();
        assert!(venue.venue_id.is_none());
        assert!(venue.name.is_none());
    }
}
