//! Blissful Brides page parsers: venue detail pages, marketplace packages,
//! the banquet price table and per-venue price list pages.

use crate::core::html::{self, element_text, non_empty, selector};
use crate::domain::listings::{BanquetVendor, BbVenue, MarketplacePackage};
use crate::utils::error::{Result, ScrapeError};
use regex::Regex;
use scraper::Html;

pub const VENUE_PATH_MARKER: &str = "/detail/";
pub const MARKETPLACE_PATH_MARKER: &str = "/wedding-market-place/";
const TITLE_SUFFIX: &str = " - Blissful Brides Singapore";

const ADDRESS_LABEL_TAGS: [&str; 5] = ["dt", "label", "th", "strong", "b"];
const ADDRESS_VALUE_TAGS: [&str; 4] = ["dd", "td", "div", "p"];
const MAX_ADDRESS_CHARS: usize = 500;
const MAX_CAPACITY_CHARS: usize = 200;

/// The `(id, slug)` path segments following `marker`, e.g.
/// `/detail/123/grand-hall/` gives `("123", "grand-hall")`.
pub fn split_listing_path(url: &str, marker: &str) -> Option<(String, String)> {
    let (_, rest) = url.split_once(marker)?;
    let mut segments = rest.split('/');
    let id = segments.next().filter(|s| !s.is_empty())?;
    let slug = segments.next().filter(|s| !s.is_empty())?;
    Some((id.to_string(), slug.to_string()))
}

/// Parses a venue detail page. Price list fields are left unset; the pipeline
/// fills them after visiting the venue's price list page.
pub fn parse_venue_page(url: &str, page: &str) -> Result<BbVenue> {
    let (id, slug) =
        split_listing_path(url, VENUE_PATH_MARKER).ok_or_else(|| ScrapeError::ParseError {
            url: url.to_string(),
            message: "URL has no /detail/<id>/<slug> segments".to_string(),
        })?;

    let document = Html::parse_document(page);
    let mut venue = BbVenue {
        id,
        slug,
        url: url.to_string(),
        ..Default::default()
    };

    let title = match html::first_text(&document, "h1")? {
        Some(text) => Some(text),
        None => html::first_text(&document, "title")?,
    };
    venue.name = title
        .map(|t| t.replace(TITLE_SUFFIX, ""))
        .and_then(|t| non_empty(&t));

    venue.description = html::meta_content(&document, r#"meta[name="description"]"#)?;
    venue.image_url = html::meta_content(&document, r#"meta[property="og:image"]"#)?;

    let crumb_links = selector("ol.breadcrumb a")?;
    venue.category = document
        .select(&crumb_links)
        .nth(1)
        .map(element_text)
        .and_then(|t| non_empty(&t));

    // the last contact link on the page wins
    for href in html::hrefs(&document)? {
        if href.contains("tel:") {
            venue.phone = non_empty(&href.replace("tel:", ""));
        } else if href.contains("mailto:") {
            venue.email = non_empty(&href.replace("mailto:", ""));
        }
    }

    venue.address = find_address(&document)?;
    venue.website = find_website(&document)?;
    venue.capacity = find_capacity(&document)?;

    Ok(venue)
}

fn find_address(document: &Html) -> Result<Option<String>> {
    let label = Regex::new(r"(?i)address").map_err(regex_error)?;

    for (parent, text) in html::text_nodes(document) {
        if !label.is_match(text) || !ADDRESS_LABEL_TAGS.contains(&parent.value().name()) {
            continue;
        }
        let Some(sibling) = html::next_element_sibling(parent) else {
            continue;
        };
        if !ADDRESS_VALUE_TAGS.contains(&sibling.value().name()) {
            continue;
        }
        let value = element_text(sibling);
        if !value.is_empty()
            && value.chars().count() < MAX_ADDRESS_CHARS
            && value.to_lowercase().contains("singapore")
        {
            return Ok(Some(value));
        }
    }

    Ok(None)
}

fn find_website(document: &Html) -> Result<Option<String>> {
    let links = selector("a[href]")?;
    Ok(document
        .select(&links)
        .find(|a| element_text(*a).eq_ignore_ascii_case("website"))
        .and_then(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("http"))
        .map(str::to_string))
}

fn find_capacity(document: &Html) -> Result<Option<String>> {
    let mention = Regex::new(r"(?i)capacity|pax|guests|seating").map_err(regex_error)?;

    Ok(html::text_nodes(document)
        .into_iter()
        .map(|(_, text)| text.trim())
        .filter(|text| mention.is_match(text))
        .find(|text| {
            !text.is_empty()
                && text.chars().count() < MAX_CAPACITY_CHARS
                && text.chars().any(|c| c.is_ascii_digit())
        })
        .map(str::to_string))
}

/// PDF links on a venue's public price list page, as written in the markup.
pub fn parse_price_list_links(page: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(page);
    let links = selector("a[href]")?;

    Ok(document
        .select(&links)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && *href != "#" && href.ends_with(".pdf"))
        .map(str::to_string)
        .collect())
}

pub fn parse_marketplace_page(url: &str, page: &str) -> Result<MarketplacePackage> {
    let (id, slug) = split_listing_path(url, MARKETPLACE_PATH_MARKER).ok_or_else(|| {
        ScrapeError::ParseError {
            url: url.to_string(),
            message: "URL has no /wedding-market-place/<id>/<slug> segments".to_string(),
        }
    })?;

    let document = Html::parse_document(page);
    Ok(MarketplacePackage {
        id,
        slug,
        url: url.to_string(),
        title: html::first_text(&document, "h1")?.and_then(|t| non_empty(&t)),
        description: html::meta_content(&document, r#"meta[name="description"]"#)?,
    })
}

/// Rows of the banquet price table. Rows with fewer than four cells or
/// without a vendor name are dropped.
pub fn parse_banquet_table(base_url: &str, page: &str) -> Result<Vec<BanquetVendor>> {
    let document = Html::parse_document(page);

    let table = match document.select(&selector("table.table")?).next() {
        Some(table) => Some(table),
        None => document.select(&selector("table")?).next(),
    };
    let Some(table) = table else {
        tracing::warn!("⚠️ No table found on banquet price list page");
        return Ok(Vec::new());
    };

    let rows = selector("tr")?;
    let cells = selector("td")?;
    let strong = selector("strong")?;
    let paragraphs = selector("p[style]")?;
    let links = selector("a[href]")?;
    let rating = selector("input#merchant_score")?;
    let tables_pattern = Regex::new(r"(\d+)\s*-\s*(\d+)").map_err(regex_error)?;

    let mut vendors = Vec::new();
    for row in table.select(&rows) {
        let tds: Vec<_> = row.select(&cells).collect();
        if tds.len() < 4 {
            continue;
        }

        let info = tds[0];
        let name = match info.select(&strong).next() {
            Some(el) => Some(element_text(el)),
            None => info
                .select(&paragraphs)
                .find(|p| {
                    p.value()
                        .attr("style")
                        .is_some_and(|style| style.contains("font-size: 18px"))
                })
                .map(element_text),
        };
        let Some(name) = name.and_then(|n| non_empty(&n)) else {
            continue;
        };

        let mut vendor = BanquetVendor {
            name,
            ..Default::default()
        };

        vendor.profile_url = info
            .select(&links)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.contains(VENUE_PATH_MARKER))
            .map(|href| html::absolutize(base_url, href));

        vendor.rating = info
            .select(&rating)
            .next()
            .and_then(|input| input.value().attr("value"))
            .and_then(non_empty);

        vendor.lunch_price = Some(element_text(tds[1]));
        vendor.dinner_price = Some(element_text(tds[2]));

        let tables_text = element_text(tds[3]);
        if let Some(caps) = tables_pattern.captures(&tables_text) {
            vendor.tables_min = Some(caps[1].to_string());
            vendor.tables_max = Some(caps[2].to_string());
        }
        vendor.tables_range = Some(tables_text);

        if let Some(pricelist) = tds.get(4) {
            let urls: Vec<String> = pricelist
                .select(&links)
                .filter_map(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty() && *href != "#")
                .map(|href| html::absolutize(base_url, href))
                .collect();
            if !urls.is_empty() {
                vendor.price_lists = Some(urls);
            }
        }

        vendors.push(vendor);
    }

    tracing::info!("Found {} vendors", vendors.len());
    Ok(vendors)
}

fn regex_error(e: regex::Error) -> ScrapeError {
    ScrapeError::ValidationError {
        message: format!("invalid pattern: {}", e),
    }
}
