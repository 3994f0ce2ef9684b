//! Sitemap XML parsing and URL selection.

use crate::core::http::HttpClient;
use crate::utils::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sitemap {
    /// Page locations from `<urlset>`.
    pub urls: Vec<String>,
    /// Child sitemap locations from `<sitemapindex>`.
    pub sitemaps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry {
    Url,
    Sitemap,
}

/// Only a `<loc>` directly under `<url>` or `<sitemap>` counts; extension
/// elements such as `<image:loc>` sit deeper and are ignored.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap> {
    let mut sitemap = Sitemap::default();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut entry: Option<(Entry, usize)> = None;
    let mut in_loc = false;
    let mut loc = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                match (e.local_name().as_ref(), entry) {
                    (b"url", None) => {
                        entry = Some((Entry::Url, depth));
                        loc.clear();
                    }
                    (b"sitemap", None) => {
                        entry = Some((Entry::Sitemap, depth));
                        loc.clear();
                    }
                    (b"loc", Some((_, entry_depth))) if depth == entry_depth + 1 => in_loc = true,
                    _ => {}
                }
            }
            Event::End(_) => {
                in_loc = false;
                if let Some((kind, entry_depth)) = entry {
                    if depth == entry_depth {
                        if !loc.is_empty() {
                            match kind {
                                Entry::Url => sitemap.urls.push(loc.clone()),
                                Entry::Sitemap => sitemap.sitemaps.push(loc.clone()),
                            }
                        }
                        entry = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if in_loc => {
                loc = e.unescape().unwrap_or_default().trim().to_string();
            }
            Event::CData(e) if in_loc => {
                loc = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sitemap)
}

/// URLs containing `pattern`, first occurrence kept.
pub fn filter_urls(urls: &[String], pattern: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|url| url.contains(pattern))
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}

/// Fetches a sitemap and, for a sitemap index, the sitemaps it lists (one level).
/// A failing child sitemap is logged and skipped.
pub async fn fetch_sitemap_urls(http: &HttpClient, sitemap_url: &str) -> Result<Vec<String>> {
    tracing::info!("🗺️ Fetching sitemap {}", sitemap_url);
    let xml = http.get_text(sitemap_url).await?;
    let root = parse_sitemap(&xml)?;

    let mut urls = root.urls;
    for child in &root.sitemaps {
        let child_urls = match http.get_text(child).await {
            Ok(xml) => parse_sitemap(&xml).map(|s| s.urls),
            Err(e) => Err(e),
        };
        match child_urls {
            Ok(child_urls) => urls.extend(child_urls),
            Err(e) => tracing::warn!("⚠️ Skipping child sitemap {}: {}", child, e),
        }
    }

    tracing::info!("Found {} URLs in sitemap", urls.len());
    Ok(urls)
}
