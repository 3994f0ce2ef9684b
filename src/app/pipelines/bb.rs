use crate::app::parsers::bb::{self as parser, MARKETPLACE_PATH_MARKER, VENUE_PATH_MARKER};
use crate::core::export;
use crate::core::http::{HttpClient, Throttle};
use crate::core::sitemap;
use crate::domain::model::{
    ColumnLayout, Dataset, LoadOptions, LoadOutcome, Record, TransformResult,
};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{Result, ScrapeError};
use async_trait::async_trait;
use url::Url;

const LISTING_FIELDS: &[&str] = &["id", "slug", "url"];
const BANQUET_FIELDS: &[&str] = &["name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BbDataset {
    Venues,
    Marketplace,
    BanquetPrices,
}

impl BbDataset {
    pub const ALL: [BbDataset; 3] = [Self::Venues, Self::Marketplace, Self::BanquetPrices];

    pub fn dataset(self) -> Dataset {
        let (name, stem, required_fields) = match self {
            Self::Venues => ("venues", "venues", LISTING_FIELDS),
            Self::Marketplace => ("marketplace", "marketplace", LISTING_FIELDS),
            Self::BanquetPrices => ("banquet-prices", "banquet_prices", BANQUET_FIELDS),
        };
        Dataset {
            source: "bb",
            name,
            stem: stem.to_string(),
            required_fields,
            columns: ColumnLayout::SortedUnion,
        }
    }
}

/// Blissful Brides scraper for one dataset. The storage root is the output
/// directory; price list PDFs land under `price-lists/<id>-<slug>/`.
pub struct BbPipeline<S: Storage> {
    storage: S,
    http: HttpClient,
    throttle: Throttle,
    base_url: String,
    kind: BbDataset,
    limit: Option<usize>,
    load_options: LoadOptions,
    dataset: Dataset,
}

impl<S: Storage> BbPipeline<S> {
    pub fn new(storage: S, http: HttpClient, base_url: &str, kind: BbDataset) -> Self {
        Self {
            storage,
            http,
            throttle: Throttle::from_secs_f64(1.0),
            base_url: base_url.trim_end_matches('/').to_string(),
            kind,
            limit: None,
            load_options: LoadOptions::default(),
            dataset: kind.dataset(),
        }
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

    async fn listing_urls(&self, marker: &str) -> Result<Vec<String>> {
        let sitemap_url = format!("{}/sitemap.xml", self.base_url);
        let all_urls = sitemap::fetch_sitemap_urls(&self.http, &sitemap_url).await?;

        let mut urls = sitemap::filter_urls(&all_urls, marker);
        tracing::info!("Found {} URLs matching '{}'", urls.len(), marker);

        if let Some(limit) = self.limit {
            urls.truncate(limit);
        }
        Ok(urls)
    }

    async fn scrape_venues(&self) -> Result<Vec<Record>> {
        let urls = self.listing_urls(VENUE_PATH_MARKER).await?;
        let mut records = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                self.throttle.pause().await;
            }
            tracing::info!("🏛️ [{}/{}] {}", i + 1, urls.len(), url);

            match self.scrape_venue(url).await {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("⚠️ Error scraping {}: {}", url, e),
            }
        }

        Ok(records)
    }

    async fn scrape_venue(&self, url: &str) -> Result<Record> {
        let page = self.http.get_text(url).await?;
        let mut venue = parser::parse_venue_page(url, &page)?;

        let price_list_url = format!(
            "{}/public/banquet/{}/wedding-banquet-price-list/",
            self.base_url, venue.slug
        );
        let folder = format!("price-lists/{}-{}", venue.id, venue.slug);

        match self.download_price_lists(&price_list_url, &folder).await {
            Ok(Some(pdfs)) => venue.set_price_lists(pdfs),
            Ok(None) => venue.clear_price_lists(),
            Err(e) => {
                tracing::debug!("No price list for {}: {}", venue.slug, e);
                venue.clear_price_lists();
            }
        }

        Record::from_item(&venue)
    }

    /// Downloads every PDF linked from the price list page into `folder`.
    /// Returns `None` when the page links no PDFs, otherwise the URLs that
    /// were saved (or already on disk).
    async fn download_price_lists(
        &self,
        price_list_url: &str,
        folder: &str,
    ) -> Result<Option<Vec<String>>> {
        let page = self.http.get_text(price_list_url).await?;
        let links = parser::parse_price_list_links(&page)?;
        if links.is_empty() {
            return Ok(None);
        }

        let page_url = Url::parse(price_list_url).map_err(|e| ScrapeError::ParseError {
            url: price_list_url.to_string(),
            message: e.to_string(),
        })?;

        let mut saved = Vec::new();
        for href in &links {
            let Some(file_name) = href.rsplit('/').next().filter(|name| !name.is_empty()) else {
                continue;
            };
            let pdf_url = match page_url.join(href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    tracing::warn!("⚠️ Bad PDF link {}: {}", href, e);
                    continue;
                }
            };
            let path = format!("{}/{}", folder, file_name);

            if self.storage.exists(&path).await {
                tracing::info!("⏭️ Skipping {} (already exists)", file_name);
                saved.push(pdf_url);
                continue;
            }

            tracing::info!("📄 Downloading {} to {}/", file_name, folder);
            match self.download_pdf(&pdf_url, &path).await {
                Ok(()) => saved.push(pdf_url),
                Err(e) => tracing::warn!("⚠️ Error downloading PDF {}: {}", pdf_url, e),
            }
        }

        Ok(Some(saved))
    }

    async fn download_pdf(&self, url: &str, path: &str) -> Result<()> {
        let bytes = self.http.get_bytes(url).await?;
        self.storage.write_file(path, &bytes).await
    }

    async fn scrape_marketplace(&self) -> Result<Vec<Record>> {
        let urls = self.listing_urls(MARKETPLACE_PATH_MARKER).await?;
        let mut records = Vec::with_capacity(urls.len());

        for (i, url) in urls.iter().enumerate() {
            if i > 0 {
                self.throttle.pause().await;
            }
            tracing::info!("🛍️ [{}/{}] {}", i + 1, urls.len(), url);

            let package = match self.http.get_text(url).await {
                Ok(page) => parser::parse_marketplace_page(url, &page),
                Err(e) => Err(e),
            };
            match package {
                Ok(package) => records.push(Record::from_item(&package)?),
                Err(e) => tracing::warn!("⚠️ Error scraping {}: {}", url, e),
            }
        }

        Ok(records)
    }

    async fn scrape_banquet_prices(&self) -> Result<Vec<Record>> {
        let url = format!("{}/wedding-banquet-price-list", self.base_url);
        tracing::info!("💰 Fetching banquet price list {}", url);

        let page = self.http.get_text(&url).await?;
        let mut vendors = parser::parse_banquet_table(&self.base_url, &page)?;
        if let Some(limit) = self.limit {
            vendors.truncate(limit);
        }

        vendors.iter().map(Record::from_item).collect()
    }
}

#[async_trait]
impl<S: Storage> Pipeline for BbPipeline<S> {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    async fn extract(&self) -> Result<Vec<Record>> {
        match self.kind {
            BbDataset::Venues => self.scrape_venues().await,
            BbDataset::Marketplace => self.scrape_marketplace().await,
            BbDataset::BanquetPrices => self.scrape_banquet_prices().await,
        }
    }

    async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
        export::transform_records(&self.dataset, data, &self.load_options.formats)
    }

    async fn load(&self, result: TransformResult) -> Result<LoadOutcome> {
        export::load_result(&self.storage, &self.dataset, &self.load_options, &result).await
    }
}
