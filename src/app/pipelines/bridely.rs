use crate::app::parsers::bridely::{self as parser, UrlCatalog};
use crate::core::export;
use crate::core::http::{HttpClient, Throttle};
use crate::core::sitemap;
use crate::domain::model::{
    ColumnLayout, Dataset, LoadOptions, LoadOutcome, Record, TransformResult,
};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridelyDataset {
    Venues,
    Brochures,
}

impl BridelyDataset {
    pub const ALL: [BridelyDataset; 2] = [Self::Venues, Self::Brochures];

    pub fn dataset(self) -> Dataset {
        let (name, stem) = match self {
            Self::Venues => ("venues", "bridely_venues"),
            Self::Brochures => ("venue-brochures", "bridely_venue_brochures"),
        };
        Dataset {
            source: "bridely",
            name,
            stem: stem.to_string(),
            required_fields: &["url", "type"],
            columns: ColumnLayout::SortedUnion,
        }
    }
}

pub struct BridelyPipeline<S: Storage> {
    storage: S,
    http: HttpClient,
    throttle: Throttle,
    base_url: String,
    kind: BridelyDataset,
    limit: Option<usize>,
    load_options: LoadOptions,
    dataset: Dataset,
}

impl<S: Storage> BridelyPipeline<S> {
    pub fn new(storage: S, http: HttpClient, base_url: &str, kind: BridelyDataset) -> Self {
        Self {
            storage,
            http,
            throttle: Throttle::from_secs_f64(0.5),
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

    fn parse(&self, url: &str, page: &str) -> Result<Record> {
        match self.kind {
            BridelyDataset::Venues => Record::from_item(&parser::parse_venue_page(url, page)?),
            BridelyDataset::Brochures => {
                Record::from_item(&parser::parse_brochure_page(url, page)?)
            }
        }
    }
}

#[async_trait]
impl<S: Storage> Pipeline for BridelyPipeline<S> {
    fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    async fn extract(&self) -> Result<Vec<Record>> {
        let sitemap_url = format!("{}/sitemap.xml", self.base_url);
        let urls = sitemap::fetch_sitemap_urls(&self.http, &sitemap_url).await?;
        let catalog = UrlCatalog::categorize(&self.base_url, &urls);

        let mut targets = match self.kind {
            BridelyDataset::Venues => catalog.venues,
            BridelyDataset::Brochures => catalog.venue_brochures,
        };
        if let Some(limit) = self.limit {
            targets.truncate(limit);
        }

        tracing::info!("Scraping {} {} pages...", targets.len(), self.dataset.name);
        let mut records = Vec::with_capacity(targets.len());

        for (i, url) in targets.iter().enumerate() {
            if i > 0 {
                self.throttle.pause().await;
            }
            tracing::info!("[{}/{}] {}", i + 1, targets.len(), url);

            let record = match self.http.get_text(url).await {
                Ok(page) => self.parse(url, &page),
                Err(e) => Err(e),
            };
            match record {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("⚠️ Error scraping {}: {}", url, e),
            }
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
