use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        let dataset = self.pipeline.dataset();
        tracing::info!("🚀 Starting {} {} scrape", dataset.source, dataset.name);
        self.monitor.log_stats("Start");

        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} records", raw_data.len());
        self.monitor.log_stats("Extract");

        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "🔄 Transformed {} records ({} skipped)",
            transformed.processed_records.len(),
            transformed.skipped
        );
        self.monitor.log_stats("Transform");

        let records = transformed.processed_records.clone();
        let skipped = transformed.skipped;
        let outcome = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunReport {
            source: dataset.source,
            dataset: dataset.name,
            output_path: outcome.output_path,
            files: outcome.files,
            records,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ColumnLayout, Dataset, LoadOutcome, Record, TransformResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticPipeline {
        dataset: Dataset,
        records: Vec<Record>,
    }

    #[async_trait]
    impl Pipeline for StaticPipeline {
        fn dataset(&self) -> &Dataset {
            &self.dataset
        }

        async fn extract(&self) -> Result<Vec<Record>> {
            Ok(self.records.clone())
        }

        async fn transform(&self, data: Vec<Record>) -> Result<TransformResult> {
            crate::core::export::transform_records(&self.dataset, data, &[])
        }

        async fn load(&self, result: TransformResult) -> Result<LoadOutcome> {
            Ok(LoadOutcome {
                output_path: format!("out/{}", self.dataset.stem),
                files: vec![format!("out/{}.json", self.dataset.stem); result.processed_records.len().min(1)],
            })
        }
    }

    #[tokio::test]
    async fn test_run_reports_records_and_skips() {
        let pipeline = StaticPipeline {
            dataset: Dataset {
                source: "test",
                name: "venues",
                stem: "venues".to_string(),
                required_fields: &["name"],
                columns: ColumnLayout::SortedUnion,
            },
            records: vec![
                serde_json::from_value(json!({"name": "Grand Hall"})).unwrap(),
                serde_json::from_value(json!({"name": null})).unwrap(),
            ],
        };

        let report = EtlEngine::new(pipeline).run().await.unwrap();

        assert_eq!(report.source, "test");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.output_path, "out/venues");
        assert_eq!(report.files, vec!["out/venues.json"]);
    }
}
