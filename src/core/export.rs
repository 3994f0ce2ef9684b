//! Shared transform/load steps: required-field checks, JSON/CSV/TSV rendering
//! and writing the files (optionally zipped) through a [`Storage`].

use crate::domain::model::{
    ColumnLayout, Dataset, LoadOptions, LoadOutcome, OutputFormat, Record, TransformResult,
};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::missing_required_fields;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Flattens one record into CSV cells. Nested objects become `parent_child`
/// keys, arrays are kept as JSON text and `null` becomes an empty cell.
pub fn flatten_record(record: &Record) -> BTreeMap<String, String> {
    let mut cells = BTreeMap::new();
    for (key, value) in &record.data {
        flatten_value(key, value, &mut cells);
    }
    cells
}

fn flatten_value(key: &str, value: &Value, cells: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (child, nested) in map {
                flatten_value(&format!("{}_{}", key, child), nested, cells);
            }
        }
        Value::Null => {
            cells.insert(key.to_string(), String::new());
        }
        Value::String(s) => {
            cells.insert(key.to_string(), s.clone());
        }
        other => {
            cells.insert(key.to_string(), other.to_string());
        }
    }
}

pub fn columns(layout: &ColumnLayout, rows: &[BTreeMap<String, String>]) -> Vec<String> {
    match layout {
        ColumnLayout::Fixed(columns) => columns.clone(),
        ColumnLayout::SortedUnion => rows
            .iter()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

pub fn render_delimited(
    columns: &[String],
    rows: &[BTreeMap<String, String>],
    delimiter: u8,
) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|column| row.get(column).map(String::as_str).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Drops records missing a required field and renders the rest.
pub fn transform_records(
    dataset: &Dataset,
    records: Vec<Record>,
    formats: &[OutputFormat],
) -> Result<TransformResult> {
    let mut processed_records = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        let missing = missing_required_fields(&record, dataset.required_fields);
        if missing.is_empty() {
            processed_records.push(record);
        } else {
            skipped += 1;
            tracing::warn!(
                "⚠️ Skipping {} record without {}",
                dataset.name,
                missing.join(", ")
            );
        }
    }

    let rows: Vec<_> = processed_records.iter().map(flatten_record).collect();
    if rows.is_empty() {
        return Ok(TransformResult {
            json_output: "[]".to_string(),
            processed_records,
            csv_output: String::new(),
            tsv_output: None,
            skipped,
        });
    }

    let columns = columns(&dataset.columns, &rows);
    let csv_output = render_delimited(&columns, &rows, b',')?;
    let tsv_output = if formats.contains(&OutputFormat::Tsv) {
        Some(render_delimited(&columns, &rows, b'\t')?)
    } else {
        None
    };

    Ok(TransformResult {
        json_output: render_json(&processed_records)?,
        processed_records,
        csv_output,
        tsv_output,
        skipped,
    })
}

/// Writes the requested formats as `<stem>.<ext>`. An empty result writes
/// nothing.
pub async fn load_result<S: Storage>(
    storage: &S,
    dataset: &Dataset,
    options: &LoadOptions,
    result: &TransformResult,
) -> Result<LoadOutcome> {
    let output_path = storage.location(&dataset.stem);

    if result.processed_records.is_empty() {
        tracing::warn!("⚠️ No {} {} records to save", dataset.source, dataset.name);
        return Ok(LoadOutcome {
            output_path,
            files: Vec::new(),
        });
    }

    let mut written: Vec<(String, &str)> = Vec::new();
    for format in &options.formats {
        let content = match format {
            OutputFormat::Json => result.json_output.as_str(),
            OutputFormat::Csv => result.csv_output.as_str(),
            OutputFormat::Tsv => match &result.tsv_output {
                Some(tsv) => tsv.as_str(),
                None => continue,
            },
        };
        let path = format!("{}.{}", dataset.stem, format.extension());
        storage.write_file(&path, content.as_bytes()).await?;
        tracing::info!("💾 Saved {}", storage.location(&path));
        written.push((path, content));
    }

    let mut files: Vec<String> = written.iter().map(|(path, _)| storage.location(path)).collect();

    if options.archive {
        let archive = build_archive(dataset, result.processed_records.len(), &written)?;
        let path = format!("{}.zip", dataset.stem);
        tracing::debug!("Writing archive ({} bytes)", archive.len());
        storage.write_file(&path, &archive).await?;
        tracing::info!("🗜️ Archived to {}", storage.location(&path));
        files.push(storage.location(&path));
    }

    Ok(LoadOutcome { output_path, files })
}

fn build_archive(dataset: &Dataset, record_count: usize, files: &[(String, &str)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for (path, content) in files {
        let name = path.rsplit('/').next().unwrap_or(path);
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    let metadata = serde_json::json!({
        "source": dataset.source,
        "dataset": dataset.name,
        "record_count": record_count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    zip.start_file::<_, ()>("metadata.json", FileOptions::default())?;
    zip.write_all(serde_json::to_string_pretty(&metadata)?.as_bytes())?;

    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().await.contains_key(path)
        }

        fn location(&self, path: &str) -> String {
            format!("mem/{}", path)
        }
    }

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn dataset(columns: ColumnLayout) -> Dataset {
        Dataset {
            source: "test",
            name: "venues",
            stem: "venues".to_string(),
            required_fields: &["id", "name"],
            columns,
        }
    }

    #[test]
    fn test_flatten_nested_and_lists() {
        let cells = flatten_record(&record(json!({
            "name": "Grand Hall",
            "venue": {"minCapacity": 100, "indoorOutdoor": null},
            "price_list_pdfs": ["a.pdf", "b.pdf"],
            "has_price_list": true
        })));

        assert_eq!(cells["name"], "Grand Hall");
        assert_eq!(cells["venue_minCapacity"], "100");
        assert_eq!(cells["venue_indoorOutdoor"], "");
        assert_eq!(cells["price_list_pdfs"], r#"["a.pdf","b.pdf"]"#);
        assert_eq!(cells["has_price_list"], "true");
    }

    #[test]
    fn test_sorted_union_columns_and_quoting() {
        let rows = vec![
            flatten_record(&record(json!({"name": "A, B", "id": "1"}))),
            flatten_record(&record(json!({"id": "2", "phone": "+65"}))),
        ];
        let columns = columns(&ColumnLayout::SortedUnion, &rows);
        assert_eq!(columns, vec!["id", "name", "phone"]);

        let csv = render_delimited(&columns, &rows, b',').unwrap();
        assert_eq!(csv, "id,name,phone\n1,\"A, B\",\n2,,+65\n");
    }

    #[test]
    fn test_transform_skips_records_missing_required_fields() {
        let records = vec![
            record(json!({"id": "1", "name": "Grand Hall"})),
            record(json!({"id": "2", "name": "  "})),
            record(json!({"name": "No Id"})),
        ];

        let result = transform_records(
            &dataset(ColumnLayout::SortedUnion),
            records,
            &[OutputFormat::Json, OutputFormat::Csv],
        )
        .unwrap();

        assert_eq!(result.processed_records.len(), 1);
        assert_eq!(result.skipped, 2);
        assert!(result.tsv_output.is_none());
        assert_eq!(result.csv_output, "id,name\n1,Grand Hall\n");

        let json: Vec<Value> = serde_json::from_str(&result.json_output).unwrap();
        assert_eq!(json, vec![json!({"id": "1", "name": "Grand Hall"})]);
    }

    #[test]
    fn test_fixed_columns_keep_order() {
        let layout = ColumnLayout::Fixed(vec!["name".to_string(), "id".to_string(), "city".to_string()]);
        let result = transform_records(
            &dataset(layout),
            vec![record(json!({"id": "1", "name": "Hall", "extra": "x"}))],
            &[OutputFormat::Tsv],
        )
        .unwrap();

        assert_eq!(result.csv_output, "name,id,city\nHall,1,\n");
        assert_eq!(result.tsv_output.as_deref(), Some("name\tid\tcity\nHall\t1\t\n"));
    }

    #[tokio::test]
    async fn test_load_writes_requested_formats_and_archive() {
        let storage = MockStorage::default();
        let dataset = dataset(ColumnLayout::SortedUnion);
        let result = transform_records(
            &dataset,
            vec![record(json!({"id": "1", "name": "Hall"}))],
            &[OutputFormat::Json, OutputFormat::Tsv],
        )
        .unwrap();
        let options = LoadOptions {
            formats: vec![OutputFormat::Json, OutputFormat::Tsv],
            archive: true,
        };

        let outcome = load_result(&storage, &dataset, &options, &result).await.unwrap();

        assert_eq!(outcome.output_path, "mem/venues");
        assert_eq!(
            outcome.files,
            vec!["mem/venues.json", "mem/venues.tsv", "mem/venues.zip"]
        );
        assert!(storage.get_file("venues.csv").await.is_none());

        let archive = storage.get_file("venues.zip").await.unwrap();
        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive)).unwrap();
        let mut names: Vec<_> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["metadata.json", "venues.json", "venues.tsv"]);

        let mut metadata = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("metadata.json").unwrap(), &mut metadata)
            .unwrap();
        let metadata: Value = serde_json::from_str(&metadata).unwrap();
        assert_eq!(metadata["record_count"], json!(1));
        assert_eq!(metadata["dataset"], json!("venues"));
    }

    #[tokio::test]
    async fn test_empty_result_writes_nothing() {
        let storage = MockStorage::default();
        let dataset = dataset(ColumnLayout::SortedUnion);
        let result = transform_records(&dataset, Vec::new(), &[OutputFormat::Json]).unwrap();

        let outcome = load_result(&storage, &dataset, &LoadOptions::default(), &result)
            .await
            .unwrap();

        assert!(outcome.files.is_empty());
        assert!(storage.files.lock().await.is_empty());
    }
}
