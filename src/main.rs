use clap::Parser;
use wedding_scrape::config::toml_config::ScrapeConfig;
use wedding_scrape::config::{BbArgs, BbTarget, BridelyArgs, Command, TwnArgs};
use wedding_scrape::core::http::{HttpClient, Throttle};
use wedding_scrape::core::summary::count_by;
use wedding_scrape::domain::model::RunReport;
use wedding_scrape::domain::ports::Pipeline;
use wedding_scrape::utils::error::ScrapeError;
use wedding_scrape::utils::{logger, validation::Validate};
use wedding_scrape::{
    BbDataset, BbPipeline, BridelyDataset, BridelyPipeline, CliConfig, EtlEngine, LocalStorage,
    Result, TwnPipeline,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting wedding-scrape");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let settings = match load_settings(config.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };
    let http = match HttpClient::new(&settings.http) {
        Ok(http) => http,
        Err(e) => fail(e),
    };

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match &config.command {
        Command::Bb(args) => run_bb(args, &settings, &http, config.monitor).await,
        Command::Twn(args) => run_twn(args, &settings, &http, config.monitor).await,
        Command::Bridely(args) => run_bridely(args, &settings, &http, config.monitor).await,
    };

    if let Err(e) = result {
        fail(e);
    }
}

fn load_settings(path: Option<&str>) -> Result<ScrapeConfig> {
    let settings = ScrapeConfig::load(path)?;
    settings.validate()?;
    Ok(settings)
}

fn fail(e: ScrapeError) -> ! {
    tracing::error!(
        "❌ Scrape failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}

async fn run_pipeline<P: Pipeline>(pipeline: P, monitor: bool) -> Result<RunReport> {
    let report = EtlEngine::new_with_monitoring(pipeline, monitor).run().await?;

    println!(
        "\n✅ Scraped {} {} {} records",
        report.records.len(),
        report.source,
        report.dataset
    );
    if report.skipped > 0 {
        println!("⚠️ Skipped {} incomplete records", report.skipped);
    }
    if !report.files.is_empty() {
        println!("Output: {}", report.output_path);
    }
    for file in &report.files {
        println!("📁 {}", file);
    }
    Ok(report)
}

async fn run_bb(args: &BbArgs, settings: &ScrapeConfig, http: &HttpClient, monitor: bool) -> Result<()> {
    let datasets = match args.target {
        BbTarget::Venues => vec![BbDataset::Venues],
        BbTarget::Marketplace => vec![BbDataset::Marketplace],
        BbTarget::BanquetPrices => vec![BbDataset::BanquetPrices],
        BbTarget::All => BbDataset::ALL.to_vec(),
    };
    let storage = LocalStorage::new(&args.output);

    // Later datasets still run after a failure; the first error decides the exit code.
    let mut first_error = None;
    for kind in datasets {
        let pipeline = BbPipeline::new(storage.clone(), http.clone(), &settings.bb.base_url, kind)
            .with_limit(args.limit)
            .with_throttle(Throttle::from_secs_f64(args.delay))
            .with_load_options(args.output_args.load_options());

        match run_pipeline(pipeline, monitor).await {
            Ok(report) => print_bb_summary(kind, &report),
            Err(e) => {
                tracing::error!("❌ bb {} failed: {}", kind.dataset().name, e);
                first_error.get_or_insert(e);
            }
        }
    }

    first_error.map_or(Ok(()), Err)
}

fn print_bb_summary(kind: BbDataset, report: &RunReport) {
    match kind {
        BbDataset::Venues => {
            println!("\nVenues by category:");
            for (category, count) in count_by(&report.records, "category").into_iter().take(10) {
                println!("  {}: {}", category, count);
            }
        }
        BbDataset::Marketplace => {
            println!("\nTotal packages: {}", report.records.len());
        }
        BbDataset::BanquetPrices => {
            println!("\nFirst vendors:");
            for record in report.records.iter().take(5) {
                println!(
                    "  {}: lunch {}, dinner {}",
                    record.get_str("name").unwrap_or("?"),
                    record.get_str("lunch_price").unwrap_or("-"),
                    record.get_str("dinner_price").unwrap_or("-")
                );
            }
        }
    }
}

async fn run_twn(args: &TwnArgs, settings: &ScrapeConfig, http: &HttpClient, monitor: bool) -> Result<()> {
    let (storage, stem) = LocalStorage::for_stem(&args.output);
    let pipeline = TwnPipeline::new(storage, http.clone(), &settings.twn, stem)
        .with_category(args.category.clone())
        .with_state(args.state.clone())
        .with_limit(args.limit)
        .with_throttle(Throttle::from_secs_f64(args.delay))
        .with_load_options(args.output_args.load_options());

    let report = run_pipeline(pipeline, monitor).await?;

    if !report.records.is_empty() {
        println!("\nBy state:");
        for (state, count) in count_by(&report.records, "state") {
            println!("  {}: {}", state, count);
        }
    }
    Ok(())
}

async fn run_bridely(
    args: &BridelyArgs,
    settings: &ScrapeConfig,
    http: &HttpClient,
    monitor: bool,
) -> Result<()> {
    let storage = LocalStorage::new(&args.output);
    let limit = args.effective_limit();
    if let Some(limit) = limit {
        tracing::info!("Limiting each dataset to {} pages", limit);
    }

    let mut counts = Vec::new();
    for kind in BridelyDataset::ALL {
        let pipeline =
            BridelyPipeline::new(storage.clone(), http.clone(), &settings.bridely.base_url, kind)
                .with_limit(limit)
                .with_throttle(Throttle::from_secs_f64(args.delay))
                .with_load_options(args.output_args.load_options());

        let report = run_pipeline(pipeline, monitor).await?;
        counts.push((report.dataset, report.records.len()));
    }

    println!("\nSummary:");
    for (dataset, count) in counts {
        println!("  {}: {}", dataset, count);
    }
    Ok(())
}
