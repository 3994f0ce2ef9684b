pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{LoadOptions, OutputFormat};
#[cfg(feature = "cli")]
use crate::utils::error::{Result, ScrapeError};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Page cap applied by `bridely --test`.
pub const TEST_MODE_LIMIT: usize = 5;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "wedding-scrape")]
#[command(about = "Scrape wedding venue and vendor listings into JSON/CSV files")]
pub struct CliConfig {
    /// Optional TOML settings file (base URLs, HTTP headers, page size)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Log CPU and memory usage after each phase
    #[arg(long, global = true)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Blissful Brides: venues, marketplace packages, banquet prices
    Bb(BbArgs),
    /// The Wedding Notebook venue listings (GraphQL)
    Twn(TwnArgs),
    /// Bridely venues and venue brochures
    Bridely(BridelyArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BbTarget {
    Venues,
    Marketplace,
    BanquetPrices,
    All,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output formats to write
    #[arg(long, value_delimiter = ',', default_value = "json,csv")]
    pub formats: Vec<OutputFormat>,

    /// Also bundle the written files into a zip archive
    #[arg(long)]
    pub archive: bool,
}

#[cfg(feature = "cli")]
impl OutputArgs {
    pub fn load_options(&self) -> LoadOptions {
        let mut formats = Vec::new();
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        LoadOptions {
            formats,
            archive: self.archive,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct BbArgs {
    /// Type of data to scrape
    #[arg(value_enum)]
    pub target: BbTarget,

    /// Max items to scrape per dataset
    #[arg(long)]
    pub limit: Option<usize>,

    /// Delay between requests (seconds)
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Output directory
    #[arg(long, default_value = "data/bb")]
    pub output: String,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct TwnArgs {
    /// Filter by state (e.g. "Selangor", "Kuala Lumpur")
    #[arg(long)]
    pub state: Option<String>,

    /// Listing category; defaults to the config file value ("venues")
    #[arg(long)]
    pub category: Option<String>,

    /// Max number of listings
    #[arg(long)]
    pub limit: Option<usize>,

    /// Delay between page requests (seconds)
    #[arg(long, default_value_t = 1.0)]
    pub delay: f64,

    /// Output file path without extension
    #[arg(long, default_value = "data/twn/venues")]
    pub output: String,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct BridelyArgs {
    /// Only scrape a handful of pages per dataset
    #[arg(long)]
    pub test: bool,

    /// Max pages per dataset; overrides --test
    #[arg(long)]
    pub limit: Option<usize>,

    /// Delay between requests (seconds)
    #[arg(long, default_value_t = 0.5)]
    pub delay: f64,

    /// Output directory
    #[arg(long, default_value = "data/bridely")]
    pub output: String,

    #[command(flatten)]
    pub output_args: OutputArgs,
}

#[cfg(feature = "cli")]
impl BridelyArgs {
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit
            .or(if self.test { Some(TEST_MODE_LIMIT) } else { None })
    }
}

#[cfg(feature = "cli")]
fn validate_common(limit: Option<usize>, delay: f64, output: &str, output_args: &OutputArgs) -> Result<()> {
    if let Some(limit) = limit {
        validation::validate_positive_number("limit", limit, 1)?;
    }
    validation::validate_delay("delay", delay)?;
    validation::validate_path("output", output)?;
    if output_args.formats.is_empty() {
        return Err(ScrapeError::MissingConfigError {
            field: "formats".to_string(),
        });
    }
    Ok(())
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }

        match &self.command {
            Command::Bb(args) => validate_common(args.limit, args.delay, &args.output, &args.output_args),
            Command::Twn(args) => {
                if let Some(state) = &args.state {
                    validation::validate_non_empty_string("state", state)?;
                }
                if let Some(category) = &args.category {
                    validation::validate_non_empty_string("category", category)?;
                }
                validate_common(args.limit, args.delay, &args.output, &args.output_args)
            }
            Command::Bridely(args) => {
                validate_common(args.limit, args.delay, &args.output, &args.output_args)
            }
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_bb_arguments() {
        let config = CliConfig::parse_from([
            "wedding-scrape",
            "bb",
            "banquet-prices",
            "--limit",
            "3",
            "--delay",
            "0",
            "--formats",
            "json,tsv",
        ]);

        let Command::Bb(args) = &config.command else {
            panic!("expected bb command");
        };
        assert_eq!(args.target, BbTarget::BanquetPrices);
        assert_eq!(args.limit, Some(3));
        assert_eq!(args.output, "data/bb");
        assert_eq!(
            args.output_args.load_options().formats,
            vec![OutputFormat::Json, OutputFormat::Tsv]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_twn_defaults() {
        let config = CliConfig::parse_from(["wedding-scrape", "twn", "--state", "Selangor"]);

        let Command::Twn(args) = &config.command else {
            panic!("expected twn command");
        };
        assert_eq!(args.state.as_deref(), Some("Selangor"));
        assert_eq!(args.output, "data/twn/venues");
        assert_eq!(args.delay, 1.0);
        assert_eq!(
            args.output_args.load_options().formats,
            vec![OutputFormat::Json, OutputFormat::Csv]
        );
    }

    #[test]
    fn test_bridely_test_mode_limit() {
        let config = CliConfig::parse_from(["wedding-scrape", "bridely", "--test"]);
        let Command::Bridely(args) = &config.command else {
            panic!("expected bridely command");
        };
        assert_eq!(args.effective_limit(), Some(TEST_MODE_LIMIT));

        let config = CliConfig::parse_from(["wedding-scrape", "bridely", "--test", "--limit", "2"]);
        let Command::Bridely(args) = &config.command else {
            panic!("expected bridely command");
        };
        assert_eq!(args.effective_limit(), Some(2));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = CliConfig::parse_from(["wedding-scrape", "twn", "--limit", "0"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["wedding-scrape", "bb", "venues", "--delay=-1"]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["wedding-scrape", "twn", "--state", "  "]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected_by_parser() {
        let result = CliConfig::try_parse_from(["wedding-scrape", "twn", "--formats", "xlsx"]);
        assert!(result.is_err());
    }
}
