use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sitemap XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("GraphQL error: {message}")]
    GraphQlError { message: String },

    #[error("Invalid CSS selector '{selector}': {message}")]
    SelectorError { selector: String, message: String },

    #[error("Failed to parse {url}: {message}")]
    ParseError { url: String, message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parsing,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScrapeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) | Self::GraphQlError { .. } => ErrorCategory::Network,
            Self::XmlError(_)
            | Self::SelectorError { .. }
            | Self::ParseError { .. }
            | Self::SerializationError(_) => ErrorCategory::Parsing,
            Self::IoError(_) | Self::CsvError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ValidationError { .. } => ErrorCategory::Data,
        }
    }

    /// Network errors are Medium, parsing and data High, config and storage Critical.
    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parsing | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check your network connection and that the site is reachable, then rerun",
            Self::GraphQlError { .. } => "The listings API rejected the query; check --category and --state values",
            Self::XmlError(_) => "The sitemap could not be read; the site layout may have changed",
            Self::SelectorError { .. } | Self::ParseError { .. } => {
                "The page markup may have changed; rerun with --verbose to see which page failed"
            }
            Self::SerializationError(_) => "The response shape was unexpected; rerun with --verbose",
            Self::IoError(_) | Self::CsvError(_) | Self::ZipError(_) => {
                "Check that the output directory is writable and the disk is not full"
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the flagged option or config file entry and try again",
            Self::ValidationError { .. } => "Inspect the scraped records; required fields were missing",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch data: {}", self),
            ErrorCategory::Parsing => format!("Could not understand the response: {}", self),
            ErrorCategory::Storage => format!("Could not write output: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Scraped data was rejected: {}", self),
        }
    }

    /// Process exit code for this error, 0 meaning the run may still count as a success.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
