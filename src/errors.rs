use thiserror::Error;

/// Main error type for the Pokedex enrichment engine
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The evolution chain record is structurally invalid
    #[error("Evolution data error: {0}")]
    Evolution(#[from] EvolutionDataError),
    /// A required upstream record could not be retrieved
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Errors related to evolution chain records
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionDataError {
    /// A node lacks its species name or reference URL
    #[error("Malformed evolution data at {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Errors related to fetching records from the upstream data provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The provider answered with a non-success status
    #[error("Failed to fetch {resource} ({status})")]
    Status {
        resource: String,
        status: reqwest::StatusCode,
    },
    /// The request could not be sent or the body could not be read
    #[error("Request for {resource} failed: {source}")]
    Transport {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
    /// The request did not complete within the configured timeout
    #[error("Request for {resource} timed out")]
    Timeout { resource: String },
    /// The client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors related to loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A language code outside the supported set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language '{0}' (expected en or es)")]
pub struct UnknownLocaleError(pub String);

/// Type alias for Results using EnrichmentError
pub type EnrichmentResult<T> = Result<T, EnrichmentError>;

/// Type alias for Results using EvolutionDataError
pub type EvolutionDataResult<T> = Result<T, EvolutionDataError>;

/// Type alias for Results using UpstreamError
pub type UpstreamResult<T> = Result<T, UpstreamError>;
