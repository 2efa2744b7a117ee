use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    /// Upstream zone store handed us a zone the engine cannot reason about.
    #[error("invalid zone data for '{zone_id}': {reason}")]
    InvalidZoneData { zone_id: String, reason: String },
    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("unknown risk tier '{tier}' for category '{category}'")]
    UnknownTier { category: String, tier: String },
}

pub type Result<T> = std::result::Result<T, RiskError>;
