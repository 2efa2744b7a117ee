use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, RiskError};
use crate::proximity::DEFAULT_INDEX_THRESHOLD;
use crate::safety::{CategoryTable, Classifier, RiskTier};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub analysis: AnalysisCfg,
    /// Category label -> "high" | "medium" | "low", layered over the built-in table.
    pub categories: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub bind: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisCfg {
    pub index_threshold: usize,
}

impl Default for AnalysisCfg {
    fn default() -> Self {
        Self { index_threshold: DEFAULT_INDEX_THRESHOLD }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RiskError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        let mut table = CategoryTable::default();
        for (category, tier) in &self.categories {
            let parsed = RiskTier::parse(tier).ok_or_else(|| RiskError::UnknownTier {
                category: category.clone(),
                tier: tier.clone(),
            })?;
            table.insert(category, parsed);
        }
        Ok(table)
    }

    pub fn classifier(&self) -> Result<Classifier> {
        Ok(Classifier::new(self.category_table()?).with_index_threshold(self.analysis.index_threshold))
    }
}
