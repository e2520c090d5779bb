use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tillslip_core::{parse_timezone, CategoryConfig, KeywordRule};
use tillslip_ingest::{DateOrder, ExtractionConfig};

use crate::llm::Provider;
use crate::state::ensure_tillslip_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub categories: CategoriesSection,
    pub extraction: ExtractionSection,
    pub ai: AiSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriesSection {
    /// "basic" or "extended"; ignored when `categories` is set
    pub preset: String,
    /// Custom category set (must include "Other")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Ordered keyword table for a custom set
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<KeywordRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    pub date_order: DateOrder,
    /// IANA zone deciding "today" for receipts without a printed date
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSection {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CategoriesSection {
    fn default() -> Self {
        Self {
            preset: "basic".to_string(),
            categories: None,
            rules: Vec::new(),
        }
    }
}

impl Default for ExtractionSection {
    fn default() -> Self {
        Self {
            date_order: DateOrder::MonthFirst,
            timezone: "UTC".to_string(),
            total_keywords: None,
        }
    }
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
        }
    }
}

impl Config {
    pub fn category_config(&self) -> Result<CategoryConfig> {
        let section = &self.categories;
        let cfg = match &section.categories {
            Some(categories) => CategoryConfig::new(categories.clone(), section.rules.clone())
                .context("custom [categories]")?,
            None => CategoryConfig::preset(&section.preset)
                .with_context(|| format!("categories preset {:?}", section.preset))?,
        };
        Ok(cfg)
    }

    pub fn extraction_config(&self) -> ExtractionConfig {
        let mut cfg = ExtractionConfig {
            date_order: self.extraction.date_order,
            ..ExtractionConfig::default()
        };
        if let Some(keywords) = &self.extraction.total_keywords {
            cfg.total_keywords = keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();
        }
        cfg
    }

    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.extraction.timezone).context("[extraction] timezone")?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tillslip_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
