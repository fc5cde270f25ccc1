use anyhow::{Context, Result};
use extract::MatchStrictness;
use graph::{ArtifactNaming, DEFAULT_GRAPH_FILENAME};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub parser: ParserConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    pub url: String,
    pub model: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub graph_filename: String,
    pub naming: ArtifactNaming,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub entity_match: MatchStrictness,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:3000".to_string(),
                max_upload_bytes: 32 * 1024 * 1024,
            },
            parser: ParserConfig {
                url: "http://localhost:8080".to_string(),
                model: Some("en_core_web_sm".to_string()),
                timeout_secs: 60,
            },
            fetch: FetchConfig {
                timeout_secs: 30,
                user_agent: "kgraph/0.1".to_string(),
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("uploads"),
                static_dir: PathBuf::from("static"),
                graph_filename: DEFAULT_GRAPH_FILENAME.to_string(),
                naming: ArtifactNaming::Fixed,
            },
            extraction: ExtractionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file named by `KG_CONFIG`, then individual
    /// `KG_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("KG_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(addr) = var("KG_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(url) = var("KG_PARSER_URL") {
            self.parser.url = url;
        }
        if let Some(model) = var("KG_PARSER_MODEL") {
            self.parser.model = Some(model).filter(|m| !m.is_empty());
        }
        if let Some(dir) = var("KG_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("KG_STATIC_DIR") {
            self.storage.static_dir = PathBuf::from(dir);
        }
        if let Some(flag) = var("KG_UNIQUE_ARTIFACTS") {
            self.storage.naming = if parse_flag(&flag)? {
                ArtifactNaming::PerRequest
            } else {
                ArtifactNaming::Fixed
            };
        }
        if let Some(mode) = var("KG_ENTITY_MATCH") {
            self.extraction.entity_match = match mode.as_str() {
                "substring" => MatchStrictness::Substring,
                "word_boundary" => MatchStrictness::WordBoundary,
                other => anyhow::bail!("KG_ENTITY_MATCH must be substring or word_boundary, got {:?}", other),
            };
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected a boolean flag, got {:?}", other),
    }
}
