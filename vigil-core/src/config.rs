// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing;

#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub briefing: BriefingConfig,
    #[serde(default)]
    pub logbook: LogbookConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

impl CoreConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("config.toml");
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            toml::from_str::<CoreConfig>(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using CoreConfig::default().",
                path.display()
            );
            CoreConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    fn resolve_paths(&mut self, root: &Path) {
        self.feeds.dir = absolutize(root, &self.feeds.dir);
        self.feeds.market_file = absolutize(root, &self.feeds.market_file);
        self.feeds.ideas_file = absolutize(root, &self.feeds.ideas_file);
        self.feeds.project_file = absolutize(root, &self.feeds.project_file);
        self.registry.path = absolutize(root, &self.registry.path);
        self.pipeline.cursor_path = absolutize(root, &self.pipeline.cursor_path);
        self.pipeline.artifact_path = absolutize(root, &self.pipeline.artifact_path);
        self.logbook.actions = absolutize(root, &self.logbook.actions);
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            feeds: FeedsConfig::default(),
            registry: RegistryConfig::default(),
            pipeline: PipelineConfig::default(),
            reasoner: ReasonerConfig::default(),
            briefing: BriefingConfig::default(),
            logbook: LogbookConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "SystemConfig::default_name")]
    pub name: String,
    #[serde(default = "SystemConfig::default_version")]
    pub version: String,
}

impl SystemConfig {
    fn default_name() -> String {
        "vigil".to_string()
    }

    fn default_version() -> String {
        "0.1.0".to_string()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "FeedsConfig::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "FeedsConfig::default_market_file")]
    pub market_file: PathBuf,
    #[serde(default = "FeedsConfig::default_ideas_file")]
    pub ideas_file: PathBuf,
    #[serde(default = "FeedsConfig::default_project_file")]
    pub project_file: PathBuf,
}

impl FeedsConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from("feeds")
    }

    fn default_market_file() -> PathBuf {
        PathBuf::from("feeds/market-intel/signals.jsonl")
    }

    fn default_ideas_file() -> PathBuf {
        PathBuf::from("feeds/agent-ideas/ideas.jsonl")
    }

    fn default_project_file() -> PathBuf {
        PathBuf::from("feeds/project-intel/signals.jsonl")
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            market_file: Self::default_market_file(),
            ideas_file: Self::default_ideas_file(),
            project_file: Self::default_project_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "RegistryConfig::default_path")]
    pub path: PathBuf,
}

impl RegistryConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("registry/problems.yaml")
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "PipelineConfig::default_cursor_path")]
    pub cursor_path: PathBuf,
    #[serde(default = "PipelineConfig::default_artifact_path")]
    pub artifact_path: PathBuf,
    /// How far back the reader looks before the cursor narrows the slice.
    #[serde(default = "PipelineConfig::default_window_days")]
    pub window_days: i64,
    #[serde(default = "PipelineConfig::default_max_records")]
    pub max_records: usize,
    /// First-run cursor default: now minus this many hours.
    #[serde(default = "PipelineConfig::default_grace_hours")]
    pub grace_hours: i64,
}

impl PipelineConfig {
    fn default_cursor_path() -> PathBuf {
        PathBuf::from("state/last-run")
    }

    fn default_artifact_path() -> PathBuf {
        PathBuf::from("out/pending-proposals.md")
    }

    fn default_window_days() -> i64 {
        7
    }

    fn default_max_records() -> usize {
        200
    }

    fn default_grace_hours() -> i64 {
        25
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cursor_path: Self::default_cursor_path(),
            artifact_path: Self::default_artifact_path(),
            window_days: Self::default_window_days(),
            max_records: Self::default_max_records(),
            grace_hours: Self::default_grace_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReasonerConfig {
    #[serde(default = "ReasonerConfig::default_api_url")]
    pub api_url: String,
    #[serde(default = "ReasonerConfig::default_model")]
    pub model: String,
    #[serde(default = "ReasonerConfig::default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "ReasonerConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key. Absent key
    /// degrades every call to "no result"; it never fails the run.
    #[serde(default = "ReasonerConfig::default_api_key_env")]
    pub api_key_env: String,
}

impl ReasonerConfig {
    fn default_api_url() -> String {
        "https://api.anthropic.com/v1/messages".to_string()
    }

    fn default_model() -> String {
        "claude-haiku-4-5-20251001".to_string()
    }

    fn default_max_tokens() -> u32 {
        600
    }

    fn default_timeout_secs() -> u64 {
        20
    }

    fn default_api_key_env() -> String {
        "ANTHROPIC_API_KEY".to_string()
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            model: Self::default_model(),
            max_tokens: Self::default_max_tokens(),
            timeout_secs: Self::default_timeout_secs(),
            api_key_env: Self::default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BriefingConfig {
    #[serde(default = "BriefingConfig::default_market_days")]
    pub market_days: i64,
    #[serde(default = "BriefingConfig::default_market_limit")]
    pub market_limit: usize,
    #[serde(default = "BriefingConfig::default_idea_days")]
    pub idea_days: i64,
    #[serde(default = "BriefingConfig::default_idea_limit")]
    pub idea_limit: usize,
    #[serde(default = "BriefingConfig::default_project_days")]
    pub project_days: i64,
    #[serde(default = "BriefingConfig::default_project_limit")]
    pub project_limit: usize,
}

impl BriefingConfig {
    fn default_market_days() -> i64 {
        3
    }

    fn default_market_limit() -> usize {
        30
    }

    fn default_idea_days() -> i64 {
        7
    }

    fn default_idea_limit() -> usize {
        10
    }

    fn default_project_days() -> i64 {
        7
    }

    fn default_project_limit() -> usize {
        20
    }
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            market_days: Self::default_market_days(),
            market_limit: Self::default_market_limit(),
            idea_days: Self::default_idea_days(),
            idea_limit: Self::default_idea_limit(),
            project_days: Self::default_project_days(),
            project_limit: Self::default_project_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogbookConfig {
    #[serde(default = "LogbookConfig::default_actions")]
    pub actions: PathBuf,
}

impl LogbookConfig {
    fn default_actions() -> PathBuf {
        PathBuf::from("logbook/actions.jsonl")
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            actions: Self::default_actions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "ServicesConfig::default_true")]
    pub audit_enabled: bool,
    #[serde(default)]
    pub sync_enabled: bool,
}

impl ServicesConfig {
    fn default_true() -> bool {
        true
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            audit_enabled: true,
            sync_enabled: false,
        }
    }
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
