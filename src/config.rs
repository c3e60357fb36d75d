use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_BLOCK_KIND: &str = "moved";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub dry_run: bool,
    pub processing: ProcessingConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingConfig {
    pub block_kind: String,
    pub normalize_whitespace: bool,
    pub canonical_format: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            block_kind: DEFAULT_BLOCK_KIND.to_string(),
            normalize_whitespace: true,
            canonical_format: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryConfig {
    pub extensions: Vec<String>,
    pub exclude_dirs: Vec<String>,
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["tf".to_string()],
            exclude_dirs: vec![".terraform".to_string(), ".git".to_string()],
            follow_links: false,
        }
    }
}

/// Flag values that outrank every config source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dry_run: bool,
    pub block_kind: Option<String>,
    pub no_normalize: bool,
    pub no_format: bool,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: ConfigProfile,

    #[serde(flatten)]
    profiles: HashMap<String, ConfigProfile>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    dry_run: Option<bool>,

    #[serde(default)]
    processing: ProcessingProfile,

    #[serde(default)]
    discovery: DiscoveryProfile,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ProcessingProfile {
    block_kind: Option<String>,
    normalize_whitespace: Option<bool>,
    canonical_format: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct DiscoveryProfile {
    extensions: Option<Vec<String>>,
    exclude_dirs: Option<Vec<String>>,
    follow_links: Option<bool>,
}

impl Config {
    pub fn load(
        config_path: Option<&PathBuf>,
        profile: Option<&String>,
        overrides: Overrides,
    ) -> Result<Self> {
        let mut config = Self::default();

        // 1. Global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            tracing::debug!("Loading global config: {:?}", global_path);
            let profile_config = Self::load_from_file(&global_path, profile)?;
            config.merge(profile_config);
        }

        // 2. Project config
        if let Some(project_path) = Self::project_config_path() {
            tracing::debug!("Loading project config: {:?}", project_path);
            let profile_config = Self::load_from_file(&project_path, profile)?;
            config.merge(profile_config);
        }

        // 3. Custom config file
        if let Some(path) = config_path {
            tracing::debug!("Loading custom config: {:?}", path);
            let profile_config = Self::load_from_file(path, profile)?;
            config.merge(profile_config);
        }

        // 4. Environment variables
        config.apply_env()?;

        // 5. CLI flags
        config.apply_overrides(overrides);

        config.normalize();
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(path: &Path, profile: Option<&String>) -> Result<ConfigProfile> {
        #[cfg(unix)]
        Self::check_permissions(path)?;

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config_file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if let Some(profile_name) = profile {
            config_file
                .profiles
                .get(profile_name)
                .cloned()
                .ok_or_else(|| {
                    anyhow::anyhow!("Profile '{}' not found in {:?}", profile_name, path)
                })
        } else {
            Ok(config_file.default)
        }
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mode = metadata.permissions().mode();

        if is_writable_by_others(mode) {
            tracing::warn!(
                "Config file {:?} is writable by group or others: {:o}. \
                 Recommend: chmod 644 {:?}",
                path,
                mode,
                path
            );
        }

        Ok(())
    }

    fn merge(&mut self, other: ConfigProfile) {
        if let Some(dry_run) = other.dry_run {
            self.dry_run = dry_run;
        }

        if let Some(kind) = other.processing.block_kind {
            self.processing.block_kind = kind;
        }
        if let Some(normalize) = other.processing.normalize_whitespace {
            self.processing.normalize_whitespace = normalize;
        }
        if let Some(format) = other.processing.canonical_format {
            self.processing.canonical_format = format;
        }

        if let Some(extensions) = other.discovery.extensions {
            self.discovery.extensions = extensions;
        }
        if let Some(exclude_dirs) = other.discovery.exclude_dirs {
            self.discovery.exclude_dirs = exclude_dirs;
        }
        if let Some(follow_links) = other.discovery.follow_links {
            self.discovery.follow_links = follow_links;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MOVED_REMOVER_BLOCK_KIND") {
            self.processing.block_kind = val;
        }
        if let Ok(val) = std::env::var("MOVED_REMOVER_DRY_RUN") {
            self.dry_run = parse_bool(&val).context("Invalid MOVED_REMOVER_DRY_RUN")?;
        }
        if let Ok(val) = std::env::var("MOVED_REMOVER_NORMALIZE_WHITESPACE") {
            self.processing.normalize_whitespace =
                parse_bool(&val).context("Invalid MOVED_REMOVER_NORMALIZE_WHITESPACE")?;
        }
        if let Ok(val) = std::env::var("MOVED_REMOVER_CANONICAL_FORMAT") {
            self.processing.canonical_format =
                parse_bool(&val).context("Invalid MOVED_REMOVER_CANONICAL_FORMAT")?;
        }
        if let Ok(val) = std::env::var("MOVED_REMOVER_EXTENSIONS") {
            self.discovery.extensions = split_list(&val);
        }
        if let Ok(val) = std::env::var("MOVED_REMOVER_EXCLUDE_DIRS") {
            self.discovery.exclude_dirs = split_list(&val);
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: Overrides) {
        if overrides.dry_run {
            self.dry_run = true;
        }
        if let Some(kind) = overrides.block_kind {
            self.processing.block_kind = kind;
        }
        if overrides.no_normalize {
            self.processing.normalize_whitespace = false;
        }
        if overrides.no_format {
            self.processing.canonical_format = false;
        }
    }

    fn normalize(&mut self) {
        self.processing.block_kind = self.processing.block_kind.trim().to_string();
        self.discovery.extensions = self
            .discovery
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
    }

    pub fn validate(&self) -> Result<()> {
        if !IDENTIFIER_RE.is_match(&self.processing.block_kind) {
            anyhow::bail!(
                "Invalid block kind {:?}: expected an HCL identifier such as \"moved\"",
                self.processing.block_kind
            );
        }

        if self.discovery.extensions.is_empty() {
            anyhow::bail!(
                "No file extensions configured. Set via:\n\
                 1. MOVED_REMOVER_EXTENSIONS env var\n\
                 2. Config file: [default.discovery] extensions = [\"tf\"]"
            );
        }

        Ok(())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/terraform-moved-remover/config.toml"))
    }

    pub fn project_config_path() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        let mut dir = current.as_path();

        loop {
            let candidate = dir.join(".moved-remover.toml");
            if candidate.exists() {
                return Some(candidate);
            }

            dir = dir.parent()?;
        }
    }

    pub fn init_config(global: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().context("Failed to determine global config path")?
        } else {
            PathBuf::from(".moved-remover.toml")
        };

        if path.exists() {
            anyhow::bail!("Config file already exists: {:?}", path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let template = r#"[default]
# dry_run = false

[default.processing]
block_kind = "moved"
normalize_whitespace = true
canonical_format = true

[default.discovery]
extensions = ["tf"]
exclude_dirs = [".terraform", ".git"]
follow_links = false

# Additional profiles, selected with --profile
# [imports]
# processing = { block_kind = "import" }
"#;

        fs::write(&path, template)?;

        Ok(path)
    }
}

fn parse_bool(val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .collect()
}

// Config decides which blocks get deleted, so only the owner may change it.
#[cfg(unix)]
fn is_writable_by_others(mode: u32) -> bool {
    mode & 0o022 != 0
}
