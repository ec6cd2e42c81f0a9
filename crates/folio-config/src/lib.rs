//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `site.title`,
//! `site.description` and `site.url`, and in every path setting of
//! `[build]`, `[templates]` and `[artifacts]`. Path settings also expand a
//! leading `~`. An unset variable without a default is an error.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override site URL.
    pub site_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site identity used in metatags, feeds and the sitemap.
    pub site: SiteConfig,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Template configuration (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,
    /// Artifact output paths (relative strings from TOML).
    artifacts: ArtifactsConfigRaw,

    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildPaths,
    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Resolved artifact paths (set after loading).
    #[serde(skip)]
    pub artifacts_resolved: ArtifactsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    config_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site name.
    pub title: String,
    /// Site description, used by feeds.
    pub description: String,
    /// Site host, the prefix of every canonical URL.
    pub url: String,
    /// Content language.
    pub language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Documentation".to_owned(),
            description: String::new(),
            url: "http://localhost".to_owned(),
            language: "en".to_owned(),
        }
    }
}

/// Raw build configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    source_dir: Option<String>,
    pattern: Option<String>,
    output_dir: Option<String>,
}

/// Resolved build configuration with absolute paths.
#[derive(Debug, Default)]
pub struct BuildPaths {
    /// Content root; page URLs are relative to it.
    pub source_dir: PathBuf,
    /// Glob selecting content files, relative to `source_dir`.
    pub pattern: String,
    /// Directory receiving the generated HTML.
    pub output_dir: PathBuf,
}

/// Raw template configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
    components_dir: Option<String>,
    default_layout: Option<String>,
}

/// Resolved template configuration with absolute paths.
#[derive(Debug, Default)]
pub struct TemplatesConfig {
    /// Layout directory (`<dir>/<name>.html`).
    pub dir: PathBuf,
    /// Partial template directory.
    pub components_dir: PathBuf,
    /// Layout used when front matter names none.
    pub default_layout: String,
}

/// Raw artifact paths as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ArtifactsConfigRaw {
    sitemap: Option<String>,
    feed_json: Option<String>,
    feed_atom: Option<String>,
    feed_rss: Option<String>,
}

/// Resolved artifact output paths.
#[derive(Debug, Default)]
pub struct ArtifactsConfig {
    /// Sitemap XML file.
    pub sitemap: PathBuf,
    /// JSON Feed 1 file.
    pub feed_json: PathBuf,
    /// Atom 1 feed file.
    pub feed_atom: PathBuf,
    /// RSS 2 feed file.
    pub feed_rss: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`site.url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// Artifact paths that were not set explicitly follow an overridden
    /// output directory.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.build_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
            self.resolve_artifacts();
        }
        if let Some(site_url) = &settings.site_url {
            self.site.url.clone_from(site_url);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let mut config = Self {
            site: SiteConfig::default(),
            build: BuildConfigRaw::default(),
            templates: TemplatesConfigRaw::default(),
            artifacts: ArtifactsConfigRaw::default(),
            build_resolved: BuildPaths::default(),
            templates_resolved: TemplatesConfig::default(),
            artifacts_resolved: ArtifactsConfig::default(),
            config_path: None,
            config_dir: PathBuf::new(),
        };
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_site()?;
        self.validate_build()?;
        require_non_empty(
            &self.templates_resolved.default_layout,
            "templates.default_layout",
        )?;
        Ok(())
    }

    fn validate_site(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.site.title, "site.title")?;
        require_non_empty(&self.site.url, "site.url")?;
        require_http_url(&self.site.url, "site.url")?;
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        let pattern = &self.build_resolved.pattern;
        require_non_empty(pattern, "build.pattern")?;
        glob::Pattern::new(pattern).map_err(|e| {
            ConfigError::Validation(format!("build.pattern is not a valid glob: {e}"))
        })?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.site.title = expand::text(&self.site.title, "site.title")?;
        self.site.description = expand::text(&self.site.description, "site.description")?;
        self.site.url = expand::text(&self.site.url, "site.url")?;

        let paths = [
            (&mut self.build.source_dir, "build.source_dir"),
            (&mut self.build.output_dir, "build.output_dir"),
            (&mut self.templates.dir, "templates.dir"),
            (&mut self.templates.components_dir, "templates.components_dir"),
            (&mut self.artifacts.sitemap, "artifacts.sitemap"),
            (&mut self.artifacts.feed_json, "artifacts.feed_json"),
            (&mut self.artifacts.feed_atom, "artifacts.feed_atom"),
            (&mut self.artifacts.feed_rss, "artifacts.feed_rss"),
        ];
        for (value, field) in paths {
            expand::path(value, field)?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.config_dir = config_dir.to_path_buf();

        self.build_resolved = BuildPaths {
            source_dir: resolve(self.build.source_dir.as_deref(), "pages"),
            pattern: self
                .build
                .pattern
                .clone()
                .unwrap_or_else(|| "**/*.md".to_owned()),
            output_dir: resolve(self.build.output_dir.as_deref(), "dist"),
        };

        self.templates_resolved = TemplatesConfig {
            dir: resolve(self.templates.dir.as_deref(), "src/templates"),
            components_dir: resolve(
                self.templates.components_dir.as_deref(),
                "src/components",
            ),
            default_layout: self
                .templates
                .default_layout
                .clone()
                .unwrap_or_else(|| "layout".to_owned()),
        };

        self.resolve_artifacts();
    }

    /// Resolve artifact paths; unset ones default to the output directory.
    fn resolve_artifacts(&mut self) {
        let output_dir = &self.build_resolved.output_dir;
        let resolve = |path: Option<&str>, default: &str| match path {
            Some(path) => self.config_dir.join(path),
            None => output_dir.join(default),
        };

        self.artifacts_resolved = ArtifactsConfig {
            sitemap: resolve(self.artifacts.sitemap.as_deref(), "sitemap.xml"),
            feed_json: resolve(self.artifacts.feed_json.as_deref(), "feed/feed.json"),
            feed_atom: resolve(self.artifacts.feed_atom.as_deref(), "feed/atom.xml"),
            feed_rss: resolve(self.artifacts.feed_rss.as_deref(), "feed/rss.xml"),
        };
    }
}
