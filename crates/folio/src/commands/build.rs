//! `folio build` command implementation.

use std::path::PathBuf;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::{
    ArtifactPaths, BuildConfig, FsDestination, GlobSource, Pipeline, SiteInfo, TemplateSettings,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the generated site (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Site URL used for canonical links, feeds and the sitemap (overrides config).
    #[arg(long, env = "FOLIO_SITE_URL")]
    site_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            output_dir: self.output_dir,
            site_url: self.site_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let build = &config.build_resolved;
        output.build_started(&config.site.title, &build.source_dir, &build.output_dir);

        let pipeline = Pipeline::new(build_config(&config))?;
        let source = GlobSource::new(&build.source_dir, &build.pattern);
        let mut destination = FsDestination::new(&build.output_dir);

        let report = pipeline.run(&source, &mut destination, |error| {
            tracing::warn!(
                stage = %error.stage,
                path = %error.path.display(),
                error = %error.source,
                "Page skipped"
            );
            output.page_skipped(&error);
        })?;

        output.build_finished(&report, &build.output_dir);
        if report.failed > 0 {
            return Err(CliError::PagesFailed(report.failed));
        }
        Ok(())
    }
}

/// Map the loaded configuration onto the pipeline's configuration.
fn build_config(config: &Config) -> BuildConfig {
    let templates = &config.templates_resolved;
    let artifacts = &config.artifacts_resolved;

    BuildConfig {
        base: config.build_resolved.source_dir.clone(),
        site: SiteInfo {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            url: config.site.url.trim_end_matches('/').to_owned(),
            language: config.site.language.clone(),
        },
        templates: TemplateSettings {
            layouts_dir: templates.dir.clone(),
            components_dir: templates.components_dir.clone(),
            default_layout: templates.default_layout.clone(),
        },
        artifacts: ArtifactPaths {
            sitemap: artifacts.sitemap.clone(),
            feed_json: artifacts.feed_json.clone(),
            feed_atom: artifacts.feed_atom.clone(),
            feed_rss: artifacts.feed_rss.clone(),
        },
    }
}
