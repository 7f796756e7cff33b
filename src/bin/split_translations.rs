//! Split translations binary - turns nested per-language sources into the
//! namespaced translation store the service reads
//!
//! Usage:
//!   cargo run --bin split-translations                          # Use env/default directories
//!   cargo run --bin split-translations -- locales translations  # Explicit source and output
//!
//! Optional environment variables:
//! - TRANSLATIONS_SOURCE_DIR (defaults to locales)
//! - TRANSLATIONS_DIR (defaults to translations)
//! - SUPPORTED_LANGUAGES (defaults to en,es)
//! - FALLBACK_LANGUAGE (defaults to en)

use anyhow::{Context, Result};
use onboarding_i18n::config::Config;
use onboarding_i18n::i18n::NamespaceTable;
use onboarding_i18n::splitter::{Splitter, SplitterConfig};
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("onboarding_i18n=info".parse()?)
                .add_directive("split_translations=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let mut args = std::env::args().skip(1);
    let source_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.source_dir));
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.translations_dir));

    info!(
        "Splitting {} -> {}",
        source_dir.display(),
        output_dir.display()
    );

    let splitter = Splitter::new(SplitterConfig {
        source_dir,
        output_dir: output_dir.clone(),
        languages: config.supported_languages.clone(),
        fallback_language: config.fallback_language.clone(),
        table: NamespaceTable::default(),
    });

    let summary = splitter
        .write_all()
        .with_context(|| format!("Failed to write translation store to {}", output_dir.display()))?;

    for (language, report) in &summary.audits {
        if !report.is_clean() {
            warn!(
                "{}: {} missing, {} warnings against {}",
                language,
                report.errors.len(),
                report.warnings.len(),
                config.fallback_language
            );
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("TRANSLATION STORE: {}", output_dir.display());
    println!("{}", "=".repeat(60));
    println!("Languages:  {}", summary.manifest.languages.join(", "));
    println!("Namespaces: {}", summary.manifest.namespaces.join(", "));
    println!("Files:      {}", summary.files_written.len());
    if !summary.files_removed.is_empty() {
        println!("Removed:    {}", summary.files_removed.len());
    }
    for (language, keys) in &summary.unmatched {
        println!("Unmatched ({}): {}", language, keys.join(", "));
    }
    println!("{}", "=".repeat(60));

    Ok(())
}
