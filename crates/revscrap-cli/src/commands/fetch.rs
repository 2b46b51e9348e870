use crate::output::Output;
use color_eyre::eyre::Context;
use color_eyre::Result;
use revscrap_config::Config;
use revscrap_core::{scrape, ReviewFetcher};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// One-shot download from the command line, same pipeline as the web form
pub async fn run_fetch(config: &Config, url: &str, out: Option<PathBuf>, output: &Output) -> Result<()> {
    let fetcher = ReviewFetcher::from_config(config);

    let export = scrape(&fetcher, url).await.map_err(|e| {
        output.error(e.kind().message());
        e
    })?;

    let path = out.unwrap_or_else(|| PathBuf::from(&export.filename));
    tokio::fs::write(&path, &export.content)
        .await
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), reviews = export.review_count, "Wrote CSV");
    output.success(format!("Saved {} reviews to {}", export.review_count, path.display()));
    output.json(&json!({
        "type": "result",
        "path": path.display().to_string(),
        "reviews": export.review_count,
    }));
    Ok(())
}
