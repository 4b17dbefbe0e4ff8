mod code;
mod url;

use std::path::Path;

use anyhow::Result;
use codeguardian_core::SecurityAnalysis;

use crate::cli::ui::StatusPrinter;
use crate::config::GuardianConfig;
use crate::fetch::HttpFetcher;
use crate::llm::GeminiClient;
use crate::report::AnalysisReportExt;
use crate::scanner::Scanner;

pub use code::run_code_command;
pub use url::run_url_command;

pub(crate) fn build_scanner(config: &GuardianConfig) -> Result<Scanner<GeminiClient, HttpFetcher>> {
    let model = GeminiClient::new(
        config.analysis.model.clone(),
        config.analysis.temperature,
        config.api.base_url.as_deref(),
    );
    let fetcher = HttpFetcher::new(config.fetch.timeout_secs, &config.fetch.user_agent)?;
    Ok(Scanner::new(model, fetcher, api_key_from_env(config)))
}

/// The key the remote endpoint will authenticate with. A custom base URL
/// routes through an OpenAI-compatible adapter, which reads its own variable.
fn api_key_from_env(config: &GuardianConfig) -> Option<String> {
    let var = if config.api.base_url.is_some() {
        "OPENAI_API_KEY"
    } else {
        "GEMINI_API_KEY"
    };
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

pub(crate) fn write_report(
    analysis: &SecurityAnalysis,
    output_dir: Option<&Path>,
    printer: &StatusPrinter,
) -> Result<()> {
    let Some(dir) = output_dir else {
        return Ok(());
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join("codeguardian-report.md");
    std::fs::write(&path, analysis.to_markdown())?;
    printer.info("Report", &path.display().to_string());
    Ok(())
}
