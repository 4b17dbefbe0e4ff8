use std::time::Duration;

use anyhow::Result;

use crate::cli::args::ScanArgs;
use crate::cli::ui::{StatusPrinter, progress};
use crate::config::GuardianConfig;
use crate::report::AnalysisReportExt;

pub async fn run_url_command(url: String, common: ScanArgs) -> Result<()> {
    let env_vars: std::collections::HashMap<String, String> = std::env::vars().collect();
    let config = GuardianConfig::load_with_precedence(common.config.clone(), &common, &env_vars)?;

    let printer = StatusPrinter::new();
    printer.status("Scanning", &url);
    if common.verbosity > 0 {
        printer.dim(&format!(
            "model: {}, fetch timeout: {}s",
            config.analysis.model, config.fetch.timeout_secs
        ));
    }

    let scanner = super::build_scanner(&config)?;

    let spinner = progress::create_spinner("Fetching website and auditing its source...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = scanner.scan_url(&url).await;
    spinner.finish_and_clear();

    match result {
        Ok(analysis) => {
            analysis.print_readable();
            super::write_report(&analysis, common.output_dir.as_deref(), &printer)?;
            printer.success("Finished", "security audit complete");
            Ok(())
        }
        Err(e) => {
            printer.error("Error", &e.to_string());
            std::process::exit(1);
        }
    }
}
