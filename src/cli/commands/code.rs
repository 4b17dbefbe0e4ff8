use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::cli::args::{ScanArgs, canonical_language};
use crate::cli::ui::{StatusPrinter, progress};
use crate::config::GuardianConfig;
use crate::report::AnalysisReportExt;

pub async fn run_code_command(input: PathBuf, language: String, common: ScanArgs) -> Result<()> {
    let env_vars: std::collections::HashMap<String, String> = std::env::vars().collect();
    let config = GuardianConfig::load_with_precedence(common.config.clone(), &common, &env_vars)?;

    let language = canonical_language(&language)?;
    let printer = StatusPrinter::new();

    let (code, source_name) = read_code_input(&input)?;

    printer.status("Scanning", &format!("{source_name} ({language})"));
    if common.verbosity > 0 {
        printer.dim(&format!("model: {}", config.analysis.model));
    }

    let scanner = super::build_scanner(&config)?;

    let spinner = progress::create_spinner("Auditing code with the remote model...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = scanner.scan_code(&code, language).await;
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

fn read_code_input(input: &Path) -> Result<(String, String)> {
    if input.as_os_str() == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        Ok((code, "<stdin>".to_string()))
    } else {
        let code = std::fs::read_to_string(input)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;
        Ok((code, input.display().to_string()))
    }
}
