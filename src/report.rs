//! Rendering of a completed analysis.

use codeguardian_core::{SecurityAnalysis, Severity, Vulnerability};

use crate::cli::ui::terminal_width;

/// Extension trait adding report output to [`SecurityAnalysis`].
pub trait AnalysisReportExt {
    /// Print a human-readable report to stdout.
    fn print_readable(&self);
    /// Convert to markdown format.
    fn to_markdown(&self) -> String;
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🟢",
        Severity::Informational => "🔵",
    }
}

fn severity_counts_line(analysis: &SecurityAnalysis) -> String {
    Severity::ALL
        .iter()
        .filter_map(|&severity| {
            let count = analysis.count_by_severity(severity);
            if count > 0 {
                Some(format!("{} {}: {}", severity_icon(severity), severity, count))
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

impl AnalysisReportExt for SecurityAnalysis {
    fn print_readable(&self) {
        let width = terminal_width().min(80);

        println!("\n🛡  Security Analysis Report");
        println!("{}", "=".repeat(width));

        println!("\n📋 Summary:");
        println!("{}", self.summary);

        if !self.has_vulnerabilities() {
            println!("\n✅ No Vulnerabilities Found");
            println!("The AI guardian found no security issues in the provided source.");
            println!();
            return;
        }

        println!(
            "\n⚠  {} finding(s): {}",
            self.vulnerabilities.len(),
            severity_counts_line(self)
        );

        for (idx, vuln) in self.vulnerabilities.iter().enumerate() {
            println!("\n{}", "-".repeat(width));
            print_vulnerability_card(idx + 1, vuln);
        }

        println!();
    }

    fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# Security Analysis Report\n\n");
        md.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&self.summary);
        md.push_str("\n\n");

        if !self.has_vulnerabilities() {
            md.push_str("## No Vulnerabilities Found\n\n");
            md.push_str("The AI guardian found no security issues in the provided source.\n");
            return md;
        }

        md.push_str(&format!(
            "## Vulnerabilities ({})\n\n",
            self.vulnerabilities.len()
        ));
        md.push_str(&severity_counts_line(self));
        md.push_str("\n\n");

        for (idx, vuln) in self.vulnerabilities.iter().enumerate() {
            md.push_str(&format!(
                "### {}. {} {} ({})\n\n",
                idx + 1,
                severity_icon(vuln.severity),
                vuln.vuln_type,
                vuln.severity
            ));
            if let Some(line) = vuln.line_number {
                md.push_str(&format!("Line: {line}\n\n"));
            }
            md.push_str(&format!("{}\n\n", vuln.description));
            md.push_str("**Remediation**\n\n");
            md.push_str(&format!("{}\n\n", vuln.remediation));
        }

        md
    }
}

fn print_vulnerability_card(index: usize, vuln: &Vulnerability) {
    println!(
        "{}. {} {} [{}]",
        index,
        severity_icon(vuln.severity),
        vuln.vuln_type,
        vuln.severity
    );
    if let Some(line) = vuln.line_number {
        println!("   Line: {line}");
    }
    println!("\n   {}", vuln.description);
    println!("\n   🔧 Remediation:");
    println!("   {}", vuln.remediation);
}
