use crate::model::{ScanReport, Severity, Source};
use anyhow::Result;
use std::collections::HashMap;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct DistRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Requires-Python")]
    requires_python: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Message")]
    message: String,
}

#[derive(Tabled)]
struct OutdatedRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Installed")]
    installed: String,
    #[tabled(rename = "Latest")]
    latest: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    println!();
    println!(
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    // Distributions table
    if report.distributions.is_empty() {
        println!("No distributions found.");
    } else {
        println!("Found {} distributions:", report.distributions.len());
        println!();

        let rows: Vec<DistRow> = report
            .distributions
            .iter()
            .map(|dist| {
                let d = &dist.descriptor;
                DistRow {
                    source: dist.source.display_name().to_string(),
                    name: truncate(&d.name, 30),
                    version: d.version.to_string(),
                    requires_python: d
                        .requires_python
                        .as_ref()
                        .map(|s| s.to_string())
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| "-".to_string()),
                    summary: d
                        .summary
                        .as_deref()
                        .map(|s| truncate(s, 40))
                        .unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    // Findings
    if !report.findings.is_empty() {
        println!();
        println!("Found {} findings:", report.findings.len());
        println!();

        let mut findings = report.findings.clone();
        findings.sort_by_key(|f| f.severity);

        let rows: Vec<FindingRow> = findings
            .iter()
            .map(|f| FindingRow {
                severity: format_severity(&f.severity),
                package: truncate(&f.package, 30),
                code: f.code.as_str().to_string(),
                message: truncate(&f.message, 60),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    // Outdated distributions
    if !report.outdated.is_empty() {
        println!();
        println!("Found {} outdated distributions:", report.outdated.len());
        println!();

        let rows: Vec<OutdatedRow> = report
            .outdated
            .iter()
            .map(|o| OutdatedRow {
                package: o.name.clone(),
                installed: o.current_version.clone(),
                latest: o.latest_version.clone(),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);

        print_upgrade_hint(report);
    }

    println!();
    print_summary(report);

    Ok(())
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Error => "\x1b[31mERROR\x1b[0m".to_string(),
        Severity::Warning => "\x1b[33mWARNING\x1b[0m".to_string(),
        Severity::Info => "INFO".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i <= max_len - 3)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}

fn print_upgrade_hint(report: &ScanReport) {
    if report.outdated.is_empty() {
        return;
    }

    println!();
    println!("Upgrade commands:");
    let names: Vec<&str> = report.outdated.iter().map(|o| o.name.as_str()).collect();
    if names.len() <= 5 {
        println!("  pip install --upgrade {}", names.join(" "));
    } else {
        println!("  pip install --upgrade ...  # {} packages", names.len());
    }
}

fn print_summary(report: &ScanReport) {
    let errors = report.count_by_severity(Severity::Error);
    let warnings = report.count_by_severity(Severity::Warning);
    let infos = report.count_by_severity(Severity::Info);

    let mut by_source: HashMap<Source, usize> = HashMap::new();
    for dist in &report.distributions {
        *by_source.entry(dist.source).or_default() += 1;
    }

    println!("Summary:");
    println!("  Total distributions: {}", report.distributions.len());

    if by_source.len() > 1 {
        let source_summary: Vec<String> = by_source
            .iter()
            .map(|(s, c)| format!("{} {}", c, s.display_name()))
            .collect();
        println!("  By source: {}", source_summary.join(", "));
    }

    if !report.findings.is_empty() {
        println!(
            "  Findings: {} errors, {} warnings, {} info",
            errors, warnings, infos
        );
    }

    if !report.outdated.is_empty() {
        println!("  Outdated distributions: {}", report.outdated.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_strings_untouched() {
        assert_eq!(truncate("pandas", 30), "pandas");
    }

    #[test]
    fn test_truncate_long_strings() {
        let long = "a".repeat(50);
        let cut = truncate(&long, 10);
        assert!(cut.len() <= 11);
        assert!(cut.ends_with("..."));
    }
}
