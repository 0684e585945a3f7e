use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{AnalysisReport, Severity};

/// Render a colored terminal report.
pub fn render(report: &AnalysisReport, verbose: bool, quiet: bool) -> Result<()> {
    let summary = &report.summary;

    if quiet {
        println!(
            "Total: {}  Used: {}  Unused: {}  Missing: {}  Vulnerable: {}  Outdated: {}",
            summary.total_dependencies,
            summary.used_count.to_string().green(),
            summary.unused_count.to_string().yellow(),
            summary.missing_count.to_string().red(),
            summary.vulnerability_count.to_string().red(),
            summary.outdated_count.to_string().yellow(),
        );
        return Ok(());
    }

    println!("\n {} v{}", "depcheckr".bold(), env!("CARGO_PKG_VERSION"));
    println!(
        " Scanning: {} ({})\n",
        report.project_path,
        report.ecosystem
    );

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Total dependencies : {}", summary.total_dependencies)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Used            : {:>4}", "✓".green(), summary.used_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Unused          : {:>4}", "⚠".yellow(), summary.unused_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Missing         : {:>4}", "✗".red(), summary.missing_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Vulnerabilities : {:>4}", "✗".red(), summary.vulnerability_count)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Outdated        : {:>4}", "⚠".yellow(), summary.outdated_count)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if !report.unused.is_empty() {
        println!(" {} Declared but never referenced:\n", "[UNUSED]".yellow().bold());
        let mut table = section_table(vec!["Name", "Version", "Kind", "Declared in"]);
        for dep in &report.unused {
            table.add_row(vec![
                Cell::new(&dep.name),
                Cell::new(&dep.version),
                Cell::new(dep.kind.to_string()),
                Cell::new(&dep.source_file),
            ]);
        }
        println!("{table}\n");
        println!(
            " Estimated savings if removed: {} MB ({} GB)\n",
            report.impact.estimated_savings_mb.to_string().bold(),
            report.impact.estimated_savings_gb
        );
    }

    if !report.missing.is_empty() {
        println!(" {} Referenced but not declared:\n", "[MISSING]".red().bold());
        let mut table = section_table(vec!["Package", "File", "Line", "Reason"]);
        for reference in &report.missing {
            table.add_row(vec![
                Cell::new(&reference.package_name).fg(Color::Red),
                Cell::new(&reference.file),
                Cell::new(reference.line),
                Cell::new(reference.reason.as_deref().unwrap_or("import")),
            ]);
        }
        println!("{table}\n");
    }

    if !report.vulnerabilities.is_empty() {
        println!(" {} Known vulnerabilities:\n", "[SECURITY]".red().bold());
        let mut table = section_table(vec!["Package", "Severity", "Title"]);
        for vuln in &report.vulnerabilities {
            table.add_row(vec![
                Cell::new(&vuln.package),
                Cell::new(vuln.severity.to_string()).fg(severity_color(vuln.severity)),
                Cell::new(&vuln.title),
            ]);
        }
        println!("{table}\n");
    }

    if !report.outdated.is_empty() {
        println!(" {} Newer versions available:\n", "[OUTDATED]".yellow().bold());
        let mut table = section_table(vec!["Package", "Current", "Wanted", "Latest", "Kind"]);
        for record in &report.outdated {
            table.add_row(vec![
                Cell::new(&record.package),
                Cell::new(&record.current_version),
                Cell::new(&record.wanted_version),
                Cell::new(&record.latest_version).fg(Color::Green),
                Cell::new(
                    record
                        .kind
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
        }
        println!("{table}\n");
    }

    if verbose && !report.used.is_empty() {
        println!(" {} Referenced packages:\n", "[USED]".green().bold());
        let mut table = section_table(vec!["Package", "References", "First seen"]);
        for pkg in &report.used {
            let first = pkg
                .references
                .first()
                .map(|r| format!("{}:{}", r.file, r.line))
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(&pkg.name),
                Cell::new(pkg.references.len()),
                Cell::new(first),
            ]);
        }
        println!("{table}\n");
    }

    Ok(())
}

fn section_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    table
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Critical => Color::Red,
        Severity::High => Color::Red,
        Severity::Moderate => Color::Yellow,
        Severity::Low => Color::Yellow,
        Severity::Info => Color::Green,
        Severity::Unknown => Color::DarkGrey,
    }
}
