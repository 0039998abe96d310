use serde::Serialize;
use vitrine_core::config::{AppConfig, LoadOptions};
use vitrine_core::import::load_records;
use vitrine_core::{Catalog, ImportIssue, ImportPolicy};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct CatalogCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<CatalogCheck>,
    issues: Vec<ImportIssue>,
}

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"check serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(options: LoadOptions) -> CheckReport {
    let mut checks = Vec::new();
    let mut issues = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(CatalogCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            check_catalog(&config, &mut checks, &mut issues);
        }
        Err(error) => {
            checks.push(CatalogCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_file"));
            checks.push(skipped("catalog_import"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "check: catalog is ready".to_string()
    } else {
        "check: one or more catalog checks failed".to_string()
    };

    CheckReport { overall_status, summary, checks, issues }
}

fn check_catalog(
    config: &AppConfig,
    checks: &mut Vec<CatalogCheck>,
    issues: &mut Vec<ImportIssue>,
) {
    let records = match load_records(&config.catalog.data_path) {
        Ok(records) => {
            checks.push(CatalogCheck {
                name: "catalog_file",
                status: CheckStatus::Pass,
                details: format!(
                    "read {} categories from `{}`",
                    records.len(),
                    config.catalog.data_path.display()
                ),
            });
            records
        }
        Err(error) => {
            checks.push(CatalogCheck {
                name: "catalog_file",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_import"));
            return;
        }
    };

    // Always import leniently so every rejected product is reported.
    let outcome = match Catalog::from_records(records, ImportPolicy::Lenient) {
        Ok(outcome) => outcome,
        Err(error) => {
            checks.push(CatalogCheck {
                name: "catalog_import",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            return;
        }
    };

    let stats = outcome.catalog.statistics();
    let status = if outcome.issues.is_empty() { CheckStatus::Pass } else { CheckStatus::Fail };
    checks.push(CatalogCheck {
        name: "catalog_import",
        status,
        details: format!(
            "{} products imported, {} rejected",
            stats.unique_products,
            outcome.issues.len()
        ),
    });
    issues.extend(outcome.issues);
}

fn skipped(name: &'static str) -> CatalogCheck {
    CatalogCheck {
        name,
        status: CheckStatus::Skipped,
        details: "skipped because a previous check failed".to_string(),
    }
}

fn render_human(report: &CheckReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    for issue in &report.issues {
        lines.push(format!(
            "  * {} / {} [{}]: {}",
            issue.category, issue.product, issue.error_class, issue.message
        ));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
