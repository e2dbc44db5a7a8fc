//! Output formatting for evaluation results

use lexaudit_controls::{ControlRegistry, LegalMatrix};
use lexaudit_core::{Citation, EvaluationResults, OverallStatus, Report, Result};
use serde::Serialize;

/// Format evaluation results as text.
///
/// Findings of complying controls are only listed when `show_passing` is set.
pub fn format_text(results: &EvaluationResults, show_passing: bool) -> String {
    let mut output = String::new();

    // Header
    output.push_str(&format!(
        "Lexaudit Compliance Evaluation Report\n{}\n\n",
        "=".repeat(37)
    ));

    // System info
    let info = &results.system_info;
    output.push_str(&format!("System: {} {}\n", info.os_name, info.os_version));
    output.push_str(&format!("Host: {}\n", info.hostname));
    output.push_str(&format!("Architecture: {}\n", info.architecture));
    output.push_str(&format!("Elevated: {}\n", if info.is_elevated { "Yes" } else { "No" }));
    output.push_str(&format!(
        "Evaluation Duration: {} ms\n\n",
        (results.completed_at - results.started_at).num_milliseconds()
    ));

    // Summary
    let summary = &results.summary;
    output.push_str("Summary\n-------\n");
    output.push_str(&format!("Controls Evaluated: {}\n", summary.total_controls));
    output.push_str(&format!("Complies: {}\n", summary.complies));
    output.push_str(&format!("Warning: {}\n", summary.warning));
    output.push_str(&format!("Fails: {}\n", summary.fails));
    output.push_str(&format!("Error: {}\n", summary.error));
    output.push_str(&format!("No Evidence: {}\n", summary.no_evidence));
    output.push_str(&format!("Skipped: {}\n", summary.skipped));
    output.push_str(&format!("Compliance Score: {}%\n", summary.score()));
    if results.cancelled {
        output.push_str("Evaluation cancelled before every control was evaluated\n");
    }
    output.push('\n');

    if !results.reports.is_empty() {
        output.push_str("Controls\n--------\n\n");
        for report in &results.reports {
            output.push_str(&format_report(report, show_passing));
            output.push('\n');
        }
    }

    output
}

fn format_report(report: &Report, show_passing: bool) -> String {
    let mut output = format!(
        "[{}] {} - {}\n",
        report.overall_status, report.control_id, report.technical_name
    );

    if let Some(note) = report.evidence.note() {
        output.push_str(&format!("  Note: {}\n", note));
    }

    if report.overall_status != OverallStatus::Complies || show_passing {
        let findings = report.evidence.findings();
        if !findings.is_empty() {
            output.push_str("  Evidence:\n");
        }
        for finding in findings {
            output.push_str(&format!(
                "    - {} [{}, risk {}]: {}\n",
                finding.resource,
                finding.status,
                finding.risk_level,
                finding.details_text()
            ));
        }
    }

    let exposure = report.legal_exposure();
    if !exposure.is_empty() {
        output.push_str("  Legal Exposure:\n");
        for citation in exposure {
            output.push_str(&format_citation(citation, "    "));
        }
    }

    output
}

fn format_citation(citation: &Citation, indent: &str) -> String {
    let mut output = format!("{}- [{}] {}\n", indent, citation.norm, citation.reference);
    output.push_str(&format!("{}  Risk: {}\n", indent, citation.description));
    if let Some(sanction) = &citation.sanction {
        output.push_str(&format!("{}  POSSIBLE SANCTION: {}\n", indent, sanction));
    }
    if let Some(note) = &citation.legal_note {
        output.push_str(&format!("{}  Legal Note: {}\n", indent, note));
    }
    output
}

/// Format the coverage matrix as text, one block per norm
pub fn format_matrix_text(matrix: &LegalMatrix) -> String {
    let mut output = format!("Legal Coverage Matrix\n{}\n\n", "=".repeat(21));

    if matrix.is_empty() {
        output.push_str("No norms covered\n");
        return output;
    }

    for (norm, entries) in matrix.iter() {
        output.push_str(&format!("{}\n", norm));
        for entry in entries {
            output.push_str(&format!("  - {}\n", entry));
        }
        output.push('\n');
    }

    output
}

/// Format the control catalog as text
pub fn format_controls_text(registry: &ControlRegistry) -> String {
    let mut output = format!("Controls ({})\n{}\n\n", registry.len(), "=".repeat(12));

    for control in registry.all() {
        output.push_str(&format!(
            "{} - {} [{}] (check: {})\n",
            control.id, control.technical_name, control.category, control.check_ref
        ));
        if let Some(remediation) = &control.remediation {
            output.push_str(&format!("  Remediation: {}\n", remediation));
        }
        for citation in &control.citations {
            output.push_str(&format_citation(citation, "  "));
        }
        output.push('\n');
    }

    output
}

/// Format any serializable value as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).map_err(Into::into)
    } else {
        serde_json::to_string(value).map_err(Into::into)
    }
}
