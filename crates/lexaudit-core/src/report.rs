//! Report types for findings, citations, and control verdicts

use serde::{Deserialize, Serialize};

/// Status of a single inspected resource.
///
/// Variants are declared in ascending precedence so that `Ord` gives the
/// aggregation order directly: the greatest status observed wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Resource satisfies the control
    Complies,
    /// Resource is acceptable but misses a recommended protection
    Warning,
    /// Resource violates the control
    Fails,
    /// Resource could not be assessed
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Complies => write!(f, "COMPLIES"),
            Status::Warning => write!(f, "WARNING"),
            Status::Fails => write!(f, "FAILS"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// Control-level verdict carried by a [`Report`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Complies,
    Warning,
    Fails,
    Error,
    /// No target resource existed on the host, so nothing was checked
    NoEvidence,
    /// Control was not evaluated on this host
    Skipped,
}

impl OverallStatus {
    /// `Error` and `NoEvidence` both mean the control could not be shown to hold.
    pub fn is_error_class(&self) -> bool {
        matches!(self, OverallStatus::Error | OverallStatus::NoEvidence)
    }

    /// True for verdicts an auditor must act on
    pub fn is_violation(&self) -> bool {
        matches!(self, OverallStatus::Fails) || self.is_error_class()
    }
}

impl From<Status> for OverallStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Complies => OverallStatus::Complies,
            Status::Warning => OverallStatus::Warning,
            Status::Fails => OverallStatus::Fails,
            Status::Error => OverallStatus::Error,
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Complies => write!(f, "COMPLIES"),
            OverallStatus::Warning => write!(f, "WARNING"),
            OverallStatus::Fails => write!(f, "FAILS"),
            OverallStatus::Error => write!(f, "ERROR"),
            OverallStatus::NoEvidence => write!(f, "NO EVIDENCE"),
            OverallStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Informational risk attached to a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Risk implied by a resource status when the check does not say otherwise
    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Complies => RiskLevel::Low,
            Status::Warning | Status::Error => RiskLevel::Medium,
            Status::Fails => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// One observation about one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Inspected entity, usually a path
    pub resource: String,

    /// Worst status recorded for this resource
    pub status: Status,

    /// Informational risk level
    pub risk_level: RiskLevel,

    /// Sub-observations in the order they were made
    #[serde(default)]
    pub details: Vec<String>,
}

impl Finding {
    /// Create a complying finding with no details yet
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            status: Status::Complies,
            risk_level: RiskLevel::Low,
            details: Vec::new(),
        }
    }

    /// Record a sub-observation. The status only ever moves up in precedence.
    pub fn record(&mut self, status: Status, detail: impl Into<String>) {
        self.status = self.status.max(status);
        self.risk_level = self.risk_level.max(RiskLevel::for_status(status));
        self.details.push(detail.into());
    }

    /// Builder form of [`Finding::record`]
    pub fn with_observation(mut self, status: Status, detail: impl Into<String>) -> Self {
        self.record(status, detail);
        self
    }

    /// Details joined for presentation
    pub fn details_text(&self) -> String {
        self.details.join("; ")
    }
}

/// How a citation points into its norm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Article of a statute or regulation
    Article,
    /// Control number of a standard
    Control,
}

/// Article or control number within a norm
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub value: String,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

/// A regulatory or standards provision tied to a control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Legal instrument or standard
    pub norm: String,

    /// Article or control within the norm
    pub reference: Reference,

    /// Obligation stated by the provision
    pub description: String,

    /// Penalty, for statutory citations that carry one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanction: Option<String>,

    /// Additional legal commentary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_note: Option<String>,
}

impl Citation {
    /// Citation of a statute article
    pub fn article(
        norm: impl Into<String>,
        article: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(norm, ReferenceKind::Article, article, description)
    }

    /// Citation of a standard's control
    pub fn control(
        norm: impl Into<String>,
        control: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_kind(norm, ReferenceKind::Control, control, description)
    }

    fn with_kind(
        norm: impl Into<String>,
        kind: ReferenceKind,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            norm: norm.into(),
            reference: Reference {
                kind,
                value: value.into(),
            },
            description: description.into(),
            sanction: None,
            legal_note: None,
        }
    }

    /// Attach the sanction associated with a violation
    pub fn with_sanction(mut self, sanction: impl Into<String>) -> Self {
        self.sanction = Some(sanction.into());
        self
    }

    /// Attach legal commentary
    pub fn with_legal_note(mut self, note: impl Into<String>) -> Self {
        self.legal_note = Some(note.into());
        self
    }
}

/// Evidence backing a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    /// Per-resource findings
    Findings(Vec<Finding>),
    /// Why no findings exist
    Note(String),
}

impl Evidence {
    pub fn findings(&self) -> &[Finding] {
        match self {
            Evidence::Findings(findings) => findings,
            Evidence::Note(_) => &[],
        }
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Evidence::Findings(_) => None,
            Evidence::Note(note) => Some(note),
        }
    }
}

/// Outcome of evaluating one control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub control_id: String,
    pub technical_name: String,
    pub overall_status: OverallStatus,
    pub evidence: Evidence,
    pub citations: Vec<Citation>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

impl Report {
    pub fn new(
        control_id: impl Into<String>,
        technical_name: impl Into<String>,
        overall_status: OverallStatus,
        evidence: Evidence,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            control_id: control_id.into(),
            technical_name: technical_name.into(),
            overall_status,
            evidence,
            citations,
            evaluated_at: chrono::Utc::now(),
        }
    }

    /// Citations implicated by this verdict; empty unless the control is violated.
    pub fn legal_exposure(&self) -> &[Citation] {
        if self.overall_status.is_violation() {
            &self.citations
        } else {
            &[]
        }
    }
}

/// System information collected during an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os_name: String,

    /// Operating system version
    pub os_version: String,

    /// Hostname
    pub hostname: String,

    /// Architecture (x86_64, aarch64, etc.)
    pub architecture: String,

    /// Whether running with elevated privileges
    pub is_elevated: bool,

    /// Kernel version (if available)
    pub kernel_version: Option<String>,
}

/// Report counts by overall status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub total_controls: usize,
    pub complies: usize,
    pub warning: usize,
    pub fails: usize,
    pub error: usize,
    pub no_evidence: usize,
    pub skipped: usize,
}

impl EvaluationSummary {
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.add(report.overall_status);
        }
        summary
    }

    /// Count one more report
    pub fn add(&mut self, status: OverallStatus) {
        self.total_controls += 1;
        match status {
            OverallStatus::Complies => self.complies += 1,
            OverallStatus::Warning => self.warning += 1,
            OverallStatus::Fails => self.fails += 1,
            OverallStatus::Error => self.error += 1,
            OverallStatus::NoEvidence => self.no_evidence += 1,
            OverallStatus::Skipped => self.skipped += 1,
        }
    }

    /// Whether any control failed or could not be evidenced
    pub fn has_violations(&self) -> bool {
        self.fails > 0 || self.error > 0 || self.no_evidence > 0
    }

    /// Get a score (0-100) based on complying controls
    pub fn score(&self) -> u32 {
        let applicable = self.total_controls - self.skipped;
        if applicable == 0 {
            return 100;
        }
        ((self.complies as f64 / applicable as f64) * 100.0) as u32
    }
}

/// Complete results of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    /// When the run started
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// When the run completed
    pub completed_at: chrono::DateTime<chrono::Utc>,

    /// System information
    pub system_info: SystemInfo,

    /// One report per evaluated control, in catalog order
    pub reports: Vec<Report>,

    /// Summary statistics
    pub summary: EvaluationSummary,

    /// Whether the run was cancelled before every control was evaluated
    #[serde(default)]
    pub cancelled: bool,
}

impl EvaluationResults {
    /// Create new, empty results
    pub fn new(system_info: SystemInfo) -> Self {
        let now = chrono::Utc::now();
        Self {
            started_at: now,
            completed_at: now,
            system_info,
            reports: Vec::new(),
            summary: EvaluationSummary::default(),
            cancelled: false,
        }
    }

    /// Add a report
    pub fn add_report(&mut self, report: Report) {
        self.summary.add(report.overall_status);
        self.reports.push(report);
    }

    /// Mark run as completed
    pub fn complete(&mut self) {
        self.completed_at = chrono::Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_citations() -> Vec<Citation> {
        vec![
            Citation::control("ISO/IEC 27001:2013", "A.9.2.3", "Privileged access"),
            Citation::article("Ley 21.459", "Art. 2", "Illicit access")
                .with_sanction("Presidio menor"),
        ]
    }

    #[test]
    fn test_finding_status_never_downgrades() {
        let mut finding = Finding::new("/var/log/syslog");
        finding.record(Status::Fails, "insecure permissions (0666)");
        finding.record(Status::Warning, "append-only attribute missing");

        assert_eq!(finding.status, Status::Fails);
        assert_eq!(finding.risk_level, RiskLevel::High);
        assert_eq!(
            finding.details_text(),
            "insecure permissions (0666); append-only attribute missing"
        );
    }

    #[test]
    fn test_finding_note_keeps_complies() {
        let finding = Finding::new("/var/log/auth.log")
            .with_observation(Status::Complies, "permissions ok (0640)");
        assert_eq!(finding.status, Status::Complies);
        assert_eq!(finding.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_error_class() {
        assert!(OverallStatus::Error.is_error_class());
        assert!(OverallStatus::NoEvidence.is_error_class());
        assert!(!OverallStatus::Fails.is_error_class());
        assert!(!OverallStatus::Skipped.is_violation());
        assert_ne!(OverallStatus::Error, OverallStatus::NoEvidence);
    }

    #[test]
    fn test_legal_exposure_only_on_violation() {
        let failing = Report::new(
            "TECH_ACC_002",
            "SSH root access disabled",
            OverallStatus::Fails,
            Evidence::Findings(Vec::new()),
            sample_citations(),
        );
        assert_eq!(failing.legal_exposure().len(), 2);

        let passing = Report::new(
            "TECH_ACC_002",
            "SSH root access disabled",
            OverallStatus::Complies,
            Evidence::Findings(Vec::new()),
            sample_citations(),
        );
        assert!(passing.legal_exposure().is_empty());
    }

    #[test]
    fn test_evidence_serializes_untagged() {
        let note = Evidence::Note("No standard log files were found".into());
        assert_eq!(
            serde_json::to_value(&note).unwrap(),
            serde_json::json!("No standard log files were found")
        );

        let findings = Evidence::Findings(vec![Finding::new("/etc/ssh/sshd_config")]);
        assert!(serde_json::to_value(&findings).unwrap().is_array());
    }

    #[test]
    fn test_summary_score_ignores_skipped() {
        let mut summary = EvaluationSummary::default();
        summary.add(OverallStatus::Complies);
        summary.add(OverallStatus::Fails);
        summary.add(OverallStatus::Skipped);

        assert_eq!(summary.total_controls, 3);
        assert_eq!(summary.score(), 50);
        assert!(summary.has_violations());
    }

    #[test]
    fn test_summary_all_skipped_scores_full() {
        let mut summary = EvaluationSummary::default();
        summary.add(OverallStatus::Skipped);
        assert_eq!(summary.score(), 100);
        assert!(!summary.has_violations());
    }
}
