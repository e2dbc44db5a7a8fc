//! The technical-legal control catalog

use crate::checks::{CheckCategory, DISK_ENCRYPTION, LOG_IMMUTABILITY, SSH_ROOT_LOGIN};
use crate::matrix::{LegalMatrix, LegalMatrixBuilder};
use lexaudit_core::{Citation, LexauditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const ISO_27001_2013: &str = "ISO/IEC 27001:2013";

/// A technical requirement with the legal provisions it evidences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Stable identifier, unique across the catalog
    pub id: String,
    /// Human-readable name
    pub technical_name: String,
    /// Category
    pub category: CheckCategory,
    /// Key of the check that implements this control
    pub check_ref: String,
    /// Remediation guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// Provisions this control evidences, in presentation order
    pub citations: Vec<Citation>,
}

impl Control {
    pub fn new(
        id: impl Into<String>,
        technical_name: impl Into<String>,
        category: CheckCategory,
        check_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            technical_name: technical_name.into(),
            category,
            check_ref: check_ref.into(),
            remediation: None,
            citations: Vec::new(),
        }
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }

    /// Whether any citation belongs to `norm`
    pub fn cites(&self, norm: &str) -> bool {
        self.citations.iter().any(|c| c.norm == norm)
    }
}

/// The built-in catalog, in presentation order
pub fn builtin_controls() -> Vec<Control> {
    vec![
        Control::new(
            "TECH_ENC_001",
            "Disk encryption validation (AES-256)",
            CheckCategory::Encryption,
            DISK_ENCRYPTION,
        )
        .with_remediation("Encrypt the system volume with LUKS (Linux) or FileVault (macOS)")
        .with_citation(Citation::control(
            ISO_27001_2013,
            "A.10.1.1",
            "Policy on the use of cryptographic controls.",
        ))
        .with_citation(
            Citation::article(
                "Ley 21.719 (Chile) / Ley 21.459",
                "Art. 4 - Acceso Ilícito y Protección de Datos",
                "Duty to establish security measures that prevent unauthorized access to sensitive data.",
            )
            .with_sanction("Presidio menor en su grado mínimo a medio."),
        )
        .with_citation(Citation::article(
            "Reglamento Ciberseguridad",
            "Art. 7 - Integridad y Confidencialidad",
            "Data at rest must keep its confidentiality attributes through encryption.",
        )),
        Control::new(
            "TECH_ACC_002",
            "SSH root access disabled",
            CheckCategory::Authentication,
            SSH_ROOT_LOGIN,
        )
        .with_remediation("Set 'PermitRootLogin no' in sshd_config and restart sshd")
        .with_citation(Citation::control(
            ISO_27001_2013,
            "A.9.2.3",
            "Management of privileged access rights.",
        ))
        .with_citation(
            Citation::article(
                "Ley 21.459 (Delitos Informáticos)",
                "Art. 2 - Acceso Ilícito",
                "Whoever, without authorization, overcomes technical access barriers.",
            )
            .with_legal_note(
                "Leaving root login open makes the offence easier for third parties (culpa in vigilando).",
            ),
        ),
        Control::new(
            "TECH_LOG_003",
            "Audit log immutability",
            CheckCategory::Audit,
            LOG_IMMUTABILITY,
        )
        .with_remediation("Restrict logs to 0600/0640 and set the append-only attribute (chattr +a)")
        .with_citation(Citation::article(
            "Ley 21.719 (Modifica cuerpos legales)",
            "Art. X (Referencial)",
            "Duty to keep reliable records for forensic audit.",
        )),
    ]
}

/// Immutable catalog of controls with lookup and reverse indexes
#[derive(Debug, Clone)]
pub struct ControlRegistry {
    controls: Vec<Control>,
    by_id: HashMap<String, usize>,
}

impl ControlRegistry {
    /// Build a registry, validating catalog invariants
    pub fn new(controls: Vec<Control>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(controls.len());

        for (idx, control) in controls.iter().enumerate() {
            if by_id.insert(control.id.clone(), idx).is_some() {
                return Err(LexauditError::InvalidCatalog(format!(
                    "duplicate control id '{}'",
                    control.id
                )));
            }
            if control.citations.is_empty() {
                return Err(LexauditError::InvalidCatalog(format!(
                    "control '{}' has no citations",
                    control.id
                )));
            }
            let mut seen = HashSet::new();
            for citation in &control.citations {
                if !seen.insert((citation.norm.as_str(), citation.reference.value.as_str())) {
                    return Err(LexauditError::InvalidCatalog(format!(
                        "control '{}' cites '{}' {} twice",
                        control.id, citation.norm, citation.reference
                    )));
                }
            }
        }

        Ok(Self { controls, by_id })
    }

    /// Registry over the built-in catalog
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_controls())
    }

    /// Look up a control by id
    pub fn lookup(&self, control_id: &str) -> Result<&Control> {
        self.get(control_id)
            .ok_or_else(|| LexauditError::UnknownControl(control_id.to_string()))
    }

    pub fn get(&self, control_id: &str) -> Option<&Control> {
        self.by_id.get(control_id).map(|&idx| &self.controls[idx])
    }

    /// All controls in catalog order
    pub fn all(&self) -> &[Control] {
        &self.controls
    }

    /// Controls citing `norm`, in catalog order
    pub fn controls_for_norm(&self, norm: &str) -> Vec<&Control> {
        self.controls.iter().filter(|c| c.cites(norm)).collect()
    }

    /// Distinct norms in first-cited order
    pub fn norms(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.controls
            .iter()
            .flat_map(|c| c.citations.iter())
            .map(|c| c.norm.as_str())
            .filter(|norm| seen.insert(*norm))
            .collect()
    }

    pub fn by_category(&self, category: CheckCategory) -> Vec<&Control> {
        self.controls
            .iter()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Coverage matrix for the whole catalog
    pub fn matrix(&self) -> LegalMatrix {
        LegalMatrixBuilder::build(self)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
