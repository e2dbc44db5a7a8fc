//! Norm → control coverage matrix for audit presentation

use crate::catalog::{Control, ControlRegistry};
use lexaudit_core::{Citation, OverallStatus, Report};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

/// Mapping from each norm to `"<control_id>: <reference>"` entries.
///
/// Norms keep the order in which the catalog first cites them; entries keep
/// control order, then citation order within a control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegalMatrix {
    rows: Vec<(String, Vec<String>)>,
}

impl LegalMatrix {
    fn push(&mut self, norm: &str, entry: String) {
        match self.rows.iter_mut().find(|(n, _)| n == norm) {
            Some((_, entries)) => entries.push(entry),
            None => self.rows.push((norm.to_string(), vec![entry])),
        }
    }

    /// Entries for one norm
    pub fn get(&self, norm: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(n, _)| n == norm)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn norms(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rows.iter().map(|(n, e)| (n.as_str(), e.as_slice()))
    }

    /// Number of norms
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of entries across all norms
    pub fn total_entries(&self) -> usize {
        self.rows.iter().map(|(_, e)| e.len()).sum()
    }
}

impl Serialize for LegalMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (norm, entries) in &self.rows {
            map.serialize_entry(norm, entries)?;
        }
        map.end()
    }
}

/// One matrix entry for a control's citation
pub fn citation_summary(control_id: &str, citation: &Citation) -> String {
    format!("{}: {}", control_id, citation.reference)
}

/// Derives coverage matrices from the catalog
pub struct LegalMatrixBuilder;

impl LegalMatrixBuilder {
    /// Legal ground the catalog is designed to cover, independent of any run
    pub fn build(registry: &ControlRegistry) -> LegalMatrix {
        Self::from_controls(registry.all().iter())
    }

    /// Legal ground actually evidenced by a run.
    ///
    /// Only controls with a non-skipped report contribute; skipped or
    /// unevaluated controls are absent rather than counted as failures.
    pub fn build_evidenced(registry: &ControlRegistry, reports: &[Report]) -> LegalMatrix {
        let evidenced: HashSet<&str> = reports
            .iter()
            .filter(|r| r.overall_status != OverallStatus::Skipped)
            .map(|r| r.control_id.as_str())
            .collect();

        Self::from_controls(
            registry
                .all()
                .iter()
                .filter(|c| evidenced.contains(c.id.as_str())),
        )
    }

    fn from_controls<'a>(controls: impl Iterator<Item = &'a Control>) -> LegalMatrix {
        let mut matrix = LegalMatrix::default();
        for control in controls {
            for citation in &control.citations {
                matrix.push(&citation.norm, citation_summary(&control.id, citation));
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckCategory, LOG_IMMUTABILITY};
    use lexaudit_core::Evidence;

    fn report(id: &str, status: OverallStatus) -> Report {
        Report::new(id, id, status, Evidence::Note(String::new()), Vec::new())
    }

    #[test]
    fn test_matrix_counts_every_citation_once() {
        let registry = ControlRegistry::builtin().unwrap();
        let matrix = registry.matrix();

        for norm in registry.norms() {
            let expected: usize = registry
                .all()
                .iter()
                .map(|c| c.citations.iter().filter(|cit| cit.norm == norm).count())
                .sum();
            assert_eq!(matrix.get(norm).unwrap().len(), expected, "norm {}", norm);
        }

        let citations: usize = registry.all().iter().map(|c| c.citations.len()).sum();
        assert_eq!(matrix.total_entries(), citations);
    }

    #[test]
    fn test_matrix_entries_and_order() {
        let registry = ControlRegistry::builtin().unwrap();
        let matrix = LegalMatrixBuilder::build(&registry);

        assert_eq!(
            matrix.get("ISO/IEC 27001:2013").unwrap(),
            ["TECH_ENC_001: A.10.1.1", "TECH_ACC_002: A.9.2.3"]
        );
        assert_eq!(
            matrix.get("Ley 21.719 (Modifica cuerpos legales)").unwrap(),
            ["TECH_LOG_003: Art. X (Referencial)"]
        );
        assert_eq!(matrix.norms().next(), Some("ISO/IEC 27001:2013"));
    }

    #[test]
    fn test_two_citations_same_norm_give_two_entries() {
        let control = Control::new("TECH_LOG_010", "Logs", CheckCategory::Audit, LOG_IMMUTABILITY)
            .with_citation(Citation::control("ISO/IEC 27001:2013", "A.12.4.1", "Event logging"))
            .with_citation(Citation::control("ISO/IEC 27001:2013", "A.12.4.2", "Log protection"));
        let registry = ControlRegistry::new(vec![control]).unwrap();

        assert_eq!(
            registry.matrix().get("ISO/IEC 27001:2013").unwrap(),
            ["TECH_LOG_010: A.12.4.1", "TECH_LOG_010: A.12.4.2"]
        );
    }

    #[test]
    fn test_evidenced_matrix_drops_skipped_controls() {
        let registry = ControlRegistry::builtin().unwrap();
        let reports = vec![
            report("TECH_ENC_001", OverallStatus::Skipped),
            report("TECH_ACC_002", OverallStatus::Fails),
            report("TECH_LOG_003", OverallStatus::NoEvidence),
        ];

        let matrix = LegalMatrixBuilder::build_evidenced(&registry, &reports);
        assert_eq!(
            matrix.get("ISO/IEC 27001:2013").unwrap(),
            ["TECH_ACC_002: A.9.2.3"]
        );
        assert!(matrix.get("Reglamento Ciberseguridad").is_none());
        assert!(matrix.get("Ley 21.719 (Modifica cuerpos legales)").is_some());
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let registry = ControlRegistry::builtin().unwrap();
        let json = serde_json::to_string(&registry.matrix()).unwrap();
        let iso = json.find("ISO/IEC 27001:2013").unwrap();
        let reglamento = json.find("Reglamento Ciberseguridad").unwrap();
        assert!(iso < reglamento);
        assert!(json.starts_with('{'));
    }
}
