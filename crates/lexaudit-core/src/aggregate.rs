//! Folding per-resource findings into one control verdict

use crate::report::{Finding, OverallStatus, Status};

/// Fold findings into a control-level status.
///
/// Precedence is `Error > Fails > Warning > Complies`; the worst observed
/// status wins regardless of input order. An empty slice means no target
/// resource existed and yields [`OverallStatus::NoEvidence`], which is kept
/// distinct from an in-band `Error` finding.
pub fn aggregate(findings: &[Finding]) -> OverallStatus {
    aggregate_statuses(findings.iter().map(|f| f.status))
}

/// [`aggregate`] over bare statuses
pub fn aggregate_statuses(statuses: impl IntoIterator<Item = Status>) -> OverallStatus {
    statuses
        .into_iter()
        .max()
        .map(OverallStatus::from)
        .unwrap_or(OverallStatus::NoEvidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(status: Status) -> Finding {
        Finding::new("/var/log/syslog").with_observation(status, "observed")
    }

    fn fold(statuses: &[Status]) -> OverallStatus {
        let findings: Vec<Finding> = statuses.iter().copied().map(finding).collect();
        aggregate(&findings)
    }

    #[test]
    fn test_empty_is_no_evidence() {
        assert_eq!(aggregate(&[]), OverallStatus::NoEvidence);
        assert_eq!(fold(&[Status::Error]), OverallStatus::Error);
        assert_ne!(aggregate(&[]), fold(&[Status::Error]));
        assert!(aggregate(&[]).is_error_class());
    }

    #[test]
    fn test_precedence_pairs() {
        assert_eq!(fold(&[Status::Complies, Status::Warning]), OverallStatus::Warning);
        assert_eq!(fold(&[Status::Warning, Status::Fails]), OverallStatus::Fails);
        assert_eq!(fold(&[Status::Fails, Status::Error]), OverallStatus::Error);
        assert_eq!(fold(&[Status::Complies, Status::Complies]), OverallStatus::Complies);
    }

    #[test]
    fn test_single_failure_not_masked() {
        let mut statuses = vec![Status::Complies; 10];
        statuses.push(Status::Fails);
        assert_eq!(fold(&statuses), OverallStatus::Fails);
    }

    #[test]
    fn test_order_independent() {
        let all = [Status::Complies, Status::Warning, Status::Fails, Status::Error];
        for a in all {
            for b in all {
                for c in all {
                    let forward = fold(&[a, b, c]);
                    assert_eq!(forward, fold(&[c, b, a]));
                    assert_eq!(forward, fold(&[b, a, c]));
                    // Folding a prefix first gives the same result.
                    let prefix = aggregate_statuses([a, b]);
                    let regrouped = match prefix {
                        OverallStatus::Complies => fold(&[Status::Complies, c]),
                        OverallStatus::Warning => fold(&[Status::Warning, c]),
                        OverallStatus::Fails => fold(&[Status::Fails, c]),
                        _ => fold(&[Status::Error, c]),
                    };
                    assert_eq!(forward, regrouped);
                }
            }
        }
    }
}
