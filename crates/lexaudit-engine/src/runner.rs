//! Evaluation runner that joins check verdicts with catalog citations

use lexaudit_controls::{default_checks, CheckCategory, CheckRegistry, Control, ControlRegistry};
use lexaudit_core::{
    aggregate, Applicability, Check, CheckConfig, CheckContext, CheckOutcome, Config, Evidence,
    EvaluationResults, OverallStatus, Report, Result,
};
use lexaudit_platform::{get_system_info, DefaultCheckContext};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag for an in-flight evaluation.
///
/// Controls that have not started when the flag is raised are abandoned;
/// reports already built are kept.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for the evaluation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Run checks in parallel
    pub parallel: bool,
    /// Worker threads for parallel runs; `None` uses the global pool
    pub threads: Option<usize>,
    /// Control ids reported as skipped without running
    pub skip_controls: Vec<String>,
    /// Only evaluate controls in these categories (all when empty)
    pub categories: Vec<CheckCategory>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            skip_controls: Vec::new(),
            categories: Vec::new(),
        }
    }
}

/// Orchestrates checks for the controls of a registry
pub struct EvaluationEngine {
    registry: Arc<ControlRegistry>,
    checks: CheckRegistry,
    ctx: Arc<dyn CheckContext>,
    config: EngineConfig,
    pool: Option<rayon::ThreadPool>,
}

impl EvaluationEngine {
    /// Create an engine over a registry, its checks, and a host context
    pub fn new(
        registry: Arc<ControlRegistry>,
        checks: CheckRegistry,
        ctx: Arc<dyn CheckContext>,
    ) -> Self {
        Self {
            registry,
            checks,
            ctx,
            config: EngineConfig::default(),
            pool: None,
        }
    }

    /// Engine over the built-in catalog and checks for the current host
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = Arc::new(ControlRegistry::builtin()?);
        let checks = default_checks(&config.evaluation)?;
        let ctx = DefaultCheckContext::new(CheckConfig {
            command_timeout: config.evaluation.command_timeout(),
        });

        Ok(Self::new(registry, checks, Arc::new(ctx)).with_config(EngineConfig {
            parallel: config.evaluation.parallel,
            threads: Some(config.general.parallelism.max(1)),
            skip_controls: config.evaluation.skip_controls.clone(),
            categories: Vec::new(),
        }))
    }

    /// Set the engine configuration, building its worker pool if sized
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.pool = config.threads.and_then(|threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| warn!("Could not build worker pool, using global pool: {}", e))
                .ok()
        });
        self.config = config;
        self
    }

    /// Set parallel execution
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Restrict evaluation to categories
    pub fn with_categories(mut self, categories: Vec<CheckCategory>) -> Self {
        self.config.categories = categories;
        self
    }

    /// Skip specific controls by id
    pub fn skip(mut self, control_ids: Vec<String>) -> Self {
        self.config.skip_controls.extend(control_ids);
        self
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    /// Evaluate one control. Only an unknown id is an error.
    pub fn evaluate(&self, control_id: &str) -> Result<Report> {
        let control = self.registry.lookup(control_id)?;
        Ok(self.evaluate_control(control))
    }

    /// Evaluate every selected control, in catalog order
    pub fn evaluate_all(&self) -> Vec<Report> {
        self.evaluate_all_until(&CancellationToken::new())
    }

    /// Like [`EvaluationEngine::evaluate_all`], abandoning controls that have
    /// not started once `token` is cancelled.
    pub fn evaluate_all_until(&self, token: &CancellationToken) -> Vec<Report> {
        let controls = self.selected_controls();
        info!("Evaluating {} controls", controls.len());

        let evaluate = |control: &&Control| {
            if token.is_cancelled() {
                debug!("Abandoning {}: evaluation cancelled", control.id);
                None
            } else {
                Some(self.evaluate_control(control))
            }
        };

        let reports: Vec<Option<Report>> = if self.config.parallel {
            let run = || -> Vec<Option<Report>> { controls.par_iter().map(evaluate).collect() };
            match &self.pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        } else {
            controls.iter().map(evaluate).collect()
        };

        reports.into_iter().flatten().collect()
    }

    /// Evaluate every selected control and collect full results
    pub fn run(&self) -> EvaluationResults {
        self.run_until(&CancellationToken::new())
    }

    pub fn run_until(&self, token: &CancellationToken) -> EvaluationResults {
        let mut results = EvaluationResults::new(get_system_info());
        let expected = self.selected_controls().len();

        for report in self.evaluate_all_until(token) {
            results.add_report(report);
        }

        results.cancelled = results.reports.len() < expected;
        results.complete();
        info!(
            "Evaluation completed: {} controls, {} failing, {} skipped",
            results.summary.total_controls,
            results.summary.fails + results.summary.error + results.summary.no_evidence,
            results.summary.skipped
        );

        results
    }

    fn selected_controls(&self) -> Vec<&Control> {
        self.registry
            .all()
            .iter()
            .filter(|c| {
                self.config.categories.is_empty() || self.config.categories.contains(&c.category)
            })
            .collect()
    }

    fn evaluate_control(&self, control: &Control) -> Report {
        let report = |status: OverallStatus, evidence: Evidence| {
            Report::new(
                &control.id,
                &control.technical_name,
                status,
                evidence,
                control.citations.clone(),
            )
        };

        if self.config.skip_controls.iter().any(|id| id == &control.id) {
            debug!("Skipping {} by configuration", control.id);
            return report(
                OverallStatus::Skipped,
                Evidence::Note("Skipped by configuration".to_string()),
            );
        }

        let Some(check) = self.checks.get(&control.check_ref) else {
            warn!("No check registered for {} ({})", control.id, control.check_ref);
            return report(
                OverallStatus::Error,
                Evidence::Note(format!(
                    "No check is registered under '{}'",
                    control.check_ref
                )),
            );
        };

        if let Applicability::NotApplicable(reason) = check.applicability(self.ctx.as_ref()) {
            debug!("{} not applicable: {}", control.id, reason);
            return report(OverallStatus::Skipped, Evidence::Note(reason));
        }

        debug!("Running check {} for {}", check.key(), control.id);
        let (status, evidence) = match self.run_check(check.as_ref()) {
            Ok(CheckOutcome::Findings(findings)) if findings.is_empty() => (
                OverallStatus::NoEvidence,
                Evidence::Note(format!("Check '{}' inspected no resources", check.key())),
            ),
            Ok(CheckOutcome::Findings(findings)) => {
                (aggregate(&findings), Evidence::Findings(findings))
            }
            Ok(CheckOutcome::NoResource(reason)) => (OverallStatus::NoEvidence, Evidence::Note(reason)),
            Ok(CheckOutcome::Unsupported(reason)) => (OverallStatus::Skipped, Evidence::Note(reason)),
            Err(message) => {
                warn!("Check {} for {} aborted: {}", check.key(), control.id, message);
                (
                    OverallStatus::Error,
                    Evidence::Note(format!("Check '{}' aborted: {}", check.key(), message)),
                )
            }
        };

        debug!("{} -> {}", control.id, status);
        report(status, evidence)
    }

    fn run_check(&self, check: &dyn Check) -> std::result::Result<CheckOutcome, String> {
        catch_unwind(AssertUnwindSafe(|| check.run(self.ctx.as_ref()))).map_err(|payload| {
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string())
        })
    }
}
