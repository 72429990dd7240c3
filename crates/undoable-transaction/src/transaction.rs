//! The step-execution engine: forward phase, reverse unwind, panic
//! escalation.

use std::fmt::Display;

use crate::audit::RunAudit;
use crate::context::ExecutionContext;
use crate::descriptor::{StepDescriptor, normalize};
use crate::error::MalformedStepSpec;
use crate::logger::{Logger, Severity};
use crate::step::StepSpec;

/// A compensating-transaction runner.
///
/// Built once from a descriptor sequence, then run any number of times -
/// sequentially - each run against its own domain context. The forward
/// phase invokes each step's commit in order; the first commit failure
/// triggers the unwind, which pops attempted steps in reverse order
/// (failing step first, since a failing commit may have left partial side
/// effects) and invokes their rollbacks, escalating a failed rollback to
/// the step's panic handler when one exists.
///
/// A failed rollback without a handler, or with a handler that completes,
/// does not stop the unwind: one unresolved cleanup should not prevent
/// undoing earlier, independent side effects. A failing panic handler is
/// the one exception - it marks the failure-handling path itself as
/// untrustworthy, so the unwind aborts rather than compound the damage.
///
/// `run` never propagates an action's failure to the caller; every action
/// outcome becomes log and audit data.
pub struct Transaction<Ctx, E> {
    logger: Box<dyn Logger>,
    steps: Vec<StepSpec<Ctx, E>>,
    verbose: bool,
}

impl<Ctx, E: Display> Transaction<Ctx, E> {
    /// Normalize `descriptors` and bind the logging capability.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedStepSpec`] if any descriptor has an unsupported
    /// shape. This is the only error surfaced to the caller; action
    /// failures during a run are reported through the boolean result, the
    /// log stream, and the audit.
    pub fn new(
        logger: impl Logger + 'static,
        descriptors: Vec<StepDescriptor<Ctx, E>>,
    ) -> Result<Self, MalformedStepSpec> {
        Ok(Self {
            logger: Box::new(logger),
            steps: normalize(descriptors)?,
            verbose: false,
        })
    }

    /// Log step lifecycle at info instead of debug severity.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The canonical step sequence this engine will execute.
    #[must_use]
    pub fn steps(&self) -> &[StepSpec<Ctx, E>] {
        &self.steps
    }

    /// Execute against `domain`, returning `true` only for a clean forward
    /// pass with no unwind.
    pub fn run(&self, domain: &mut Ctx) -> bool {
        self.run_with_audit(domain).0
    }

    /// Execute and additionally return the per-step audit.
    ///
    /// Any unwind makes the boolean `false` regardless of how cleanly
    /// compensation went; [`RunAudit::has_critical`] tells an aborted
    /// unwind apart from a complete one.
    pub fn run_with_audit(&self, domain: &mut Ctx) -> (bool, RunAudit) {
        let mut audit = RunAudit::new();
        let mut cx = ExecutionContext::new(&*self.logger, domain);
        let mut attempted: Vec<usize> = Vec::new();
        let mut unwinding = false;

        for (index, step) in self.steps.iter().enumerate() {
            // No commit: the step never enters the attempted set, so it is
            // also ineligible for compensation.
            let Some(commit) = step.commit.as_ref() else {
                continue;
            };
            let name = step.display_name(index);
            self.trace(&cx, &format!("commit {name}"));
            audit.record_attempt(index, &name);
            // Pushed before the outcome is known: a failing commit may have
            // produced side effects its own rollback must clean up.
            attempted.push(index);
            match commit(&mut cx) {
                Ok(()) => audit.commit_succeeded(),
                Err(error) => {
                    cx.log(
                        Severity::Error,
                        &format!("commit {name} failed: {error}, unwinding"),
                    );
                    audit.commit_failed();
                    unwinding = true;
                    break;
                }
            }
        }

        if !unwinding {
            return (true, audit);
        }

        while let Some(index) = attempted.pop() {
            let step = &self.steps[index];
            let name = step.display_name(index);
            let Some(rollback) = step.rollback.as_ref() else {
                self.trace(&cx, &format!("rollback {name}: nothing to undo"));
                audit.rolled_back(index);
                continue;
            };
            self.trace(&cx, &format!("rollback {name}"));
            audit.rollback_started(index);
            match rollback(&mut cx) {
                Ok(()) => audit.rolled_back(index),
                Err(error) => match step.panic.as_ref() {
                    None => {
                        cx.log(
                            Severity::Error,
                            &format!("rollback {name} failed: {error}, left unresolved"),
                        );
                        audit.rollback_failed(index);
                    }
                    Some(panic) => {
                        cx.log(
                            Severity::Warning,
                            &format!("rollback {name} failed: {error}, escalating"),
                        );
                        match panic(&mut cx) {
                            Ok(()) => {
                                cx.log(
                                    Severity::Warning,
                                    &format!("panic handler for {name} completed"),
                                );
                                audit.panic_handled(index);
                            }
                            Err(panic_error) => {
                                cx.log(
                                    Severity::Critical,
                                    &format!(
                                        "panic handler for {name} failed: {panic_error}, aborting unwind"
                                    ),
                                );
                                audit.panic_critical(index);
                                break;
                            }
                        }
                    }
                },
            }
        }

        (false, audit)
    }

    fn trace(&self, cx: &ExecutionContext<'_, Ctx>, message: &str) {
        let severity = if self.verbose {
            Severity::Info
        } else {
            Severity::Debug
        };
        cx.log(severity, message);
    }
}
