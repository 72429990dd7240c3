//! Compensating-transaction (saga) runner.
//!
//! This crate executes an ordered sequence of steps, each with an optional
//! forward action (`commit`), a compensating action (`rollback`), and a
//! last-resort handler (`panic`). Commits run in order; the first failure
//! unwinds the attempted steps in reverse order through their rollbacks,
//! tolerating failures inside the compensations themselves. A failing
//! rollback escalates to the step's panic handler; a failing panic handler
//! aborts the unwind.
//!
//! Steps communicate through a single mutable [`ExecutionContext`] shared
//! across every action of a run, and the run's outcome is a plain boolean:
//! `true` only when every commit completed and no unwind was triggered.
//!
//! ```
//! use undoable_transaction::{
//!     ExecutionContext, MemoryLogger, StepDescriptor, Transaction, action,
//! };
//!
//! #[derive(Default)]
//! struct Provisioning {
//!     created_user_id: Option<u64>,
//! }
//!
//! # fn main() -> Result<(), undoable_transaction::MalformedStepSpec> {
//! let transaction: Transaction<Provisioning, String> = Transaction::new(
//!     MemoryLogger::default(),
//!     vec![
//!         StepDescriptor::ordered(
//!             Some("create user"),
//!             Some(action(|cx: &mut ExecutionContext<'_, Provisioning>| {
//!                 cx.domain.created_user_id = Some(12345);
//!                 Ok(())
//!             })),
//!             Some(action(|cx: &mut ExecutionContext<'_, Provisioning>| {
//!                 cx.domain.created_user_id = None;
//!                 Ok(())
//!             })),
//!             None,
//!         ),
//!         StepDescriptor::ordered(
//!             Some("send greeting email"),
//!             Some(action(|_cx| Err("smtp unreachable".to_string()))),
//!             None,
//!             None,
//!         ),
//!     ],
//! )?;
//!
//! let mut domain = Provisioning::default();
//! assert!(!transaction.run(&mut domain));
//! // The second commit failed, so the first was rolled back.
//! assert_eq!(domain.created_user_id, None);
//! # Ok(())
//! # }
//! ```

mod audit;
mod context;
mod descriptor;
mod error;
mod logger;
mod step;
mod transaction;

pub use audit::{RunAudit, StepRecord, StepStatus};
pub use context::ExecutionContext;
pub use descriptor::{FieldValue, StepDescriptor};
pub use error::MalformedStepSpec;
pub use logger::{Logger, MemoryLogger, Severity, TracingLogger};
pub use step::{Action, StepSpec, action};
pub use transaction::Transaction;
