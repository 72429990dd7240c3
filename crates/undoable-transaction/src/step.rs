use crate::context::ExecutionContext;

/// A step action: forward work, compensation, or last-resort handling.
///
/// Actions receive the run's shared [`ExecutionContext`] and signal failure
/// by returning `Err`; no other return value is interpreted.
pub type Action<Ctx, E> =
    Box<dyn Fn(&mut ExecutionContext<'_, Ctx>) -> Result<(), E> + Send + Sync>;

/// Box a closure into an [`Action`].
pub fn action<Ctx, E, F>(f: F) -> Action<Ctx, E>
where
    F: Fn(&mut ExecutionContext<'_, Ctx>) -> Result<(), E> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Canonical step record produced by descriptor normalization.
///
/// All four fields are optional. A step without a `commit` never enters the
/// forward pass, and therefore never enters the unwind either - whatever
/// else it carries.
pub struct StepSpec<Ctx, E> {
    pub(crate) label: Option<String>,
    pub(crate) commit: Option<Action<Ctx, E>>,
    pub(crate) rollback: Option<Action<Ctx, E>>,
    pub(crate) panic: Option<Action<Ctx, E>>,
}

impl<Ctx, E> std::fmt::Debug for StepSpec<Ctx, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepSpec")
            .field("label", &self.label)
            .field("has_commit", &self.commit.is_some())
            .field("has_rollback", &self.rollback.is_some())
            .field("has_panic", &self.panic.is_some())
            .finish()
    }
}

impl<Ctx, E> StepSpec<Ctx, E> {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub fn has_commit(&self) -> bool {
        self.commit.is_some()
    }

    #[must_use]
    pub fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }

    #[must_use]
    pub fn has_panic(&self) -> bool {
        self.panic.is_some()
    }

    /// Label if present, positional fallback otherwise.
    pub(crate) fn display_name(&self, index: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("step {index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str);

    #[test]
    fn display_name_prefers_label() {
        let spec: StepSpec<(), TestError> = StepSpec {
            label: Some("create user".to_string()),
            commit: None,
            rollback: None,
            panic: None,
        };
        assert_eq!(spec.display_name(3), "create user");
    }

    #[test]
    fn display_name_falls_back_to_index() {
        let spec: StepSpec<(), TestError> = StepSpec {
            label: None,
            commit: None,
            rollback: None,
            panic: None,
        };
        assert_eq!(spec.display_name(3), "step 3");
    }

    #[test]
    fn capability_accessors_reflect_fields() {
        let spec: StepSpec<(), TestError> = StepSpec {
            label: None,
            commit: Some(action(|_cx| Ok(()))),
            rollback: None,
            panic: Some(action(|_cx| Ok(()))),
        };
        assert!(spec.has_commit());
        assert!(!spec.has_rollback());
        assert!(spec.has_panic());
        assert!(spec.label().is_none());
    }
}
