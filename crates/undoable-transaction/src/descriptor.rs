//! Step descriptor shapes and their normalization.
//!
//! Callers describe steps in whichever shape is convenient: an ordered
//! grouping of all four fields, or a keyed subset. Normalization turns every
//! shape into the one canonical [`StepSpec`] record, preserving order, and
//! is the only place descriptor validation happens - the executor never
//! sniffs shapes, and action callables are never introspected or invoked
//! here.

use crate::context::ExecutionContext;
use crate::error::MalformedStepSpec;
use crate::step::{Action, StepSpec};

/// Value carried by one field of a keyed descriptor.
pub enum FieldValue<Ctx, E> {
    /// A human-readable label.
    Text(String),
    /// A commit, rollback, or panic action.
    Action(Action<Ctx, E>),
}

impl<Ctx, E> FieldValue<Ctx, E> {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&mut ExecutionContext<'_, Ctx>) -> Result<(), E> + Send + Sync + 'static,
    {
        Self::Action(Box::new(f))
    }
}

/// One step of a transaction description, in any supported shape.
pub enum StepDescriptor<Ctx, E> {
    /// Positional grouping of `label, commit, rollback, panic`; every field
    /// optional.
    Ordered {
        label: Option<String>,
        commit: Option<Action<Ctx, E>>,
        rollback: Option<Action<Ctx, E>>,
        panic: Option<Action<Ctx, E>>,
    },
    /// Keyed subset of `{label, commit, rollback, panic}`.
    Keyed(Vec<(String, FieldValue<Ctx, E>)>),
}

impl<Ctx, E> StepDescriptor<Ctx, E> {
    #[must_use]
    pub fn ordered(
        label: Option<&str>,
        commit: Option<Action<Ctx, E>>,
        rollback: Option<Action<Ctx, E>>,
        panic: Option<Action<Ctx, E>>,
    ) -> Self {
        Self::Ordered {
            label: label.map(str::to_string),
            commit,
            rollback,
            panic,
        }
    }

    #[must_use]
    pub fn keyed<K: Into<String>>(fields: Vec<(K, FieldValue<Ctx, E>)>) -> Self {
        Self::Keyed(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn into_spec(self, index: usize) -> Result<StepSpec<Ctx, E>, MalformedStepSpec> {
        match self {
            Self::Ordered {
                label,
                commit,
                rollback,
                panic,
            } => Ok(StepSpec {
                label,
                commit,
                rollback,
                panic,
            }),
            Self::Keyed(fields) => {
                let mut spec = StepSpec {
                    label: None,
                    commit: None,
                    rollback: None,
                    panic: None,
                };
                for (key, value) in fields {
                    let field = match key.as_str() {
                        "label" => FieldKey::Label,
                        "commit" => FieldKey::Commit,
                        "rollback" => FieldKey::Rollback,
                        "panic" => FieldKey::Panic,
                        _ => return Err(MalformedStepSpec::UnknownField { index, key }),
                    };
                    match (field, value) {
                        (FieldKey::Label, FieldValue::Text(text)) => {
                            if spec.label.replace(text).is_some() {
                                return Err(MalformedStepSpec::DuplicateField { index, key });
                            }
                        }
                        (FieldKey::Label, FieldValue::Action(_)) => {
                            return Err(MalformedStepSpec::FieldShape {
                                index,
                                key,
                                expected: "a text label",
                            });
                        }
                        (action_field, FieldValue::Action(act)) => {
                            let slot = match action_field {
                                FieldKey::Commit => &mut spec.commit,
                                FieldKey::Rollback => &mut spec.rollback,
                                _ => &mut spec.panic,
                            };
                            if slot.replace(act).is_some() {
                                return Err(MalformedStepSpec::DuplicateField { index, key });
                            }
                        }
                        (_, FieldValue::Text(_)) => {
                            return Err(MalformedStepSpec::FieldShape {
                                index,
                                key,
                                expected: "an action",
                            });
                        }
                    }
                }
                Ok(spec)
            }
        }
    }
}

#[derive(Clone, Copy)]
enum FieldKey {
    Label,
    Commit,
    Rollback,
    Panic,
}

/// Normalize a descriptor sequence into canonical step records.
///
/// # Errors
///
/// Returns [`MalformedStepSpec`] for the first descriptor with an
/// unsupported shape.
pub(crate) fn normalize<Ctx, E>(
    descriptors: Vec<StepDescriptor<Ctx, E>>,
) -> Result<Vec<StepSpec<Ctx, E>>, MalformedStepSpec> {
    descriptors
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| descriptor.into_spec(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::action;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct TestError(&'static str);

    type Descriptor = StepDescriptor<(), TestError>;

    #[test]
    fn ordered_shape_maps_positionally() -> anyhow::Result<()> {
        let descriptor: Descriptor = StepDescriptor::ordered(
            Some("create user"),
            Some(action(|_cx| Ok(()))),
            Some(action(|_cx| Ok(()))),
            None,
        );

        let spec = normalize(vec![descriptor])?.remove(0);

        assert_eq!(spec.label(), Some("create user"));
        assert!(spec.has_commit());
        assert!(spec.has_rollback());
        assert!(!spec.has_panic());
        Ok(())
    }

    #[test]
    fn keyed_shape_accepts_any_subset() -> anyhow::Result<()> {
        let descriptor: Descriptor =
            StepDescriptor::keyed(vec![("commit", FieldValue::action(|_cx| Ok(())))]);

        let spec = normalize(vec![descriptor])?.remove(0);

        assert!(spec.label().is_none());
        assert!(spec.has_commit());
        assert!(!spec.has_rollback());
        assert!(!spec.has_panic());
        Ok(())
    }

    #[test]
    fn keyed_label_field_carries_text() -> anyhow::Result<()> {
        let descriptor: Descriptor = StepDescriptor::keyed(vec![
            ("label", FieldValue::text("send email")),
            ("rollback", FieldValue::action(|_cx| Ok(()))),
        ]);

        let spec = normalize(vec![descriptor])?.remove(0);

        assert_eq!(spec.label(), Some("send email"));
        assert!(spec.has_rollback());
        Ok(())
    }

    #[test]
    fn empty_shapes_normalize_to_no_op_steps() -> anyhow::Result<()> {
        let descriptors: Vec<Descriptor> = vec![
            StepDescriptor::ordered(None, None, None, None),
            StepDescriptor::keyed(Vec::<(String, _)>::new()),
        ];

        let specs = normalize(descriptors)?;

        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| !s.has_commit() && !s.has_rollback()));
        Ok(())
    }

    #[test]
    fn unknown_key_fails_with_offending_index() {
        let descriptors: Vec<Descriptor> = vec![
            StepDescriptor::ordered(None, Some(action(|_cx| Ok(()))), None, None),
            StepDescriptor::keyed(vec![("comit", FieldValue::action(|_cx| Ok(())))]),
        ];

        let error = normalize(descriptors).expect_err("unknown key must be rejected");

        assert_eq!(
            error,
            MalformedStepSpec::UnknownField {
                index: 1,
                key: "comit".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let descriptors: Vec<Descriptor> = vec![StepDescriptor::keyed(vec![
            ("commit", FieldValue::action(|_cx| Ok(()))),
            ("commit", FieldValue::action(|_cx| Ok(()))),
        ])];

        let error = normalize(descriptors).expect_err("duplicate key must be rejected");

        assert_eq!(
            error,
            MalformedStepSpec::DuplicateField {
                index: 0,
                key: "commit".to_string(),
            }
        );
    }

    #[test]
    fn text_in_action_field_is_rejected() {
        let descriptors: Vec<Descriptor> =
            vec![StepDescriptor::keyed(vec![(
                "rollback",
                FieldValue::text("not an action"),
            )])];

        let error = normalize(descriptors).expect_err("text in action field must be rejected");

        assert!(matches!(
            error,
            MalformedStepSpec::FieldShape { index: 0, ref key, .. } if key == "rollback"
        ));
    }

    #[test]
    fn action_in_label_field_is_rejected() {
        let descriptors: Vec<Descriptor> = vec![StepDescriptor::keyed(vec![(
            "label",
            FieldValue::action(|_cx| Ok(())),
        )])];

        let error = normalize(descriptors).expect_err("action in label field must be rejected");

        assert!(matches!(
            error,
            MalformedStepSpec::FieldShape { index: 0, ref key, .. } if key == "label"
        ));
    }

    #[test]
    fn normalization_preserves_input_order() -> anyhow::Result<()> {
        let descriptors: Vec<Descriptor> = vec![
            StepDescriptor::ordered(Some("first"), None, None, None),
            StepDescriptor::keyed(vec![("label", FieldValue::text("second"))]),
            StepDescriptor::ordered(Some("third"), None, None, None),
        ];

        let specs = normalize(descriptors)?;

        let labels: Vec<_> = specs.iter().map(StepSpec::label).collect();
        assert_eq!(labels, vec![Some("first"), Some("second"), Some("third")]);
        Ok(())
    }
}
