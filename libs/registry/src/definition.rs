//! Signal definition metadata
//!
//! One [`SignalDefinition`] per known signal name: default value, validation
//! rule, optional normalization step, writability. Definitions are built
//! once at process start and never mutated; the access manager looks them up
//! by name for every read and write.

use crate::validate::{Transform, ValidationRule};
use vehicle_types::{AccessDirection, SignalOverride, SignalValue};

/// Context handed to a definition's access hook after a read resolves or a
/// write commits.
#[derive(Debug)]
pub struct AccessContext<'a> {
    pub direction: AccessDirection,
    /// The override the access landed on, if one exists.
    pub doc: Option<&'a SignalOverride>,
    /// The pre-write override, for updates.
    pub old_doc: Option<&'a SignalOverride>,
    /// The value that was resolved or written.
    pub value: &'a SignalValue,
}

/// Hook invoked after a signal access. A pure extension point: the current
/// catalog attaches no behavior to it.
pub type AccessHook = fn(&AccessContext<'_>);

/// Static metadata for one named vehicle signal.
#[derive(Debug, Clone)]
pub struct SignalDefinition {
    /// Unique lowercase `[a-z0-9_]+` identifier.
    pub name: &'static str,
    /// Value returned when no override exists for a vehicle.
    pub default: SignalValue,
    /// External writes to non-writable signals fail with a read-only error.
    pub writable: bool,
    /// Accept/reject rule applied to every candidate value.
    pub rule: ValidationRule,
    /// Normalization applied after validation, before persistence. Signals
    /// without one store the validated raw string unchanged.
    pub transform: Option<Transform>,
    /// Post-access extension hook.
    pub on_access: Option<AccessHook>,
}

impl SignalDefinition {
    /// Validate a raw candidate value against this signal's rule.
    pub fn validate(&self, raw: &str) -> Result<(), ValidationError> {
        match self.rule.check(raw, self.name) {
            None => Ok(()),
            Some(message) => Err(ValidationError { message }),
        }
    }

    /// Produce the canonical stored value for an already-validated raw
    /// input. Total and idempotent.
    pub fn transform(&self, raw: &str) -> SignalValue {
        match self.transform {
            Some(t) => t.apply(raw),
            None => SignalValue::Str(raw.to_string()),
        }
    }

    /// Run the access hook, if the definition declares one.
    pub fn notify_access(&self, ctx: &AccessContext<'_>) {
        if let Some(hook) = self.on_access {
            hook(ctx);
        }
    }
}

/// A rejected candidate value. The message is the validator's human-readable
/// text, surfaced verbatim as the write failure reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untransformed_signal_stores_raw_value() {
        let def = SignalDefinition {
            name: "trunk",
            default: SignalValue::from("closed"),
            writable: true,
            rule: ValidationRule::OneOf(&["open", "closed"]),
            transform: None,
            on_access: None,
        };
        assert_eq!(def.transform("open"), SignalValue::from("open"));
    }

    #[test]
    fn validation_error_displays_message_verbatim() {
        let def = SignalDefinition {
            name: "trunk",
            default: SignalValue::from("closed"),
            writable: true,
            rule: ValidationRule::OneOf(&["open", "closed"]),
            transform: None,
            on_access: None,
        };
        let err = def.validate("ajar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can only use the following value(s) for 'trunk': open, closed"
        );
    }
}
