//! Outcome of a best-effort filesystem probe

/// Result of a probe that never fails outright
///
/// `Degraded` carries the fallback value that was used together with the
/// reason the real value could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The value was read successfully
    Ok(T),
    /// The probe fell back to a default value
    Degraded {
        /// Fallback value
        value: T,
        /// Why the probe degraded
        reason: String,
    },
}

impl<T> Probe<T> {
    /// Build a degraded outcome
    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Probe::Degraded {
            value,
            reason: reason.into(),
        }
    }

    /// Borrow the value, degraded or not
    pub fn value(&self) -> &T {
        match self {
            Probe::Ok(value) | Probe::Degraded { value, .. } => value,
        }
    }

    /// Take the value, degraded or not
    pub fn into_value(self) -> T {
        match self {
            Probe::Ok(value) | Probe::Degraded { value, .. } => value,
        }
    }

    /// Whether the probe fell back
    pub fn is_degraded(&self) -> bool {
        matches!(self, Probe::Degraded { .. })
    }

    /// Degradation reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Probe::Ok(_) => None,
            Probe::Degraded { reason, .. } => Some(reason),
        }
    }

    /// Map the carried value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Ok(value) => Probe::Ok(f(value)),
            Probe::Degraded { value, reason } => Probe::Degraded {
                value: f(value),
                reason,
            },
        }
    }
}
