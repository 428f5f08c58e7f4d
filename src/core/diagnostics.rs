use std::fmt;

/// A non-fatal configuration warning raised while computing a profile.
///
/// Diagnostics never change the computation; they point at a probable
/// mismatch between the join mode the caller asked for and the data.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// AB-join requested, but `T_A` and `T_B` are numerically identical.
    AbJoinOnEqualArrays,
    /// Self-join requested, but `T_A` and `T_B` differ.
    SelfJoinOnDistinctArrays,
    /// The profile is dominated by near-zero distances.
    DistancesTooSmall { threshold: f64, mean: f64 },
}

impl Diagnostic {
    /// Suggested remedy for the caller.
    pub fn hint(&self) -> &'static str {
        match self {
            Diagnostic::AbJoinOnEqualArrays => "Try setting `ignore_trivial = true`.",
            Diagnostic::SelfJoinOnDistinctArrays => "Try setting `ignore_trivial = false`.",
            Diagnostic::DistancesTooSmall { .. } => {
                "For a self-join, try setting `ignore_trivial = true`."
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AbJoinOnEqualArrays => {
                f.write_str("Arrays T_A, T_B are equal, which implies a self-join.")
            }
            Diagnostic::SelfJoinOnDistinctArrays => {
                f.write_str("Arrays T_A, T_B are not equal, which implies an AB-join.")
            }
            Diagnostic::DistancesTooSmall { threshold, .. } => {
                write!(f, "A large number of values are smaller than {threshold}.")
            }
        }
    }
}

/// Receiver for diagnostics emitted by the profile driver.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics for later inspection.
impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogSink {
    level: log::Level,
}

impl LogSink {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(log::Level::Warn)
    }
}

impl DiagnosticSink for LogSink {
    fn emit(&mut self, diagnostic: Diagnostic) {
        log::log!(self.level, "{diagnostic}");
        log::log!(self.level, "{}", diagnostic.hint());
    }
}

/// Drops every diagnostic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&mut self, _diagnostic: Diagnostic) {}
}
