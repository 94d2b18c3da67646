//! The capability contract every format handler implements.

use ledgerlens_core::ParsedStatement;

/// A statement format handler: detection plus extraction.
///
/// Implementations are stateless and read-only after construction, so the
/// registry can be shared across threads without locking.
pub trait StatementParser: Send + Sync {
    /// Stable identity used for logging and registration-order audits.
    /// Also the `custodian` field of every statement this parser returns.
    fn custodian_name(&self) -> &'static str;

    /// Cheap substring/regex detection. Must never panic. Detectors are
    /// conjunctive so at most one specialized parser claims a real document;
    /// a false negative only costs a trip through the fallback.
    fn can_handle(&self, text: &str) -> bool;

    /// Extraction. Total by contract: never panics, never errors. Fields the
    /// text does not yield stay at their defaults, and the total is
    /// reconciled from positions when no explicit total line matched.
    fn parse(&self, text: &str) -> ParsedStatement;
}
