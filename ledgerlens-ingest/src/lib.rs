//! ledgerlens-ingest: statement format detection and extraction.
//!
//! Six custodian-specific parsers implement [`StatementParser`]; the
//! [`ParserRegistry`] tries their detectors in priority order and routes to
//! the first match, falling back to [`UniversalFallbackParser`] (model tier,
//! then heuristic regex) so every input yields a canonical record.

pub mod contract;
pub mod fallback;
pub mod model;
pub mod parsers;
pub mod registry;
pub mod scan;

pub use contract::StatementParser;
pub use fallback::UniversalFallbackParser;
pub use model::{ApiModelExtractor, ModelExtractor};
pub use registry::ParserRegistry;
