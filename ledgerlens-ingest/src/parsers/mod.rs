//! Custodian-specific format parsers.
//!
//! Each pairs a conjunctive keyword detector with a line-oriented extractor.
//! Registration order in the registry is detection priority: the two
//! Northwestern Mutual products carry the narrowest detectors and go first.

pub mod etrade;
pub mod fidelity;
pub mod nm_annuity;
pub mod nm_cash;
pub mod robinhood;
pub mod schwab;

pub use etrade::EtradeParser;
pub use fidelity::FidelityParser;
pub use nm_annuity::NorthwesternAnnuityParser;
pub use nm_cash::NorthwesternCashParser;
pub use robinhood::RobinhoodParser;
pub use schwab::SchwabParser;
