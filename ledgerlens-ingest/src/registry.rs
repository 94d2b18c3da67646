//! Ordered detection-by-trial routing.
//!
//! Registration order is detection priority: the narrowest detectors (the
//! two Northwestern Mutual products) go first so a generic detector can
//! never steal their documents. Built once at startup, immutable after,
//! safe to share across threads.

use ledgerlens_core::{ParsedStatement, PipelineConfig};

use crate::contract::StatementParser;
use crate::fallback::UniversalFallbackParser;
use crate::model::{ApiModelExtractor, ModelExtractor};
use crate::parsers::{
    EtradeParser, FidelityParser, NorthwesternAnnuityParser, NorthwesternCashParser,
    RobinhoodParser, SchwabParser,
};

pub struct ParserRegistry {
    parsers: Vec<Box<dyn StatementParser>>,
    fallback: Box<dyn StatementParser>,
}

impl ParserRegistry {
    pub fn new(parsers: Vec<Box<dyn StatementParser>>, fallback: Box<dyn StatementParser>) -> Self {
        Self { parsers, fallback }
    }

    /// Production registry: all six custodian parsers in priority order,
    /// with the model tier enabled when a credential is present in the
    /// environment.
    pub fn with_default_parsers(config: PipelineConfig) -> Self {
        let model = ApiModelExtractor::from_env(&config)
            .map(|m| Box::new(m) as Box<dyn ModelExtractor>);
        let fallback = Box::new(UniversalFallbackParser::new(config, model));
        Self::new(
            vec![
                Box::new(NorthwesternAnnuityParser),
                Box::new(NorthwesternCashParser),
                Box::new(FidelityParser),
                Box::new(SchwabParser),
                Box::new(EtradeParser),
                Box::new(RobinhoodParser),
            ],
            fallback,
        )
    }

    /// Routes `text` to the first parser whose detector claims it, or to
    /// the fallback. Never fails.
    pub fn detect_and_parse(&self, text: &str) -> ParsedStatement {
        for parser in &self.parsers {
            if parser.can_handle(text) {
                log::debug!("routing statement to {}", parser.custodian_name());
                return parser.parse(text);
            }
        }
        log::debug!("no detector matched; routing to fallback");
        self.fallback.parse(text)
    }

    /// Registered custodian names in priority order (audit/logging aid).
    pub fn custodians(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.custodian_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_core::meta;
    use rust_decimal_macros::dec;

    /// Registry with the model tier off, independent of the environment.
    fn heuristic_registry() -> ParserRegistry {
        let config = PipelineConfig::default();
        ParserRegistry::new(
            vec![
                Box::new(NorthwesternAnnuityParser),
                Box::new(NorthwesternCashParser),
                Box::new(FidelityParser),
                Box::new(SchwabParser),
                Box::new(EtradeParser),
                Box::new(RobinhoodParser),
            ],
            Box::new(UniversalFallbackParser::heuristic_only(config)),
        )
    }

    #[test]
    fn test_routes_northwestern_annuity_contract() {
        let text = "Northwestern Mutual\nVariable Annuity Statement\n\
                    Contract Number: 23330694\nContract Value: $42,065.30\n";
        let stmt = heuristic_registry().detect_and_parse(text);
        assert_eq!(stmt.custodian, "Northwestern Mutual");
        assert_eq!(stmt.account_number, "23330694");
        assert_eq!(stmt.total_value, dec!(42065.30));
    }

    #[test]
    fn test_routes_robinhood_positions() {
        let text = "Robinhood\nMenlo Park, CA\nAAPL 10.5 1,234.50\n";
        let stmt = heuristic_registry().detect_and_parse(text);
        assert_eq!(stmt.custodian, "Robinhood");
        assert_eq!(stmt.positions.len(), 1);
        assert_eq!(stmt.positions[0].ticker.as_deref(), Some("AAPL"));
    }

    #[test]
    fn test_unrecognized_text_uses_heuristic_fallback() {
        let text = "Some Credit Union Statement\nXYZ 5 500.00\n";
        let stmt = heuristic_registry().detect_and_parse(text);
        assert_eq!(stmt.custodian, "Unknown");
        assert_eq!(
            stmt.metadata.get(meta::PARSER).map(String::as_str),
            Some("heuristic_fallback")
        );
        assert_eq!(stmt.positions.len(), 1);
        assert_eq!(stmt.positions[0].market_value, dec!(500.00));
    }

    #[test]
    fn test_first_registered_parser_wins() {
        struct Claiming(&'static str);
        impl StatementParser for Claiming {
            fn custodian_name(&self) -> &'static str {
                self.0
            }
            fn can_handle(&self, _text: &str) -> bool {
                true
            }
            fn parse(&self, _text: &str) -> ParsedStatement {
                ParsedStatement::new(self.0)
            }
        }

        let registry = ParserRegistry::new(
            vec![Box::new(Claiming("First")), Box::new(Claiming("Second"))],
            Box::new(UniversalFallbackParser::heuristic_only(PipelineConfig::default())),
        );
        let stmt = registry.detect_and_parse("anything");
        assert_eq!(stmt.custodian, "First");
    }

    #[test]
    fn test_custodian_name_matches_parse_result() {
        let fixtures: &[(&str, &str)] = &[
            ("Northwestern Mutual Variable Annuity\n", "Northwestern Mutual"),
            (
                "Northwestern Mutual Cash Management\n",
                "Northwestern Mutual Cash Management",
            ),
            ("Fidelity Investments brokerage\n", "Fidelity"),
            ("Schwab One brokerage\n", "Charles Schwab"),
            ("E*TRADE from Morgan Stanley\n", "E*TRADE"),
            ("Robinhood Securities, Menlo Park\n", "Robinhood"),
        ];
        let registry = heuristic_registry();
        for (text, expected) in fixtures {
            let stmt = registry.detect_and_parse(text);
            assert_eq!(&stmt.custodian, expected, "fixture: {text:?}");
        }
    }

    #[test]
    fn test_totality_on_hostile_inputs() {
        let registry = heuristic_registry();
        let huge = "A".repeat(100_000);
        for text in ["", " ", "\n\n\n", "総計 ¥1,000", huge.as_str()] {
            let stmt = registry.detect_and_parse(text);
            assert_eq!(stmt.custodian, "Unknown", "input: {:?}", &text[..text.len().min(20)]);
        }
    }

    #[test]
    fn test_idempotence() {
        let registry = heuristic_registry();
        let text = "Robinhood Securities, Menlo Park\nAAPL 10.5 1,234.50\nBTC 0.25 15,750.00\n";
        assert_eq!(registry.detect_and_parse(text), registry.detect_and_parse(text));
    }

    #[test]
    fn test_priority_order_is_narrow_first() {
        let registry = heuristic_registry();
        assert_eq!(
            registry.custodians(),
            vec![
                "Northwestern Mutual",
                "Northwestern Mutual Cash Management",
                "Fidelity",
                "Charles Schwab",
                "E*TRADE",
                "Robinhood",
            ]
        );
    }
}
