//! Universal fallback parser: the registry's terminal catch-all.
//!
//! Tier 1 asks an injected extraction model for structured JSON and maps it
//! defensively into the canonical record. Tier 2 is a pure regex scan for
//! generic "TICKER qty value" rows. Any Tier 1 failure (no client, HTTP
//! error, timeout, unusable JSON) demotes to Tier 2, so `parse` is total.

use anyhow::{Context, Result};
use ledgerlens_core::{ParsedPosition, ParsedStatement, PipelineConfig, meta};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

use crate::contract::StatementParser;
use crate::model::ModelExtractor;
use crate::scan;

pub const LLM_PARSER_ID: &str = "llm_fallback";
pub const HEURISTIC_PARSER_ID: &str = "heuristic_fallback";

const EXTRACTION_PROMPT: &str = "You extract holdings from brokerage statement text. \
Respond with a single JSON object and no other text, shaped as: \
{\"custodian\": string, \"account_number\": string, \"total_value\": number, \
\"positions\": [{\"ticker\": string, \"name\": string, \"quantity\": number, \
\"market_value\": number}]}. Omit fields you cannot find.";

pub struct UniversalFallbackParser {
    model: Option<Box<dyn ModelExtractor>>,
    config: PipelineConfig,
}

impl UniversalFallbackParser {
    pub fn new(config: PipelineConfig, model: Option<Box<dyn ModelExtractor>>) -> Self {
        Self { model, config }
    }

    /// Fallback with the model tier disabled, regex heuristics only.
    pub fn heuristic_only(config: PipelineConfig) -> Self {
        Self::new(config, None)
    }

    fn model_tier(&self, model: &dyn ModelExtractor, text: &str) -> Result<ParsedStatement> {
        let input = truncate_chars(text, self.config.model_char_budget);
        let raw = model.extract(EXTRACTION_PROMPT, input)?;
        let json = extract_json_object(&raw)
            .context("model response contained no JSON object")?;
        let payload: ModelPayload =
            serde_json::from_str(json).context("model JSON did not deserialize")?;

        let mut stmt = ParsedStatement::new(self.custodian_name());
        if let Some(custodian) = payload.custodian.filter(|c| !c.trim().is_empty()) {
            stmt.custodian = custodian.trim().to_string();
        }
        if let Some(account) = payload.account_number {
            stmt.account_number = account.trim().to_string();
        }
        if let Some(total) = payload.total_value.as_ref().and_then(decimal_from_value) {
            stmt.total_value = total;
        }
        for p in payload.positions {
            let ticker = p.ticker.filter(|t| !t.trim().is_empty());
            stmt.positions.push(ParsedPosition {
                security_name: p
                    .name
                    .or_else(|| ticker.clone())
                    .unwrap_or_default(),
                ticker,
                quantity: p
                    .quantity
                    .as_ref()
                    .and_then(decimal_from_value)
                    .unwrap_or_default(),
                market_value: p
                    .market_value
                    .as_ref()
                    .and_then(decimal_from_value)
                    .unwrap_or_default(),
                ..Default::default()
            });
        }

        stmt.metadata
            .insert(meta::PARSER.to_string(), LLM_PARSER_ID.to_string());
        stmt.metadata.insert(
            meta::CONFIDENCE.to_string(),
            format!("{:.2}", self.config.model_confidence),
        );
        stmt.reconcile_total();
        Ok(stmt)
    }

    fn heuristic_tier(&self, text: &str) -> ParsedStatement {
        let mut stmt = ParsedStatement::new(self.custodian_name());

        for line in text.lines() {
            if let Some((ticker, quantity, market_value)) = scan::ticker_position(line) {
                stmt.positions.push(ParsedPosition {
                    ticker: Some(ticker.to_string()),
                    security_name: ticker.to_string(),
                    quantity,
                    market_value,
                    ..Default::default()
                });
            }
        }

        stmt.metadata
            .insert(meta::PARSER.to_string(), HEURISTIC_PARSER_ID.to_string());
        stmt.metadata.insert(
            meta::CONFIDENCE.to_string(),
            format!("{:.2}", self.config.heuristic_confidence),
        );
        stmt.reconcile_total();
        stmt
    }
}

impl StatementParser for UniversalFallbackParser {
    fn custodian_name(&self) -> &'static str {
        "Unknown"
    }

    /// Terminal catch-all: claims everything.
    fn can_handle(&self, _text: &str) -> bool {
        true
    }

    fn parse(&self, text: &str) -> ParsedStatement {
        if let Some(model) = &self.model {
            match self.model_tier(model.as_ref(), text) {
                Ok(stmt) => return stmt,
                Err(e) => {
                    log::warn!("model-assisted extraction failed, demoting to heuristics: {e:#}");
                }
            }
        }
        self.heuristic_tier(text)
    }
}

/// Char-boundary-safe prefix of at most `budget` characters.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Outermost `{` .. `}` slice, tolerating explanatory prose around the JSON.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn decimal_from_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => scan::parse_money(s),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct ModelPayload {
    #[serde(default)]
    custodian: Option<String>,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default)]
    total_value: Option<Value>,
    #[serde(default)]
    positions: Vec<ModelPosition>,
}

#[derive(Debug, Deserialize)]
struct ModelPosition {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<Value>,
    #[serde(default)]
    market_value: Option<Value>,
}
