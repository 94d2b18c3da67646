//! Pipeline-wide tunables, gathered in one place instead of scattered
//! literals inside the parsers.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Statement text sent to the extraction model is truncated to this many
    /// characters to cap request cost and context size.
    pub model_char_budget: usize,
    /// Hard timeout on the single extraction-model request. No retries.
    pub model_timeout: Duration,
    /// Confidence stamped on model-assisted results.
    pub model_confidence: f64,
    /// Confidence stamped on heuristic-regex results.
    pub heuristic_confidence: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_char_budget: 6000,
            model_timeout: Duration::from_secs(20),
            model_confidence: 0.85,
            heuristic_confidence: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.model_char_budget, 6000);
        assert_eq!(cfg.model_timeout, Duration::from_secs(20));
        assert!(cfg.model_confidence > cfg.heuristic_confidence);
    }
}
