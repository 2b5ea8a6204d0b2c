use super::plan::DayPlan;
use serde::{Deserialize, Serialize};

/// Quality of a parse outcome.
///
/// `Degraded` is a first-class terminal state: the data is still populated
/// (via the fallback or emergency path) but callers may surface an
/// "auto-generated" notice from [`ParseResult::warnings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseQuality {
    Full,
    Degraded,
}

/// Metadata recorded alongside every parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseMetadata {
    /// True only when the JSON-structured plugin produced the winning result.
    pub structured_hit: bool,
    pub parse_time_ms: u64,
}

/// Result of parsing one itinerary text.
///
/// Invariant: `data` is never empty on return. `quality == Degraded` signals
/// reduced fidelity, never absence of data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub quality: ParseQuality,
    pub data: Vec<DayPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,
    pub metadata: ParseMetadata,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Create a full-quality result.
    pub fn full(
        data: Vec<DayPlan>,
        parser: impl Into<String>,
        metadata: ParseMetadata,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            quality: ParseQuality::Full,
            data,
            parser: Some(parser.into()),
            metadata,
            errors: Vec::new(),
            warnings,
        }
    }

    /// Create a degraded result. `data` must still be populated by the
    /// caller; the robust wrapper guarantees this.
    pub fn degraded(
        data: Vec<DayPlan>,
        errors: Vec<String>,
        metadata: ParseMetadata,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            quality: ParseQuality::Degraded,
            data,
            parser: None,
            metadata,
            errors,
            warnings,
        }
    }

    /// Whether the primary parsing path succeeded.
    pub fn is_success(&self) -> bool {
        self.quality == ParseQuality::Full
    }

    pub fn day_count(&self) -> usize {
        self.data.len()
    }

    pub fn segment_count(&self) -> usize {
        self.data.iter().map(|d| d.segments.len()).sum()
    }

    pub fn activity_count(&self) -> usize {
        self.data.iter().map(|d| d.activity_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_flags() {
        let result = ParseResult::full(Vec::new(), "JsonPlugin", ParseMetadata::default(), vec![]);
        assert!(result.is_success());
        assert_eq!(result.parser.as_deref(), Some("JsonPlugin"));

        let degraded = ParseResult::degraded(
            Vec::new(),
            vec!["empty input".to_string()],
            ParseMetadata::default(),
            vec![],
        );
        assert!(!degraded.is_success());
        assert_eq!(degraded.errors.len(), 1);
    }

    #[test]
    fn test_quality_serde() {
        let json = serde_json::to_string(&ParseQuality::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }
}
