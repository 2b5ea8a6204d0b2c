//! Parse orchestration: runs every capable plugin, validates candidates and
//! keeps the best-scoring result.

use crate::error::{ParseError, Result};
use crate::normalizer::convert_to_legacy;
use crate::plugins::{JsonPlugin, ParserRegistry};
use crate::schema::validate_day_plans;
use crate::types::{DayPlan, LegacyDayActivity, ParseContext, ParseMetadata, ParseResult};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Warning attached when only the keyword-scanning fallback recognized the
/// text.
pub const HEURISTIC_WARNING: &str =
    "no standard time format detected, segments were inferred heuristically";

/// Coordinates the plugin registry: probes, parses, validates, scores.
///
/// The registry is constructor-injected so tests can run against a reduced
/// or custom plugin set.
#[derive(Debug)]
pub struct Orchestrator {
    registry: ParserRegistry,
}

impl Orchestrator {
    pub fn new(registry: ParserRegistry) -> Self {
        Self { registry }
    }

    /// Orchestrator over the five production plugins.
    pub fn with_default_plugins() -> Self {
        Self::new(ParserRegistry::with_default_plugins())
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Parse itinerary text into canonical day plans.
    ///
    /// Every capable plugin gets to try; candidates failing validation are
    /// dropped. Among valid candidates the highest score wins, and on a tie
    /// the earlier (higher-priority) plugin keeps the win.
    pub async fn parse(&self, raw: &str, context: &ParseContext) -> Result<ParseResult> {
        if raw.trim().is_empty() {
            return Err(ParseError::EmptyInput("itinerary text is empty".to_string()));
        }

        let started = Instant::now();
        let capable = self.registry.get_capable(raw);
        if capable.is_empty() {
            return Err(ParseError::NoCapableParser(
                "no plugin recognizes this text".to_string(),
            ));
        }
        debug!(
            target: "timeline::orchestrator",
            candidates = capable.len(),
            "probing complete"
        );

        let mut best: Option<(Vec<DayPlan>, &'static str, u32, Vec<String>)> = None;
        let mut attempt_errors = Vec::new();

        for plugin in capable {
            let candidate = match plugin.try_parse(raw, context).await {
                Ok(Some(plans)) => plans,
                Ok(None) => {
                    debug!(
                        target: "timeline::orchestrator",
                        plugin = plugin.name(),
                        "format not recognized"
                    );
                    continue;
                }
                Err(err) => {
                    warn!(
                        target: "timeline::orchestrator",
                        plugin = plugin.name(),
                        error = %err,
                        "plugin failed"
                    );
                    attempt_errors.push(format!("{}: {}", plugin.name(), err));
                    continue;
                }
            };

            let report = validate_day_plans(&candidate);
            if !report.is_valid() {
                debug!(
                    target: "timeline::orchestrator",
                    plugin = plugin.name(),
                    errors = ?report.errors,
                    "candidate rejected by validation"
                );
                attempt_errors.push(format!("{}: {}", plugin.name(), report.errors.join("; ")));
                continue;
            }

            let score = plugin.score(&candidate);
            debug!(
                target: "timeline::orchestrator",
                plugin = plugin.name(),
                score,
                days = candidate.len(),
                "valid candidate"
            );
            // strict comparison: ties go to the earlier, higher-priority plugin
            if best.as_ref().map(|(_, _, s, _)| score > *s).unwrap_or(true) {
                best = Some((candidate, plugin.name(), score, report.warnings));
            }
        }

        let Some((data, parser, score, mut warnings)) = best else {
            return Err(ParseError::Validation(if attempt_errors.is_empty() {
                "no plugin produced a usable result".to_string()
            } else {
                attempt_errors.join(" | ")
            }));
        };

        if parser == crate::plugins::HeuristicPlugin::NAME {
            warnings.push(HEURISTIC_WARNING.to_string());
        }

        let metadata = ParseMetadata {
            structured_hit: parser == JsonPlugin::NAME,
            parse_time_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            target: "timeline::orchestrator",
            parser,
            score,
            days = data.len(),
            elapsed_ms = metadata.parse_time_ms,
            session = %context.session_id,
            "parse complete"
        );
        Ok(ParseResult::full(data, parser, metadata, warnings))
    }

    /// Parse and flatten into the legacy per-activity shape.
    pub async fn parse_to_legacy(
        &self,
        raw: &str,
        context: &ParseContext,
    ) -> Result<Vec<LegacyDayActivity>> {
        let result = self.parse(raw, context).await?;
        Ok(convert_to_legacy(&result.data))
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::with_default_plugins()
    }
}
