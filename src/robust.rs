//! Never-fail wrapper around the orchestrator.
//!
//! The contract here is total: every call returns a populated result. The
//! ladder is orchestrator -> forced heuristic fallback -> synthesized
//! emergency itinerary, with quality degrading at each rung.

use crate::orchestrator::{Orchestrator, HEURISTIC_WARNING};
use crate::plugins::{HeuristicPlugin, ParserPlugin};
use crate::types::{
    Activity, DayPlan, ParseContext, ParseMetadata, ParseResult, Period, Segment,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Warning attached to synthesized emergency itineraries.
pub const EMERGENCY_WARNING: &str = "itinerary was auto-generated, please adjust manually";

const SLOW_PARSE_MS: u64 = 100;

/// Cumulative counters across the lifetime of one parser instance.
#[derive(Debug, Default, Serialize)]
pub struct ParserStats {
    pub total_parses: u64,
    pub structured_hits: u64,
    pub fallback_parses: u64,
    pub emergency_parses: u64,
}

/// Parser facade that always produces day plans.
#[derive(Debug, Default)]
pub struct RobustTimelineParser {
    orchestrator: Orchestrator,
    total_parses: AtomicU64,
    structured_hits: AtomicU64,
    fallback_parses: AtomicU64,
    emergency_parses: AtomicU64,
}

impl RobustTimelineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a custom orchestrator (reduced plugin set, test doubles).
    pub fn with_orchestrator(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            ..Self::default()
        }
    }

    /// Parse itinerary text; cannot fail. Degraded results carry the errors
    /// that forced the downgrade.
    pub async fn parse(&self, raw: &str, context: &ParseContext) -> ParseResult {
        self.total_parses.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let result = match self.orchestrator.parse(raw, context).await {
            Ok(result) => {
                if result.metadata.structured_hit {
                    self.structured_hits.fetch_add(1, Ordering::Relaxed);
                }
                result
            }
            Err(err) => {
                warn!(
                    target: "timeline::robust",
                    error = %err,
                    code = err.error_code(),
                    "orchestrated parse failed, degrading"
                );
                self.degrade(raw, context, err.to_string(), started).await
            }
        };

        let elapsed = started.elapsed().as_millis() as u64;
        if elapsed > SLOW_PARSE_MS {
            warn!(target: "timeline::robust", elapsed_ms = elapsed, "slow parse");
        }
        result
    }

    /// Fallback ladder: force the heuristic plugin, then synthesize.
    async fn degrade(
        &self,
        raw: &str,
        context: &ParseContext,
        error: String,
        started: Instant,
    ) -> ParseResult {
        // the probe is skipped on purpose: even short text gets one attempt
        if !raw.trim().is_empty() {
            let heuristic = HeuristicPlugin::new();
            if let Ok(Some(plans)) = heuristic.try_parse(raw, context).await {
                if !plans.is_empty() {
                    self.fallback_parses.fetch_add(1, Ordering::Relaxed);
                    info!(
                        target: "timeline::robust",
                        days = plans.len(),
                        "heuristic fallback recovered a result"
                    );
                    return ParseResult::degraded(
                        plans,
                        vec![error],
                        ParseMetadata {
                            structured_hit: false,
                            parse_time_ms: started.elapsed().as_millis() as u64,
                        },
                        vec![HEURISTIC_WARNING.to_string()],
                    );
                }
            }
        }

        self.emergency_parses.fetch_add(1, Ordering::Relaxed);
        warn!(
            target: "timeline::robust",
            destination = %context.destination,
            days = context.total_days,
            "synthesizing emergency itinerary"
        );
        ParseResult::degraded(
            emergency_plan(context),
            vec![error],
            ParseMetadata {
                structured_hit: false,
                parse_time_ms: started.elapsed().as_millis() as u64,
            },
            vec![EMERGENCY_WARNING.to_string()],
        )
    }

    /// Snapshot of the lifetime counters.
    pub fn parser_stats(&self) -> ParserStats {
        ParserStats {
            total_parses: self.total_parses.load(Ordering::Relaxed),
            structured_hits: self.structured_hits.load(Ordering::Relaxed),
            fallback_parses: self.fallback_parses.load(Ordering::Relaxed),
            emergency_parses: self.emergency_parses.load(Ordering::Relaxed),
        }
    }
}

/// Minimal but valid free-roam itinerary built purely from the request
/// context. Always exactly one day, whatever `total_days` asked for.
fn emergency_plan(context: &ParseContext) -> Vec<DayPlan> {
    let title = format!("{}自由行", context.destination);
    let segments = vec![Segment {
        period: Period::Morning,
        time: "09:00-18:00".to_string(),
        activities: vec![Activity {
            title: "自由活动".to_string(),
            description: format!("根据个人喜好自由安排{}的行程", context.destination),
            cost: Some(300),
            duration: "全天".to_string(),
            tips: vec!["可咨询当地游客中心获取路线建议".to_string()],
            location: Some(context.destination.clone()),
            icon: "🗺️".to_string(),
        }],
    }];
    vec![crate::normalizer::build_day_plan(1, title, segments, context)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParseQuality;

    #[tokio::test]
    async fn test_empty_input_yields_emergency_plan() {
        let parser = RobustTimelineParser::new();
        let context = ParseContext::new("大理", 1);
        let result = parser.parse("", &context).await;
        assert_eq!(result.quality, ParseQuality::Degraded);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].title, "大理自由行");
        assert_eq!(result.data[0].segments[0].time, "09:00-18:00");
        assert_eq!(result.data[0].segments[0].activities[0].cost, Some(300));
        assert!(result
            .errors
            .iter()
            .any(|e| e.to_lowercase().contains("empty input")));
        assert_eq!(parser.parser_stats().emergency_parses, 1);
    }

    #[tokio::test]
    async fn test_emergency_is_one_day_regardless_of_request() {
        let parser = RobustTimelineParser::new();
        let context = ParseContext::new("丽江", 3);
        let result = parser.parse("!!", &context).await;
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].day, 1);
        assert!(result.warnings.iter().any(|w| w == EMERGENCY_WARNING));
    }

    #[tokio::test]
    async fn test_empty_multiday_input_still_yields_one_plan() {
        let parser = RobustTimelineParser::new();
        let context = ParseContext::new("北京", 5);
        let result = parser.parse("", &context).await;
        assert_eq!(result.quality, ParseQuality::Degraded);
        assert_eq!(result.data.len(), 1);
        assert!(result.data[0].title.contains("自由行"));
    }

    #[tokio::test]
    async fn test_short_text_recovers_via_forced_heuristic() {
        // below the heuristic probe threshold, so the orchestrator rejects it
        let raw = "上午参观博物馆下午逛老街";
        let parser = RobustTimelineParser::new();
        let context = ParseContext::new("苏州", 1);
        let result = parser.parse(raw, &context).await;
        assert_eq!(result.quality, ParseQuality::Degraded);
        assert!(!result.data.is_empty());
        assert!(result.warnings.iter().any(|w| w == HEURISTIC_WARNING));
        assert_eq!(parser.parser_stats().fallback_parses, 1);
    }

    #[tokio::test]
    async fn test_full_quality_passthrough() {
        let raw = "**上午**\n- 参观苏州博物馆欣赏贝聿铭建筑\n**下午**\n- 漫步平江路历史街区听评弹";
        let parser = RobustTimelineParser::new();
        let context = ParseContext::new("苏州", 1);
        let result = parser.parse(raw, &context).await;
        assert_eq!(result.quality, ParseQuality::Full);
        assert_eq!(result.parser.as_deref(), Some("MarkdownPeriodPlugin"));
        let stats = parser.parser_stats();
        assert_eq!(stats.total_parses, 1);
        assert_eq!(stats.emergency_parses, 0);
    }
}
