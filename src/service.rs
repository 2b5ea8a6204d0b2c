//! High-level entry point combining the robust parser with the result
//! cache. One instance is meant to be shared across an application.

use crate::cache::TimelineCache;
use crate::normalizer::convert_to_legacy;
use crate::robust::{ParserStats, RobustTimelineParser};
use crate::types::{LegacyDayActivity, ParseContext, ParseResult};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Warning appended to results replayed from the cache.
pub const CACHE_WARNING: &str = "result served from cache";

/// Cached, never-failing timeline parsing service.
#[derive(Debug, Default)]
pub struct TimelineService {
    parser: RobustTimelineParser,
    cache: Mutex<TimelineCache>,
}

impl TimelineService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with custom cache bounds.
    pub fn with_cache_config(capacity: usize, ttl: Duration) -> Self {
        Self {
            parser: RobustTimelineParser::new(),
            cache: Mutex::new(TimelineCache::new(capacity, ttl)),
        }
    }

    /// Parse itinerary text, consulting the cache first. Only full-quality
    /// results are cached; degraded ones are recomputed so later, better
    /// input for the same trip is not masked.
    pub async fn parse(&self, raw: &str, context: &ParseContext) -> ParseResult {
        {
            let mut cache = self.cache.lock().await;
            if let Some(mut cached) = cache.get(raw, &context.destination) {
                cached.warnings.push(CACHE_WARNING.to_string());
                return cached;
            }
        }

        let result = self.parser.parse(raw, context).await;
        if result.is_success() {
            let mut cache = self.cache.lock().await;
            cache.insert(raw, &context.destination, result.clone());
            debug!(
                target: "timeline::service",
                destination = %context.destination,
                "cached full-quality result"
            );
        }
        result
    }

    /// Parse and flatten into the legacy per-activity shape.
    pub async fn parse_to_legacy(
        &self,
        raw: &str,
        context: &ParseContext,
    ) -> Vec<LegacyDayActivity> {
        let result = self.parse(raw, context).await;
        convert_to_legacy(&result.data)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Drop expired cache entries, returning how many were removed.
    pub async fn cleanup_cache(&self) -> usize {
        self.cache.lock().await.cleanup_expired()
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub fn parser_stats(&self) -> ParserStats {
        self.parser.parser_stats()
    }
}
