use crate::error::Result;
use crate::types::{DayPlan, ParseContext};
use async_trait::async_trait;

/// A pluggable parsing strategy for one textual itinerary convention.
///
/// Plugins are stateless and reentrant; `try_parse` is async to leave room
/// for future I/O even though current strategies are pure string work.
#[async_trait]
pub trait ParserPlugin: Send + Sync + std::fmt::Debug {
    /// The name of the plugin (recorded on winning results)
    fn name(&self) -> &'static str;

    /// Priority within the registry; higher runs first
    fn priority(&self) -> i32;

    /// Cheap probe: can this plugin plausibly handle the text?
    fn can_handle(&self, raw: &str) -> bool;

    /// Attempt a parse. `Ok(None)` means "format not recognized after all";
    /// errors are caught and logged by the orchestrator.
    async fn try_parse(&self, raw: &str, context: &ParseContext) -> Result<Option<Vec<DayPlan>>>;

    /// Rank a successful, schema-valid result against competitors.
    fn score(&self, result: &[DayPlan]) -> u32 {
        default_score(result)
    }
}

/// Default result score: `10·days + 5·segments + 2·activities`, plus one
/// point per activity with a substantial description and one per activity
/// with a known cost.
pub fn default_score(result: &[DayPlan]) -> u32 {
    let mut score = result.len() as u32 * 10;
    for day in result {
        score += day.segments.len() as u32 * 5;
        for segment in &day.segments {
            score += segment.activities.len() as u32 * 2;
            for activity in &segment.activities {
                if activity.description.chars().count() > 10 {
                    score += 1;
                }
                if activity.cost.is_some() {
                    score += 1;
                }
            }
        }
    }
    score
}

/// Priority-ordered collection of parser plugins.
///
/// Built once at startup and constructor-injected into the orchestrator;
/// mutation is expected only at init or explicit test reset, never
/// concurrently with in-flight parses.
#[derive(Debug, Default)]
pub struct ParserRegistry {
    plugins: Vec<Box<dyn ParserPlugin>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the five production plugins in priority
    /// order: JSON, markdown period, numbered list, time range, heuristic.
    pub fn with_default_plugins() -> Self {
        let mut registry = Self::new();
        registry.register(super::json::JsonPlugin::new());
        registry.register(super::markdown::MarkdownPeriodPlugin::new());
        registry.register(super::numbered::NumberedListPlugin::new());
        registry.register(super::timerange::TimeRangePlugin::new());
        registry.register(super::heuristic::HeuristicPlugin::new());
        registry
    }

    /// Register a plugin and re-sort descending by priority. The sort is
    /// stable: ties keep insertion order.
    pub fn register<P: ParserPlugin + 'static>(&mut self, plugin: P) {
        self.plugins.push(Box::new(plugin));
        self.plugins.sort_by_key(|p| std::cmp::Reverse(p.priority()));
    }

    /// All plugins in priority order.
    pub fn all(&self) -> impl Iterator<Item = &dyn ParserPlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Plugins whose probe accepts the text, preserving priority order.
    pub fn get_capable(&self, raw: &str) -> Vec<&dyn ParserPlugin> {
        self.plugins
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| p.can_handle(raw))
            .collect()
    }

    /// Empty the registry (test/reinit only).
    pub fn clear(&mut self) {
        self.plugins.clear();
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, Period, Segment};

    fn sample_plans(days: usize, acts_per_day: usize) -> Vec<DayPlan> {
        (1..=days as u32)
            .map(|day| DayPlan {
                day,
                title: format!("第{}天", day),
                date: format!("第{}天", day),
                segments: vec![Segment {
                    period: Period::Morning,
                    time: "09:00-12:00".to_string(),
                    activities: (0..acts_per_day)
                        .map(|i| Activity {
                            title: format!("活动{}", i),
                            description: "一个内容足够长的活动描述".to_string(),
                            cost: Some(60),
                            duration: "约2-3小时".to_string(),
                            tips: vec![],
                            location: None,
                            icon: "📍".to_string(),
                        })
                        .collect(),
                }],
                weather: None,
                location: "北京".to_string(),
                total_cost: 60,
                progress: 80,
                image: String::new(),
                tags: vec![],
            })
            .collect()
    }

    #[test]
    fn test_default_score_weights() {
        // 1 day => 10, 1 segment => 5, 2 activities => 4, desc+cost => 4
        let plans = sample_plans(1, 2);
        assert_eq!(default_score(&plans), 23);
        // more days dominate
        assert!(default_score(&sample_plans(3, 1)) > default_score(&sample_plans(1, 3)));
    }

    #[test]
    fn test_registry_priority_order() {
        let registry = ParserRegistry::with_default_plugins();
        let priorities: Vec<i32> = registry.all().map(|p| p.priority()).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.all().next().map(|p| p.name()), Some("JsonPlugin"));
    }

    #[test]
    fn test_registry_clear() {
        let mut registry = ParserRegistry::with_default_plugins();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get_capable("anything").is_empty());
    }

    #[test]
    fn test_heuristic_always_capable_of_long_text() {
        let registry = ParserRegistry::with_default_plugins();
        let prose = "这是一段没有任何时间标记的自由行程描述文字，内容足够长可以触发兜底解析器的处理逻辑。";
        let capable = registry.get_capable(prose);
        assert!(capable.iter().any(|p| p.name() == "HeuristicPlugin"));
    }
}
