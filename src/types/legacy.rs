use serde::{Deserialize, Serialize};

/// Flattened per-day shape consumed by non-migrated callers.
///
/// Weather is inlined as two plain strings and every activity becomes one
/// [`LegacyTimelineItem`] carrying its segment's time and a period gradient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDayActivity {
    pub day: u32,
    pub title: String,
    pub date: String,
    pub weather: String,
    pub temperature: String,
    pub location: String,
    pub cost: u32,
    pub progress: u8,
    pub image: String,
    pub tags: Vec<String>,
    pub timeline: Vec<LegacyTimelineItem>,
}

/// One entry per activity in the legacy flattened format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyTimelineItem {
    pub time: String,
    pub period: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub cost: u32,
    pub duration: String,
    pub color: String,
}
