use serde::{Deserialize, Serialize};

/// Time-of-day bucket a [`Segment`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
}

impl Period {
    /// All periods in chronological order.
    pub const ALL: [Period; 5] = [
        Period::Morning,
        Period::Noon,
        Period::Afternoon,
        Period::Evening,
        Period::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Noon => "noon",
            Period::Afternoon => "afternoon",
            Period::Evening => "evening",
            Period::Night => "night",
        }
    }

    /// Default clock range for a period, used when the source text carries
    /// no explicit times.
    pub fn time_range(&self) -> &'static str {
        match self {
            Period::Morning => "09:00-12:00",
            Period::Noon => "12:00-14:00",
            Period::Afternoon => "14:00-17:00",
            Period::Evening => "18:00-21:00",
            Period::Night => "21:00-23:00",
        }
    }

    /// Coerce a loosely-typed period label (Chinese or English) into the
    /// enum. Unknown labels fall back to `Morning`.
    pub fn from_loose(label: &str) -> Period {
        let label = label.trim();
        match label {
            "morning" => return Period::Morning,
            "noon" => return Period::Noon,
            "afternoon" => return Period::Afternoon,
            "evening" => return Period::Evening,
            "night" => return Period::Night,
            _ => {}
        }
        if label.contains("上午") || label.contains("早上") || label.contains("早晨") {
            Period::Morning
        } else if label.contains("中午") || label.contains("午餐") {
            Period::Noon
        } else if label.contains("下午") {
            Period::Afternoon
        } else if label.contains("傍晚") || label.contains("晚餐") {
            Period::Evening
        } else if label.contains("晚上") || label.contains('夜') {
            Period::Night
        } else {
            Period::Morning
        }
    }

    /// Derive a period from a 24h clock hour.
    pub fn from_hour(hour: u32) -> Period {
        if hour < 12 {
            Period::Morning
        } else if hour < 18 {
            Period::Afternoon
        } else {
            Period::Evening
        }
    }

    /// Tailwind-style gradient tag used by the legacy timeline format.
    pub fn gradient(&self) -> &'static str {
        match self {
            Period::Morning => "from-yellow-400 to-orange-500",
            Period::Noon => "from-orange-400 to-red-500",
            Period::Afternoon => "from-blue-400 to-indigo-500",
            Period::Evening => "from-purple-400 to-pink-500",
            Period::Night => "from-indigo-500 to-purple-600",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single itinerary leaf item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    pub duration: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub icon: String,
}

/// A period-bounded group of activities within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub period: Period,
    /// Clock range in `HH:MM-HH:MM` form.
    pub time: String,
    pub activities: Vec<Activity>,
}

/// Placeholder weather info; a real enrichment service may overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub condition: String,
    pub temperature: String,
    pub icon: String,
}

impl Weather {
    /// Deterministic placeholder, rotated by day number so consecutive days
    /// do not all look identical.
    pub fn placeholder(day: u32) -> Weather {
        const CONDITIONS: [&str; 3] = ["晴朗", "多云", "阴天"];
        const TEMPERATURES: [&str; 4] = ["22°C", "24°C", "26°C", "25°C"];
        Weather {
            condition: CONDITIONS[day as usize % CONDITIONS.len()].to_string(),
            temperature: TEMPERATURES[day as usize % TEMPERATURES.len()].to_string(),
            icon: "☀️".to_string(),
        }
    }
}

/// Canonical structured representation of one itinerary day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    /// 1-based day counter; contiguous across a parse result.
    pub day: u32,
    pub title: String,
    pub date: String,
    pub segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    pub location: String,
    /// Derived sum of activity costs.
    pub total_cost: u32,
    pub progress: u8,
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl DayPlan {
    /// Sum of all activity costs across segments.
    pub fn derive_total_cost(segments: &[Segment]) -> u32 {
        segments
            .iter()
            .flat_map(|s| s.activities.iter())
            .filter_map(|a| a.cost)
            .sum()
    }

    /// Deterministic progress placeholder as a function of the day number.
    pub fn derive_progress(day: u32) -> u8 {
        (70 + (day * 7) % 30) as u8
    }

    pub fn activity_count(&self) -> usize {
        self.segments.iter().map(|s| s.activities.len()).sum()
    }
}

/// Call-scoped inputs describing the itinerary being parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseContext {
    pub destination: String,
    /// ISO-8601 date (`YYYY-MM-DD`) of the first day, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    pub total_days: u32,
    pub session_id: String,
}

impl ParseContext {
    pub fn new(destination: impl Into<String>, total_days: u32) -> Self {
        let destination = destination.into();
        Self {
            destination: if destination.trim().is_empty() {
                "未知目的地".to_string()
            } else {
                destination
            },
            start_date: None,
            total_days: total_days.max(1),
            session_id: String::new(),
        }
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_loose() {
        assert_eq!(Period::from_loose("上午"), Period::Morning);
        assert_eq!(Period::from_loose("午餐"), Period::Noon);
        assert_eq!(Period::from_loose("下午"), Period::Afternoon);
        assert_eq!(Period::from_loose("傍晚"), Period::Evening);
        assert_eq!(Period::from_loose("晚上"), Period::Night);
        assert_eq!(Period::from_loose("evening"), Period::Evening);
        assert_eq!(Period::from_loose("???"), Period::Morning);
    }

    #[test]
    fn test_period_from_hour() {
        assert_eq!(Period::from_hour(9), Period::Morning);
        assert_eq!(Period::from_hour(14), Period::Afternoon);
        assert_eq!(Period::from_hour(20), Period::Evening);
    }

    #[test]
    fn test_period_serde_lowercase() {
        let json = serde_json::to_string(&Period::Afternoon).unwrap();
        assert_eq!(json, "\"afternoon\"");
        let back: Period = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(back, Period::Night);
    }

    #[test]
    fn test_context_defaults() {
        let ctx = ParseContext::new("", 0);
        assert_eq!(ctx.destination, "未知目的地");
        assert_eq!(ctx.total_days, 1);
    }

    #[test]
    fn test_total_cost_and_progress_deterministic() {
        let segments = vec![Segment {
            period: Period::Morning,
            time: "09:00-12:00".to_string(),
            activities: vec![
                Activity {
                    title: "故宫".to_string(),
                    description: "参观故宫博物院".to_string(),
                    cost: Some(60),
                    duration: "约2-3小时".to_string(),
                    tips: vec![],
                    location: None,
                    icon: "🏛️".to_string(),
                },
                Activity {
                    title: "午餐".to_string(),
                    description: "烤鸭".to_string(),
                    cost: None,
                    duration: "约1小时".to_string(),
                    tips: vec![],
                    location: None,
                    icon: "🍜".to_string(),
                },
            ],
        }];
        assert_eq!(DayPlan::derive_total_cost(&segments), 60);
        assert_eq!(DayPlan::derive_progress(1), DayPlan::derive_progress(1));
        assert!(DayPlan::derive_progress(3) >= 70);
        assert!(DayPlan::derive_progress(3) < 100);
    }
}
