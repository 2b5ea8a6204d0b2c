//! Structural validation of parsed day plans. Hard errors disqualify a
//! candidate result in the orchestrator; warnings ride along on the final
//! [`crate::types::ParseResult`].

use crate::types::{DayPlan, Period};
use regex::Regex;
use std::sync::LazyLock;

static TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}-\d{1,2}:\d{2}$").expect("time range regex"));

/// Outcome of validating a candidate set of day plans.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a candidate result. Errors mean the result is unusable;
/// warnings flag business-rule oddities worth surfacing to the caller.
pub fn validate_day_plans(plans: &[DayPlan]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plans.is_empty() {
        report.errors.push("no days parsed".to_string());
        return report;
    }

    for plan in plans {
        if plan.day == 0 {
            report.errors.push("day number must be positive".to_string());
        }
        if plan.title.trim().is_empty() {
            report.errors.push(format!("day {} has an empty title", plan.day));
        }
        if plan.segments.is_empty() {
            report.errors.push(format!("day {} has no segments", plan.day));
        }
        for segment in &plan.segments {
            if segment.activities.is_empty() {
                report.errors.push(format!(
                    "day {} segment {} has no activities",
                    plan.day,
                    segment.period.as_str()
                ));
            }
            if !TIME_RANGE.is_match(&segment.time) {
                report.errors.push(format!(
                    "day {} segment {} has a malformed time range: {}",
                    plan.day,
                    segment.period.as_str(),
                    segment.time
                ));
            }
        }
    }

    for (index, plan) in plans.iter().enumerate() {
        if plan.day != index as u32 + 1 {
            report.warnings.push(format!(
                "day numbers are not contiguous: expected {}, found {}",
                index + 1,
                plan.day
            ));
            break;
        }
    }

    for plan in plans {
        let has_morning = plan.segments.iter().any(|s| s.period == Period::Morning);
        let has_afternoon = plan.segments.iter().any(|s| s.period == Period::Afternoon);
        if !has_morning && !has_afternoon {
            report.warnings.push(format!(
                "day {} covers neither morning nor afternoon",
                plan.day
            ));
        }
    }

    report
}
