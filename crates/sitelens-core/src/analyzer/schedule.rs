use crate::project::{format_timestamp, Impact, ItemId, SchedulePhase};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Fraction of the project duration assumed recoverable by optimization.
pub const REDUCTION_FACTOR: f64 = 0.05;

/// Used when a phase has no usable dates or a zero-length span.
pub const FALLBACK_PHASE_DAYS: i64 = 30;

const CRITICAL_PATH_LEN: usize = 3;

/// A phase selected by the critical path heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPhase {
    pub id: Option<ItemId>,
    pub phase: String,
    pub duration: i64,
    pub impact: Impact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMetrics {
    pub duration: i64,
    pub completion_percentage: f64,
    pub end_date: DateTime<Utc>,
    pub optimized_end_date: DateTime<Utc>,
    pub potential_reduction_days: i64,
    pub critical_path: Vec<CriticalPhase>,
}

impl ScheduleMetrics {
    pub fn current_completion(&self) -> String {
        format_timestamp(self.end_date)
    }

    pub fn optimized_completion(&self) -> String {
        format_timestamp(self.optimized_end_date)
    }

    /// `"N days"`.
    pub fn potential_reduction(&self) -> String {
        format!("{} days", self.potential_reduction_days)
    }
}

fn fractional_days(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / MS_PER_DAY
}

fn ceil_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    fractional_days(start, end).ceil() as i64
}

/// Whole-day length of a phase, or 30 days when its dates are unusable.
pub fn phase_duration_days(phase: &SchedulePhase) -> i64 {
    match (phase.start(), phase.end()) {
        (Some(start), Some(end)) => match ceil_days(start, end) {
            0 => FALLBACK_PHASE_DAYS,
            days => days,
        },
        _ => FALLBACK_PHASE_DAYS,
    }
}

pub fn calculate_schedule_metrics(
    schedule: &[SchedulePhase],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ScheduleMetrics {
    let duration = ceil_days(start, end);
    let potential_reduction_days = (duration as f64 * REDUCTION_FACTOR).ceil().max(0.0) as i64;

    ScheduleMetrics {
        duration,
        completion_percentage: completion_percentage(schedule, now),
        end_date: end,
        optimized_end_date: end - Duration::days(potential_reduction_days),
        potential_reduction_days,
        critical_path: identify_critical_path(schedule),
    }
}

/// Share of scheduled phase time already elapsed at `now`, rounded.
///
/// Phases without two parseable dates are left out of both sums.
pub fn completion_percentage(schedule: &[SchedulePhase], now: DateTime<Utc>) -> f64 {
    let mut completed = 0.0;
    let mut total = 0.0;

    for phase in schedule {
        let (Some(phase_start), Some(phase_end)) = (phase.start(), phase.end()) else {
            continue;
        };
        let length = fractional_days(phase_start, phase_end);
        total += length;

        if now > phase_end {
            completed += length;
        } else if now > phase_start {
            completed += fractional_days(phase_start, now).min(length);
        }
    }

    if total > 0.0 {
        (completed / total * 100.0).round()
    } else {
        0.0
    }
}

/// Longest-duration heuristic, not a forward/backward pass.
///
/// Up to three of the longest phases that declare dependencies are tagged
/// High; remaining slots are filled with the longest other phases as Medium.
pub fn identify_critical_path(schedule: &[SchedulePhase]) -> Vec<CriticalPhase> {
    let mut ranked: Vec<(usize, i64)> = schedule
        .iter()
        .enumerate()
        .map(|(idx, phase)| (idx, phase_duration_days(phase)))
        .collect();
    ranked.sort_by_key(|&(_, days)| Reverse(days));

    let mut picked: Vec<usize> = ranked
        .iter()
        .filter(|(idx, _)| !schedule[*idx].dependencies.is_empty())
        .take(CRITICAL_PATH_LEN)
        .map(|(idx, _)| *idx)
        .collect();
    let with_dependencies = picked.len();

    let fill: Vec<usize> = ranked
        .iter()
        .filter(|(idx, _)| !picked.contains(idx))
        .take(CRITICAL_PATH_LEN - with_dependencies)
        .map(|(idx, _)| *idx)
        .collect();
    picked.extend(fill);

    picked
        .into_iter()
        .enumerate()
        .map(|(slot, idx)| {
            let phase = &schedule[idx];
            CriticalPhase {
                id: phase.id.clone(),
                phase: phase.name().to_string(),
                duration: phase_duration_days(phase),
                impact: if slot < with_dependencies {
                    Impact::High
                } else {
                    Impact::Medium
                },
            }
        })
        .collect()
}
