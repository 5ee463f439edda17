use crate::analyzer::report::{
    group_totals, percentage_shares, Bottleneck, BottleneckReason, Share, MAX_BOTTLENECKS,
};
use crate::project::{Impact, ItemId, LaborItem};
use crate::sampling::{future_date_label, Sampler};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skill band inferred from the hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Entry,
    Skilled,
    Specialized,
    Management,
}

impl SkillLevel {
    pub fn from_rate(hourly_rate: Option<f64>) -> Self {
        match hourly_rate {
            Some(rate) if rate >= 60.0 => SkillLevel::Management,
            Some(rate) if rate >= 45.0 => SkillLevel::Specialized,
            Some(rate) if rate >= 30.0 => SkillLevel::Skilled,
            _ => SkillLevel::Entry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborUtilization {
    pub id: Option<ItemId>,
    pub name: String,
    pub assigned: f64,
    /// Simulated idle headcount.
    pub available: f64,
    pub utilization_rate: f64,
    pub skill_level: SkillLevel,
    pub next_available: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborMetrics {
    pub total_cost: f64,
    pub distribution: Vec<Share>,
    pub utilization: Vec<LaborUtilization>,
    pub bottlenecks: Vec<Bottleneck>,
}

/// Derive monthly cost, headcount mix, utilization and bottlenecks for the crew list.
pub fn calculate_labor_metrics(
    labor: &[LaborItem],
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> LaborMetrics {
    if labor.is_empty() {
        return LaborMetrics::default();
    }

    let total_cost: f64 = labor.iter().map(LaborItem::monthly_cost).sum();

    let total_workers: f64 = labor.iter().map(LaborItem::count).sum();
    let groups = group_totals(labor.iter().map(|l| (l.role_category(), l.count())));
    let distribution = percentage_shares(groups, total_workers);

    let utilization = labor
        .iter()
        .map(|item| simulate_utilization(item, sampler, now))
        .collect();

    LaborMetrics {
        total_cost,
        distribution,
        utilization,
        bottlenecks: detect_bottlenecks(labor),
    }
}

fn simulate_utilization(
    item: &LaborItem,
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> LaborUtilization {
    let assigned = item.count();
    let available = (assigned * sampler.between(0.05, 0.25)).floor().max(0.0);
    let utilization_rate = if assigned > 0.0 {
        ((assigned - available) / assigned * 100.0).floor().min(100.0)
    } else {
        0.0
    };
    let next_available = if available > 0.0 {
        "Immediate".to_string()
    } else {
        future_date_label(sampler, now)
    };

    LaborUtilization {
        id: item.id.clone(),
        name: item.label(),
        assigned,
        available,
        utilization_rate,
        skill_level: SkillLevel::from_rate(item.hourly_rate),
        next_available,
    }
}

/// Flag roles above $40/h or with fewer than 3 workers, first three in input order.
fn detect_bottlenecks(labor: &[LaborItem]) -> Vec<Bottleneck> {
    labor
        .iter()
        .filter(|item| item.hourly_rate() > 40.0 || item.count() < 3.0)
        .take(MAX_BOTTLENECKS)
        .map(|item| {
            let reason = if item.count() < 3.0 {
                BottleneckReason::LimitedResources
            } else {
                BottleneckReason::HighCostSpecialty
            };
            Bottleneck::new(item.id.clone(), item.label(), reason, Impact::High)
        })
        .collect()
}
