use super::{RiskRecommendation, ScheduleChange};
use crate::analyzer::environment::EnvironmentalMetrics;
use crate::analyzer::report::Recommendation;
use crate::analyzer::risk::RiskMetrics;
use crate::analyzer::schedule::phase_duration_days;
use crate::project::{Impact, SchedulePhase};
use std::cmp::Reverse;

const MAX_RISK_RECOMMENDATIONS: usize = 3;

/// (compression factor, strategy) for the longest and second-longest phases.
const PHASE_COMPRESSION: [(f64, &str); 2] = [
    (
        0.9,
        "Implement parallel work streams and increase resource allocation during critical periods.",
    ),
    (
        0.92,
        "Optimize workflow sequencing and reduce wait times between activities.",
    ),
];

pub fn risk_recommendations(metrics: &RiskMetrics) -> Vec<RiskRecommendation> {
    metrics
        .risks
        .iter()
        .take(MAX_RISK_RECOMMENDATIONS)
        .enumerate()
        .map(|(index, risk)| RiskRecommendation {
            id: index as u32 + 1,
            risk_id: risk.id.clone(),
            title: risk.title.clone(),
            description: risk.description.clone(),
            severity: risk.severity,
            mitigation_strategy: risk.mitigation_strategy.clone(),
        })
        .collect()
}

pub fn environmental_recommendations(
    has_materials: bool,
    metrics: &EnvironmentalMetrics,
) -> Vec<Recommendation> {
    let carbon = metrics.footprint.carbon;
    let mut recs = vec![Recommendation::new(
        1,
        "Reduce Equipment Idle Time",
        "Implement strict equipment shutdown procedures during breaks and non-working hours.",
        Impact::Medium,
    )
    .with_carbon((carbon * 0.08).round())];

    if has_materials {
        recs.push(
            Recommendation::new(
                2,
                "Increase Recycled Material Usage",
                "Substitute virgin materials with recycled alternatives where specifications \
                 allow.",
                Impact::High,
            )
            .with_carbon((carbon * 0.12).round()),
        );
    }

    recs.push(
        Recommendation::new(
            3,
            "Optimize Delivery Logistics",
            "Consolidate deliveries and optimize routes to reduce transportation emissions.",
            Impact::Medium,
        )
        .with_carbon((carbon * 0.05).round()),
    );

    recs
}

/// Compression proposals for the two longest phases.
pub fn schedule_changes(schedule: &[SchedulePhase]) -> Vec<ScheduleChange> {
    let mut ranked: Vec<(&SchedulePhase, i64)> = schedule
        .iter()
        .map(|phase| (phase, phase_duration_days(phase)))
        .collect();
    ranked.sort_by_key(|&(_, days)| Reverse(days));

    ranked
        .into_iter()
        .zip(PHASE_COMPRESSION)
        .enumerate()
        .map(|(index, ((phase, days), (factor, strategy)))| ScheduleChange {
            id: index as u32 + 1,
            task: phase.name().to_string(),
            original_duration: format!("{} days", days),
            optimized_duration: format!("{} days", (days as f64 * factor).round()),
            strategy: strategy.to_string(),
        })
        .collect()
}

pub fn budget_recommendations(
    material_cost: f64,
    labor_cost: f64,
    equipment_cost: f64,
) -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            1,
            "Optimize Material Procurement",
            "Implement bulk purchasing and early procurement strategies for key materials.",
            Impact::High,
        )
        .with_savings(material_cost * 0.08),
        Recommendation::new(
            2,
            "Optimize Labor Scheduling",
            "Implement just-in-time labor scheduling to reduce idle time and overtime costs.",
            Impact::Medium,
        )
        .with_savings(labor_cost * 0.06),
        Recommendation::new(
            3,
            "Equipment Rental Optimization",
            "Negotiate better rental terms and implement equipment sharing between project phases.",
            Impact::Medium,
        )
        .with_savings(equipment_cost * 0.1),
    ]
}
