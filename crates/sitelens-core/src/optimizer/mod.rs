pub mod plan_gen;
pub mod resource_gen;

use crate::analyzer::environment::EnvironmentalMetrics;
use crate::analyzer::equipment::EquipmentMetrics;
use crate::analyzer::labor::LaborMetrics;
use crate::analyzer::materials::MaterialMetrics;
use crate::analyzer::report::{Recommendation, Severity};
use crate::analyzer::risk::RiskMetrics;
use crate::project::{ItemId, ProjectInput};
use serde::{Deserialize, Serialize};

/// Mitigation advice for one of the top scored risks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecommendation {
    pub id: u32,
    pub risk_id: ItemId,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub mitigation_strategy: String,
}

/// Proposed compression of a long schedule phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleChange {
    pub id: u32,
    pub task: String,
    pub original_duration: String,
    pub optimized_duration: String,
    pub strategy: String,
}

/// Everything the generators read. All of it is computed upstream.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    pub project: &'a ProjectInput,
    pub materials: &'a MaterialMetrics,
    pub labor: &'a LaborMetrics,
    pub equipment: &'a EquipmentMetrics,
    pub environment: &'a EnvironmentalMetrics,
    pub risks: &'a RiskMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub labor: Vec<Recommendation>,
    pub materials: Vec<Recommendation>,
    pub equipment: Vec<Recommendation>,
    pub risks: Vec<RiskRecommendation>,
    pub environmental: Vec<Recommendation>,
    pub schedule: Vec<ScheduleChange>,
    pub budget: Vec<Recommendation>,
}

/// Fill the recommendation templates for every category.
///
/// Pure: the same metrics always give the same recommendations.
pub fn generate_recommendations(inputs: RecommendationInputs<'_>) -> Recommendations {
    let project = inputs.project;

    Recommendations {
        labor: resource_gen::labor_recommendations(&project.labor, inputs.labor),
        materials: resource_gen::material_recommendations(&project.materials, inputs.materials),
        equipment: resource_gen::equipment_recommendations(&project.equipment, inputs.equipment),
        risks: plan_gen::risk_recommendations(inputs.risks),
        environmental: plan_gen::environmental_recommendations(
            !project.materials.is_empty(),
            inputs.environment,
        ),
        schedule: plan_gen::schedule_changes(&project.schedule),
        budget: plan_gen::budget_recommendations(
            inputs.materials.total_cost,
            inputs.labor.total_cost,
            inputs.equipment.total_cost,
        ),
    }
}

/// A JS-style `value || fallback`: absent or zero picks the fallback.
pub(crate) fn or_fallback(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => fallback,
    }
}

/// First element with the greatest key; later ties lose.
pub(crate) fn first_max_by_key<T>(items: &[T], key: impl Fn(&T) -> f64) -> Option<&T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let value = key(item);
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((item, value)),
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_fallback() {
        assert_eq!(or_fallback(None, 30.0), 30.0);
        assert_eq!(or_fallback(Some(0.0), 30.0), 30.0);
        assert_eq!(or_fallback(Some(42.0), 30.0), 42.0);
    }

    #[test]
    fn test_first_max_keeps_earliest_tie() {
        let values = [("a", 1.0), ("b", 5.0), ("c", 5.0), ("d", 2.0)];
        let best = first_max_by_key(&values, |(_, v)| *v).unwrap();
        assert_eq!(best.0, "b");
        assert!(first_max_by_key(&[] as &[(&str, f64)], |(_, v)| *v).is_none());
    }
}
