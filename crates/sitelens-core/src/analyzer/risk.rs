use crate::analyzer::report::{RiskLevel, Severity};
use crate::project::{
    EquipmentItem, Impact, ItemId, LaborItem, MaterialItem, RiskItem, SchedulePhase,
};
use serde::{Deserialize, Serialize};

/// Mean score used when there is nothing to average.
const DEFAULT_MEAN_SCORE: f64 = 0.5;

const MITIGATION_STRATEGIES: &[(&str, &str)] = &[
    (
        "Weather",
        "Develop a weather contingency plan with flexible scheduling and temporary weather \
         protection measures.",
    ),
    (
        "Supply Chain",
        "Identify alternative suppliers and maintain a buffer stock of critical materials.",
    ),
    (
        "Labor",
        "Develop relationships with multiple labor providers and implement cross-training \
         programs.",
    ),
    (
        "Financial",
        "Establish contingency funds and regular financial reviews to address potential cost \
         overruns.",
    ),
    (
        "Safety",
        "Enhance safety training programs and implement rigorous inspection protocols.",
    ),
    (
        "Quality",
        "Implement comprehensive quality control processes with regular inspections and testing.",
    ),
    (
        "Regulatory",
        "Engage with regulatory authorities early and maintain regular communication \
         throughout the project.",
    ),
    (
        "Equipment",
        "Arrange backup equipment options and implement preventive maintenance program.",
    ),
    (
        "Schedule",
        "Build buffer time into critical path activities and prepare acceleration plans for \
         key milestones.",
    ),
];

const GENERIC_STRATEGY: &str =
    "Develop a comprehensive risk management plan with regular monitoring and response protocols.";

/// Mitigation text for a risk category; unknown categories get a generic plan.
pub fn mitigation_strategy(category: &str) -> &'static str {
    MITIGATION_STRATEGIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, strategy)| *strategy)
        .unwrap_or(GENERIC_STRATEGY)
}

/// A risk with its score, severity band and mitigation attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredRisk {
    pub id: ItemId,
    pub title: String,
    pub description: String,
    pub probability: f64,
    /// Impact label as supplied.
    pub impact: String,
    pub risk_score: f64,
    pub severity: Severity,
    pub mitigation_strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub risks: Vec<ScoredRisk>,
    pub overall_risk_level: RiskLevel,
    pub average_risk_score: f64,
    /// True when the register was synthesized from resource data.
    pub synthesized: bool,
}

/// `probability × impact weight`.
pub fn risk_score(risk: &RiskItem) -> f64 {
    risk.probability() * risk.impact().weight()
}

/// Score the supplied register, or a synthesized one when it is empty.
pub fn calculate_risk_metrics(
    risks: &[RiskItem],
    materials: &[MaterialItem],
    labor: &[LaborItem],
    equipment: &[EquipmentItem],
    schedule: &[SchedulePhase],
) -> RiskMetrics {
    let synthesized = risks.is_empty();
    let generated;
    let register: &[RiskItem] = if synthesized {
        generated = generate_risks_from_data(materials, labor, equipment, schedule);
        &generated
    } else {
        risks
    };

    let scores: Vec<f64> = register.iter().map(risk_score).collect();
    let average_risk_score = if scores.is_empty() {
        DEFAULT_MEAN_SCORE
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let risks = register
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(index, (risk, score))| score_risk(index, risk, score))
        .collect();

    RiskMetrics {
        risks,
        overall_risk_level: RiskLevel::from_score(average_risk_score),
        average_risk_score,
        synthesized,
    }
}

fn score_risk(index: usize, risk: &RiskItem, risk_score: f64) -> ScoredRisk {
    let ordinal = index as i64 + 1;
    ScoredRisk {
        id: risk.id.clone().unwrap_or(ItemId::Number(ordinal)),
        title: risk
            .category
            .clone()
            .unwrap_or_else(|| format!("Risk {}", ordinal)),
        description: risk
            .description
            .clone()
            .unwrap_or_else(|| "No description provided".to_string()),
        probability: risk.probability(),
        impact: risk.impact_label(),
        risk_score,
        severity: Severity::from_score(risk_score),
        mitigation_strategy: mitigation_strategy(risk.category.as_deref().unwrap_or("General"))
            .to_string(),
    }
}

fn synthetic(category: &str, probability: f64, impact: Impact, description: String) -> RiskItem {
    RiskItem {
        id: None,
        category: Some(category.to_string()),
        probability: Some(probability),
        impact: Some(impact.label().to_string()),
        description: Some(description),
    }
}

/// Build a baseline risk register from the resource lists.
///
/// Weather and Financial risks are always present; the others appear only
/// when the matching resource list is non-empty.
pub fn generate_risks_from_data(
    materials: &[MaterialItem],
    labor: &[LaborItem],
    equipment: &[EquipmentItem],
    schedule: &[SchedulePhase],
) -> Vec<RiskItem> {
    let mut risks = vec![synthetic(
        "Weather",
        0.3,
        Impact::Medium,
        "Potential seasonal weather disruptions affecting outdoor work.".to_string(),
    )];

    if !materials.is_empty() {
        let high_cost = materials
            .iter()
            .find(|m| m.unit_cost() > 1000.0 || m.cost() > 50_000.0);
        risks.push(match high_cost {
            Some(material) => synthetic(
                "Supply Chain",
                0.4,
                Impact::High,
                format!(
                    "Potential delivery delays for {}.",
                    material.name.as_deref().unwrap_or("critical materials")
                ),
            ),
            None => synthetic(
                "Supply Chain",
                0.25,
                Impact::Medium,
                "Possible material price volatility affecting budget.".to_string(),
            ),
        });
    }

    if !labor.is_empty() {
        let specialized = labor.iter().find(|l| l.hourly_rate() > 45.0);
        risks.push(match specialized {
            Some(crew) => synthetic(
                "Labor",
                0.35,
                Impact::High,
                format!(
                    "Potential shortage of {} in the region.",
                    crew.role.as_deref().unwrap_or("specialized workers")
                ),
            ),
            None => synthetic(
                "Labor",
                0.2,
                Impact::Medium,
                "Possible labor productivity variations affecting schedule.".to_string(),
            ),
        });
    }

    if let Some(machine) = equipment
        .iter()
        .find(|e| e.quantity() == 1.0 && e.daily_rate() > 500.0)
    {
        risks.push(synthetic(
            "Equipment",
            0.3,
            Impact::Medium,
            format!(
                "Potential downtime of critical {} affecting schedule.",
                machine.name.as_deref().unwrap_or("equipment")
            ),
        ));
    }

    if !schedule.is_empty() {
        risks.push(synthetic(
            "Schedule",
            0.25,
            Impact::Medium,
            "Potential delays in regulatory approvals affecting project timeline.".to_string(),
        ));
    }

    risks.push(synthetic(
        "Financial",
        0.2,
        Impact::High,
        "Potential cost overruns due to unforeseen site conditions.".to_string(),
    ));

    risks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk(category: &str, probability: f64, impact: &str) -> RiskItem {
        RiskItem {
            id: None,
            category: Some(category.to_string()),
            probability: Some(probability),
            impact: Some(impact.to_string()),
            description: None,
        }
    }

    fn categories(metrics: &RiskMetrics) -> Vec<&str> {
        metrics.risks.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_minimal_synthesized_register() {
        let metrics = calculate_risk_metrics(&[], &[], &[], &[], &[]);
        assert!(metrics.synthesized);
        assert_eq!(categories(&metrics), vec!["Weather", "Financial"]);
        // (0.3 * 2 + 0.2 * 3) / 2
        assert!((metrics.average_risk_score - 0.6).abs() < 1e-9);
        assert_eq!(metrics.overall_risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_high_cost_material_triggers_supply_chain_risk() {
        let concrete = MaterialItem {
            id: Some(1.into()),
            name: Some("Concrete".into()),
            category: Some("Structural".into()),
            quantity: Some(450.0),
            unit: None,
            unit_cost: Some(125.0),
        };
        let metrics = calculate_risk_metrics(&[], &[concrete], &[], &[], &[]);
        assert_eq!(categories(&metrics), vec!["Weather", "Supply Chain", "Financial"]);
        let supply = &metrics.risks[1];
        assert_eq!(supply.impact, "High");
        assert_eq!(supply.description, "Potential delivery delays for Concrete.");
        assert_eq!(supply.id, ItemId::Number(2));
    }

    #[test]
    fn test_critical_equipment_risk() {
        let crane = EquipmentItem {
            name: Some("Tower Crane".into()),
            quantity: Some(1.0),
            daily_rate: Some(1200.0),
            ..Default::default()
        };
        let pump = EquipmentItem {
            name: Some("Pump".into()),
            quantity: Some(2.0),
            daily_rate: Some(900.0),
            ..Default::default()
        };
        let metrics = calculate_risk_metrics(&[], &[], &[], &[pump.clone()], &[]);
        assert!(!categories(&metrics).contains(&"Equipment"));
        let metrics = calculate_risk_metrics(&[], &[], &[], &[pump, crane], &[]);
        assert_eq!(
            metrics.risks[1].description,
            "Potential downtime of critical Tower Crane affecting schedule."
        );
    }

    #[test]
    fn test_supplied_register_is_scored() {
        let register = vec![risk("Safety", 0.6, "High"), risk("Quality", 0.3, "Low")];
        let metrics = calculate_risk_metrics(&register, &[], &[], &[], &[]);
        assert!(!metrics.synthesized);
        assert_eq!(metrics.risks[0].severity, Severity::Critical);
        assert_eq!(metrics.risks[1].severity, Severity::Low);
        assert_eq!(metrics.risks[0].title, "Safety");
        assert_eq!(metrics.risks[1].description, "No description provided");
        assert_eq!(
            metrics.risks[0].mitigation_strategy,
            "Enhance safety training programs and implement rigorous inspection protocols."
        );
        // (1.8 + 0.3) / 2
        assert_eq!(metrics.overall_risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_missing_fields_defaulted() {
        let metrics = calculate_risk_metrics(&[RiskItem::default()], &[], &[], &[], &[]);
        let scored = &metrics.risks[0];
        assert_eq!(scored.id, ItemId::Number(1));
        assert_eq!(scored.title, "Risk 1");
        assert_eq!(scored.probability, 0.3);
        assert_eq!(scored.impact, "Medium");
        assert!((scored.risk_score - 0.6).abs() < 1e-9);
        assert_eq!(scored.mitigation_strategy, GENERIC_STRATEGY);
    }

    #[test]
    fn test_unknown_impact_scores_as_low() {
        let metrics = calculate_risk_metrics(&[risk("Site", 0.5, "Severe")], &[], &[], &[], &[]);
        assert_eq!(metrics.risks[0].risk_score, 0.5);
        assert_eq!(metrics.risks[0].impact, "Severe");
        assert_eq!(metrics.risks[0].mitigation_strategy, GENERIC_STRATEGY);
    }

    #[test]
    fn test_overall_level_is_driven_by_mean() {
        let high = calculate_risk_metrics(&[risk("Labor", 0.65, "Medium")], &[], &[], &[], &[]);
        assert_eq!(high.overall_risk_level, RiskLevel::High);
        let medium = calculate_risk_metrics(&[risk("Labor", 0.45, "Medium")], &[], &[], &[], &[]);
        assert_eq!(medium.overall_risk_level, RiskLevel::Medium);
    }
}
