use crate::analyzer::budget::BudgetMetrics;
use crate::analyzer::environment::{
    EquipmentImpact, Footprint, MaterialImpact, SustainabilityTargetsReport,
};
use crate::analyzer::equipment::{EquipmentEfficiency, EquipmentUtilization};
use crate::analyzer::labor::LaborUtilization;
use crate::analyzer::materials::InventoryLine;
use crate::analyzer::risk::ScoredRisk;
use crate::analyzer::schedule::CriticalPhase;
use crate::optimizer::{RiskRecommendation, ScheduleChange};
use crate::project::{EquipmentItem, Impact, ItemId, LaborItem, MaterialItem};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Overall project risk rating derived from the mean risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// `> 1.2` is High, `> 0.7` is Medium, anything else Low.
    pub fn from_score(average: f64) -> Self {
        if average > 1.2 {
            RiskLevel::High
        } else if average > 0.7 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

/// Severity of an individual scored risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score > 1.5 {
            Severity::Critical
        } else if score > 0.8 {
            Severity::High
        } else if score < 0.4 {
            Severity::Low
        } else {
            Severity::Medium
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// Why a resource line was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BottleneckReason {
    #[serde(rename = "Low Quantity")]
    LowQuantity,
    #[serde(rename = "High Cost Impact")]
    HighCostImpact,
    #[serde(rename = "Limited Resources")]
    LimitedResources,
    #[serde(rename = "High Cost Specialty")]
    HighCostSpecialty,
    #[serde(rename = "Single Point of Failure")]
    SinglePointOfFailure,
    #[serde(rename = "High Cost Equipment")]
    HighCostEquipment,
}

impl BottleneckReason {
    pub fn label(&self) -> &str {
        match self {
            BottleneckReason::LowQuantity => "Low Quantity",
            BottleneckReason::HighCostImpact => "High Cost Impact",
            BottleneckReason::LimitedResources => "Limited Resources",
            BottleneckReason::HighCostSpecialty => "High Cost Specialty",
            BottleneckReason::SinglePointOfFailure => "Single Point of Failure",
            BottleneckReason::HighCostEquipment => "High Cost Equipment",
        }
    }

    pub fn mitigation(&self) -> &str {
        match self {
            BottleneckReason::LowQuantity => "Increase order quantity and establish safety stock",
            BottleneckReason::HighCostImpact => {
                "Explore alternative suppliers and bulk purchasing options"
            }
            BottleneckReason::LimitedResources => {
                "Recruit additional workers or cross-train existing staff"
            }
            BottleneckReason::HighCostSpecialty => {
                "Optimize scheduling to maximize utilization of high-cost resources"
            }
            BottleneckReason::SinglePointOfFailure => "Arrange backup equipment or rental options",
            BottleneckReason::HighCostEquipment => {
                "Optimize scheduling to maximize utilization and consider equipment sharing"
            }
        }
    }
}

/// Bottleneck lists never hold more than this many entries.
pub const MAX_BOTTLENECKS: usize = 3;

/// A resource line flagged as disproportionately costly or scarce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    pub id: Option<ItemId>,
    pub name: String,
    pub reason: BottleneckReason,
    pub impact: Impact,
    pub mitigation: String,
}

impl Bottleneck {
    pub fn new(id: Option<ItemId>, name: String, reason: BottleneckReason, impact: Impact) -> Self {
        Self {
            id,
            name,
            reason,
            impact,
            mitigation: reason.mitigation().to_string(),
        }
    }
}

/// One named slice of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub name: String,
    pub value: f64,
}

/// Sum values per key, keeping keys in first-seen order.
pub fn group_totals<'a>(entries: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    for (key, value) in entries {
        match groups.iter_mut().find(|(name, _)| name == key) {
            Some((_, total)) => *total += value,
            None => groups.push((key.to_string(), value)),
        }
    }
    groups
}

/// Turn group totals into rounded percentages of `total`.
///
/// A zero (or negative) total yields 0% for every group rather than NaN.
pub fn percentage_shares(groups: Vec<(String, f64)>, total: f64) -> Vec<Share> {
    groups
        .into_iter()
        .map(|(name, value)| Share {
            name,
            value: percent_of(value, total).round(),
        })
        .collect()
}

/// `part / whole * 100`, or 0 when `whole` is not positive.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A templated optimization suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_estimate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_reduction: Option<String>,
}

impl Recommendation {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        impact: Impact,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            impact,
            savings_estimate: None,
            carbon_reduction: None,
        }
    }

    /// Attach a dollar saving, rendered with [`format_currency`].
    pub fn with_savings(mut self, amount: f64) -> Self {
        self.savings_estimate = Some(format_currency(amount));
        self
    }

    /// Attach a carbon reduction, rendered with [`format_carbon`].
    pub fn with_carbon(mut self, tons: impl std::fmt::Display) -> Self {
        self.carbon_reduction = Some(format_carbon(tons));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub total_budget: f64,
    pub total_material_cost: f64,
    pub total_labor_cost: f64,
    pub total_equipment_cost: f64,
    pub project_duration: i64,
    pub completion_percentage: f64,
    pub risk_level: RiskLevel,
    pub average_risk_score: f64,
    pub project_type: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborSection {
    pub current_allocation: Vec<LaborItem>,
    pub distribution: Vec<Share>,
    pub utilization: Vec<LaborUtilization>,
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSection {
    pub current_allocation: Vec<MaterialItem>,
    pub distribution: Vec<Share>,
    pub inventory: Vec<InventoryLine>,
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentSection {
    pub current_allocation: Vec<EquipmentItem>,
    pub utilization: Vec<EquipmentUtilization>,
    pub efficiency: Vec<EquipmentEfficiency>,
    pub distribution: Vec<Share>,
    pub bottlenecks: Vec<Bottleneck>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceOptimization {
    pub labor: LaborSection,
    pub materials: MaterialSection,
    pub equipment: EquipmentSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalImpact {
    pub current_footprint: Footprint,
    pub targets: SustainabilityTargetsReport,
    pub material_impact: Vec<MaterialImpact>,
    pub equipment_impact: Vec<EquipmentImpact>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOptimization {
    pub current_completion: String,
    pub optimized_completion: String,
    pub timeline_reduction: String,
    pub timeline_reduction_days: i64,
    pub critical_path: Vec<CriticalPhase>,
    pub critical_path_changes: Vec<ScheduleChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalysis {
    pub total_budget: f64,
    pub current_spend: f64,
    pub forecast: f64,
    pub variance: f64,
    pub utilization_rate: f64,
    pub recommendations: Vec<Recommendation>,
}

impl BudgetAnalysis {
    pub fn from_metrics(metrics: &BudgetMetrics, recommendations: Vec<Recommendation>) -> Self {
        Self {
            total_budget: metrics.total_budget,
            current_spend: metrics.total_cost,
            forecast: metrics.forecast(),
            variance: metrics.budget_variance,
            utilization_rate: metrics.budget_utilization,
            recommendations,
        }
    }
}

/// The complete analysis of one project upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub project_metrics: ProjectMetrics,
    pub resource_optimization: ResourceOptimization,
    pub risk_assessment: Vec<ScoredRisk>,
    pub risk_mitigation: Vec<RiskRecommendation>,
    pub environmental_impact: EnvironmentalImpact,
    pub schedule_optimization: ScheduleOptimization,
    pub budget_analysis: BudgetAnalysis,
    pub project_data: Value,
}

impl AnalysisReport {
    pub fn total_cost(&self) -> f64 {
        self.budget_analysis.current_spend
    }

    pub fn critical_risk_count(&self) -> usize {
        self.risk_assessment
            .iter()
            .filter(|r| r.severity == Severity::Critical)
            .count()
    }

    pub fn high_risk_count(&self) -> usize {
        self.risk_assessment
            .iter()
            .filter(|r| r.severity == Severity::High)
            .count()
    }

    /// All bottlenecks across resource categories, labor first.
    pub fn bottlenecks(&self) -> impl Iterator<Item = &Bottleneck> {
        let r = &self.resource_optimization;
        r.labor
            .bottlenecks
            .iter()
            .chain(r.materials.bottlenecks.iter())
            .chain(r.equipment.bottlenecks.iter())
    }

    pub fn recommendation_count(&self) -> usize {
        let r = &self.resource_optimization;
        r.labor.recommendations.len()
            + r.materials.recommendations.len()
            + r.equipment.recommendations.len()
            + self.environmental_impact.recommendations.len()
            + self.budget_analysis.recommendations.len()
    }

    /// Named numeric figures that must be finite for the report to be served.
    pub fn aggregate_figures(&self) -> Vec<(&'static str, f64)> {
        let m = &self.project_metrics;
        let f = &self.environmental_impact.current_footprint;
        let b = &self.budget_analysis;
        vec![
            ("totalBudget", m.total_budget),
            ("totalMaterialCost", m.total_material_cost),
            ("totalLaborCost", m.total_labor_cost),
            ("totalEquipmentCost", m.total_equipment_cost),
            ("completionPercentage", m.completion_percentage),
            ("averageRiskScore", m.average_risk_score),
            ("carbon", f.carbon),
            ("water", f.water),
            ("currentSpend", b.current_spend),
            ("forecast", b.forecast),
            ("variance", b.variance),
            ("utilizationRate", b.utilization_rate),
        ]
    }
}

/// Format a dollar amount as a rounded, comma-grouped string: `$12,345`.
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Format a carbon figure: `12 tons CO₂e`.
pub fn format_carbon(tons: impl std::fmt::Display) -> String {
    format!("{} tons CO₂e", tons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1234.5), "$1,235");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(-4500.0), "-$4,500");
    }

    #[test]
    fn test_format_carbon() {
        assert_eq!(format_carbon(1.2), "1.2 tons CO₂e");
        assert_eq!(format_carbon(225), "225 tons CO₂e");
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(1.3), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(1.2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.7), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.5), RiskLevel::Low);
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(Severity::from_score(1.6), Severity::Critical);
        assert_eq!(Severity::from_score(1.5), Severity::High);
        assert_eq!(Severity::from_score(0.81), Severity::High);
        assert_eq!(Severity::from_score(0.8), Severity::Medium);
        assert_eq!(Severity::from_score(0.4), Severity::Medium);
        assert_eq!(Severity::from_score(0.39), Severity::Low);
    }

    #[test]
    fn test_shares_with_zero_total() {
        let groups = group_totals([("A", 0.0), ("B", 0.0), ("A", 0.0)]);
        assert_eq!(groups.len(), 2);
        let shares = percentage_shares(groups, 0.0);
        assert!(shares.iter().all(|s| s.value == 0.0));
    }

    #[test]
    fn test_group_totals_keeps_first_seen_order() {
        let groups = group_totals([("Framing", 1.0), ("Structural", 2.0), ("Framing", 3.0)]);
        assert_eq!(
            groups,
            vec![("Framing".to_string(), 4.0), ("Structural".to_string(), 2.0)]
        );
    }
}
