use crate::analyzer::report::percent_of;
use serde::{Deserialize, Serialize};

/// Share of current spend added on top as contingency in the forecast.
pub const FORECAST_CONTINGENCY: f64 = 0.05;

/// Budget rollup across the three resource categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMetrics {
    pub total_budget: f64,
    pub total_material_cost: f64,
    pub total_labor_cost: f64,
    pub total_equipment_cost: f64,
    pub total_cost: f64,
    pub budget_variance: f64,
    /// Percent of the budget consumed; 0 when no budget was given.
    pub budget_utilization: f64,
}

impl BudgetMetrics {
    pub fn forecast(&self) -> f64 {
        self.total_cost * (1.0 + FORECAST_CONTINGENCY)
    }
}

pub fn calculate_budget_metrics(
    budget: f64,
    material_cost: f64,
    labor_cost: f64,
    equipment_cost: f64,
) -> BudgetMetrics {
    let total_cost = material_cost + labor_cost + equipment_cost;

    BudgetMetrics {
        total_budget: budget,
        total_material_cost: material_cost,
        total_labor_cost: labor_cost,
        total_equipment_cost: equipment_cost,
        total_cost,
        budget_variance: budget - total_cost,
        budget_utilization: percent_of(total_cost, budget),
    }
}
