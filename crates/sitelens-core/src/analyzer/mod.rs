pub mod budget;
pub mod environment;
pub mod equipment;
pub mod labor;
pub mod materials;
pub mod report;
pub mod risk;
pub mod schedule;

use crate::error::{AnalysisError, Result};
use crate::optimizer::{generate_recommendations, RecommendationInputs};
use crate::project::{format_timestamp, ProjectInput};
use crate::sampling::{Clock, RandomSampler, Sampler, SystemClock};
use report::{
    AnalysisReport, BudgetAnalysis, EnvironmentalImpact, EquipmentSection, LaborSection,
    MaterialSection, ProjectMetrics, ResourceOptimization, ScheduleOptimization,
};
use serde_json::Value;

/// Runs every analysis stage over one project payload.
///
/// The engine owns its randomness and time sources; it holds no other state,
/// so one engine per request is cheap and nothing leaks between analyses.
#[derive(Debug, Clone)]
pub struct Engine<S = RandomSampler, C = SystemClock> {
    sampler: S,
    clock: C,
}

impl Engine {
    pub fn new() -> Self {
        Self::with_sources(RandomSampler::from_entropy(), SystemClock)
    }

    /// Reproducible simulated fields; completion still reads the system clock.
    pub fn seeded(seed: u64) -> Self {
        Self::with_sources(RandomSampler::seeded(seed), SystemClock)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sampler, C: Clock> Engine<S, C> {
    pub fn with_sources(sampler: S, clock: C) -> Self {
        Self { sampler, clock }
    }

    /// Analyze a raw project payload.
    ///
    /// Fails with [`AnalysisError::EmptyInput`] for a missing or empty object,
    /// [`AnalysisError::InvalidInput`] when a field has the wrong shape and
    /// [`AnalysisError::NonFinite`] when any aggregate overflows.
    pub fn analyze(&mut self, data: &Value) -> Result<AnalysisReport> {
        let input = ProjectInput::from_value(data)?;
        let now = self.clock.now();
        let start = input.start(now);
        let end = input.end(start);

        let material_metrics =
            materials::calculate_material_metrics(&input.materials, &mut self.sampler, now);
        tracing::debug!(
            items = input.materials.len(),
            total_cost = material_metrics.total_cost,
            "material metrics computed"
        );

        let labor_metrics = labor::calculate_labor_metrics(&input.labor, &mut self.sampler, now);
        tracing::debug!(
            items = input.labor.len(),
            total_cost = labor_metrics.total_cost,
            "labor metrics computed"
        );

        let equipment_metrics =
            equipment::calculate_equipment_metrics(&input.equipment, &mut self.sampler, now);
        tracing::debug!(
            items = input.equipment.len(),
            total_cost = equipment_metrics.total_cost,
            "equipment metrics computed"
        );

        let schedule_metrics =
            schedule::calculate_schedule_metrics(&input.schedule, start, end, now);
        tracing::debug!(
            duration = schedule_metrics.duration,
            completion = schedule_metrics.completion_percentage,
            "schedule metrics computed"
        );

        let risk_metrics = risk::calculate_risk_metrics(
            &input.risks,
            &input.materials,
            &input.labor,
            &input.equipment,
            &input.schedule,
        );
        tracing::debug!(
            risks = risk_metrics.risks.len(),
            synthesized = risk_metrics.synthesized,
            "risk metrics computed"
        );

        let environmental_metrics = environment::calculate_environmental_metrics(
            &input.materials,
            &input.equipment,
            &input.sustainability,
            &mut self.sampler,
        );
        tracing::debug!(
            carbon = environmental_metrics.footprint.carbon,
            "environmental metrics computed"
        );

        let budget_metrics = budget::calculate_budget_metrics(
            input.budget(),
            material_metrics.total_cost,
            labor_metrics.total_cost,
            equipment_metrics.total_cost,
        );

        let recommendations = generate_recommendations(RecommendationInputs {
            project: &input,
            materials: &material_metrics,
            labor: &labor_metrics,
            equipment: &equipment_metrics,
            environment: &environmental_metrics,
            risks: &risk_metrics,
        });

        let report = AnalysisReport {
            project_metrics: ProjectMetrics {
                total_budget: budget_metrics.total_budget,
                total_material_cost: material_metrics.total_cost,
                total_labor_cost: labor_metrics.total_cost,
                total_equipment_cost: equipment_metrics.total_cost,
                project_duration: schedule_metrics.duration,
                completion_percentage: schedule_metrics.completion_percentage,
                risk_level: risk_metrics.overall_risk_level,
                average_risk_score: risk_metrics.average_risk_score,
                project_type: input.project_type().to_string(),
                start_date: format_timestamp(start),
                end_date: format_timestamp(end),
            },
            resource_optimization: ResourceOptimization {
                labor: LaborSection {
                    current_allocation: input.labor.clone(),
                    distribution: labor_metrics.distribution,
                    utilization: labor_metrics.utilization,
                    bottlenecks: labor_metrics.bottlenecks,
                    recommendations: recommendations.labor,
                },
                materials: MaterialSection {
                    current_allocation: input.materials.clone(),
                    distribution: material_metrics.distribution,
                    inventory: material_metrics.inventory,
                    bottlenecks: material_metrics.bottlenecks,
                    recommendations: recommendations.materials,
                },
                equipment: EquipmentSection {
                    current_allocation: input.equipment.clone(),
                    utilization: equipment_metrics.utilization,
                    efficiency: equipment_metrics.efficiency,
                    distribution: equipment_metrics.distribution,
                    bottlenecks: equipment_metrics.bottlenecks,
                    recommendations: recommendations.equipment,
                },
            },
            risk_assessment: risk_metrics.risks,
            risk_mitigation: recommendations.risks,
            environmental_impact: EnvironmentalImpact {
                current_footprint: environmental_metrics.footprint,
                targets: environmental_metrics.targets,
                material_impact: environmental_metrics.material_impact,
                equipment_impact: environmental_metrics.equipment_impact,
                recommendations: recommendations.environmental,
            },
            schedule_optimization: ScheduleOptimization {
                current_completion: schedule_metrics.current_completion(),
                optimized_completion: schedule_metrics.optimized_completion(),
                timeline_reduction: schedule_metrics.potential_reduction(),
                timeline_reduction_days: schedule_metrics.potential_reduction_days,
                critical_path: schedule_metrics.critical_path,
                critical_path_changes: recommendations.schedule,
            },
            budget_analysis: BudgetAnalysis::from_metrics(&budget_metrics, recommendations.budget),
            project_data: data.clone(),
        };

        ensure_finite(&report)?;

        tracing::info!(
            materials = input.materials.len(),
            labor = input.labor.len(),
            equipment = input.equipment.len(),
            phases = input.schedule.len(),
            risk_level = report.project_metrics.risk_level.label(),
            "project analysis complete"
        );

        Ok(report)
    }
}

/// Analyze with entropy-seeded simulation and the system clock.
pub fn analyze(data: &Value) -> Result<AnalysisReport> {
    Engine::new().analyze(data)
}

fn ensure_finite(report: &AnalysisReport) -> Result<()> {
    match report
        .aggregate_figures()
        .into_iter()
        .find(|(_, value)| !value.is_finite())
    {
        Some((field, value)) => {
            tracing::warn!(field, value, "analysis produced a non-finite aggregate");
            Err(AnalysisError::NonFinite {
                field: field.to_string(),
            })
        }
        None => Ok(()),
    }
}
