use crate::analyzer::report::{Bottleneck, BottleneckReason, Share, MAX_BOTTLENECKS};
use crate::project::{EquipmentItem, Impact, ItemId};
use crate::sampling::{future_date_label, Sampler};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Simulated machine condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

const CONDITION_WEIGHTS: [(EquipmentCondition, f64); 4] = [
    (EquipmentCondition::Excellent, 0.30),
    (EquipmentCondition::Good, 0.50),
    (EquipmentCondition::Fair, 0.15),
    (EquipmentCondition::Poor, 0.05),
];

impl EquipmentCondition {
    /// Draw a condition with weights 30/50/15/5.
    pub fn sample(sampler: &mut impl Sampler) -> Self {
        let draw = sampler.unit();
        let mut cumulative = 0.0;
        for (condition, weight) in CONDITION_WEIGHTS {
            cumulative += weight;
            if draw <= cumulative {
                return condition;
            }
        }
        EquipmentCondition::Good
    }
}

/// Equipment family used for the type distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipmentClass {
    HeavyMachinery,
    PowerTools,
    Generators,
    Vehicles,
    Scaffolding,
    Other,
}

/// Keyword rules, checked top to bottom; the first match wins.
const CLASS_RULES: &[(&[&str], EquipmentClass)] = &[
    (&["excavator", "bulldozer", "crane"], EquipmentClass::HeavyMachinery),
    (&["tool"], EquipmentClass::PowerTools),
    (&["generator", "compressor"], EquipmentClass::Generators),
    (&["truck", "vehicle"], EquipmentClass::Vehicles),
    (&["scaffold"], EquipmentClass::Scaffolding),
];

impl EquipmentClass {
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        CLASS_RULES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| name.contains(k)))
            .map(|(_, class)| *class)
            .unwrap_or(EquipmentClass::Other)
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentClass::HeavyMachinery => "Heavy Machinery",
            EquipmentClass::PowerTools => "Power Tools",
            EquipmentClass::Generators => "Generators",
            EquipmentClass::Vehicles => "Vehicles",
            EquipmentClass::Scaffolding => "Scaffolding",
            EquipmentClass::Other => "Other Equipment",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentUtilization {
    pub id: Option<ItemId>,
    pub name: String,
    /// Simulated utilization percentage, rounded.
    pub value: f64,
    pub quantity: f64,
    pub in_use: f64,
    pub available: f64,
    pub condition: EquipmentCondition,
    pub next_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentEfficiency {
    pub id: Option<ItemId>,
    pub name: String,
    pub hourly_cost: f64,
    pub fuel_cost: f64,
    pub maintenance_cost: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentMetrics {
    pub total_cost: f64,
    pub utilization: Vec<EquipmentUtilization>,
    pub efficiency: Vec<EquipmentEfficiency>,
    pub bottlenecks: Vec<Bottleneck>,
    /// Unit counts per equipment family (not percentages).
    pub distribution: Vec<Share>,
}

const HOURS_PER_SHIFT: f64 = 8.0;
const FUEL_PRICE_PER_UNIT: f64 = 4.0;

pub fn calculate_equipment_metrics(
    equipment: &[EquipmentItem],
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> EquipmentMetrics {
    if equipment.is_empty() {
        return EquipmentMetrics::default();
    }

    let total_cost: f64 = equipment.iter().map(EquipmentItem::monthly_cost).sum();

    let utilization = equipment
        .iter()
        .map(|item| simulate_utilization(item, sampler, now))
        .collect();

    let efficiency = equipment.iter().map(efficiency_of).collect();

    EquipmentMetrics {
        total_cost,
        utilization,
        efficiency,
        bottlenecks: detect_bottlenecks(equipment),
        distribution: type_distribution(equipment),
    }
}

fn simulate_utilization(
    item: &EquipmentItem,
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> EquipmentUtilization {
    let quantity = item.quantity();
    let rate = sampler.between(60.0, 90.0);
    let in_use = (quantity * rate / 100.0).floor();

    EquipmentUtilization {
        id: item.id.clone(),
        name: item.label(),
        value: rate.round(),
        quantity,
        in_use,
        available: quantity - in_use,
        condition: EquipmentCondition::sample(sampler),
        next_service: future_date_label(sampler, now),
    }
}

fn efficiency_of(item: &EquipmentItem) -> EquipmentEfficiency {
    let hourly_rate = item.daily_rate() / HOURS_PER_SHIFT;
    let fuel_cost = item.fuel_consumption() * FUEL_PRICE_PER_UNIT;

    EquipmentEfficiency {
        id: item.id.clone(),
        name: item.label(),
        hourly_cost: hourly_rate + fuel_cost,
        fuel_cost,
        maintenance_cost: hourly_rate * 0.1,
    }
}

/// Flag machines above $500/day or with a single unit, first three in input order.
fn detect_bottlenecks(equipment: &[EquipmentItem]) -> Vec<Bottleneck> {
    equipment
        .iter()
        .filter(|item| item.daily_rate() > 500.0 || item.quantity() == 1.0)
        .take(MAX_BOTTLENECKS)
        .map(|item| {
            let reason = if item.quantity() == 1.0 {
                BottleneckReason::SinglePointOfFailure
            } else {
                BottleneckReason::HighCostEquipment
            };
            Bottleneck::new(item.id.clone(), item.label(), reason, Impact::Medium)
        })
        .collect()
}

fn type_distribution(equipment: &[EquipmentItem]) -> Vec<Share> {
    let mut counts: Vec<Share> = Vec::new();
    for item in equipment {
        let label = EquipmentClass::classify(item.name.as_deref().unwrap_or("")).label();
        match counts.iter_mut().find(|s| s.name == label) {
            Some(share) => share.value += item.quantity(),
            None => counts.push(Share {
                name: label.to_string(),
                value: item.quantity(),
            }),
        }
    }
    counts
}
