use crate::analyzer::report::{
    group_totals, percentage_shares, Bottleneck, BottleneckReason, Share, MAX_BOTTLENECKS,
};
use crate::project::{Impact, ItemId, MaterialItem};
use crate::sampling::{future_date_label, Sampler};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stock position of a material after simulated allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    Low,
    Sufficient,
    Excess,
}

impl StockStatus {
    fn classify(quantity: f64, remaining: f64) -> Self {
        if remaining < quantity * 0.2 {
            StockStatus::Low
        } else if remaining > quantity * 0.5 {
            StockStatus::Excess
        } else {
            StockStatus::Sufficient
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLine {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub quantity: f64,
    pub allocated: f64,
    pub remaining: f64,
    pub status: StockStatus,
    /// Simulated.
    pub next_delivery: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialMetrics {
    pub total_cost: f64,
    pub distribution: Vec<Share>,
    pub inventory: Vec<InventoryLine>,
    pub bottlenecks: Vec<Bottleneck>,
}

/// Derive cost, category mix, inventory and bottlenecks for the material list.
pub fn calculate_material_metrics(
    materials: &[MaterialItem],
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> MaterialMetrics {
    if materials.is_empty() {
        return MaterialMetrics::default();
    }

    let total_cost: f64 = materials.iter().map(MaterialItem::cost).sum();

    let groups = group_totals(materials.iter().map(|m| (m.category(), m.cost())));
    let distribution = percentage_shares(groups, total_cost);

    let inventory = materials
        .iter()
        .map(|item| simulate_inventory(item, sampler, now))
        .collect();

    MaterialMetrics {
        total_cost,
        distribution,
        inventory,
        bottlenecks: detect_bottlenecks(materials, total_cost),
    }
}

fn simulate_inventory(
    item: &MaterialItem,
    sampler: &mut impl Sampler,
    now: DateTime<Utc>,
) -> InventoryLine {
    let quantity = item.quantity();
    // 50-80% of the order is already committed to work
    let allocated = (quantity * sampler.between(0.5, 0.8)).floor();
    let remaining = quantity - allocated;

    InventoryLine {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity,
        allocated,
        remaining,
        status: StockStatus::classify(quantity, remaining),
        next_delivery: future_date_label(sampler, now),
    }
}

/// Flag lines above 15% of material spend or below 10 units, first three in input order.
fn detect_bottlenecks(materials: &[MaterialItem], total_cost: f64) -> Vec<Bottleneck> {
    materials
        .iter()
        .filter(|item| {
            let cost_share = if total_cost > 0.0 {
                item.cost() / total_cost
            } else {
                0.0
            };
            cost_share > 0.15 || item.quantity() < 10.0
        })
        .take(MAX_BOTTLENECKS)
        .map(|item| {
            let reason = if item.quantity() < 10.0 {
                BottleneckReason::LowQuantity
            } else {
                BottleneckReason::HighCostImpact
            };
            Bottleneck::new(
                item.id.clone(),
                item.name().to_string(),
                reason,
                Impact::Medium,
            )
        })
        .collect()
}
