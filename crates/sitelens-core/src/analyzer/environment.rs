use crate::analyzer::report::round2;
use crate::project::{EquipmentItem, ItemId, MaterialItem, SustainabilityTargets};
use crate::sampling::Sampler;
use serde::{Deserialize, Serialize};

/// Carbon factors (tons CO₂e per unit), matched against lowercased names.
///
/// Every entry is tested and the LAST match wins, so "Steel Glass Panel"
/// takes the Glass factor.
const CARBON_FACTORS: &[(&str, f64)] = &[
    ("concrete", 0.1),
    ("steel", 1.8),
    ("lumber", 0.03),
    ("glass", 0.85),
    ("brick", 0.25),
    ("asphalt", 0.03),
];

const DEFAULT_CARBON_FACTOR: f64 = 0.05;

const HOURS_PER_DAY: f64 = 8.0;
const WORKING_DAYS_PER_MONTH: f64 = 22.0;
/// Diesel, kg CO₂e per liter.
const DIESEL_KG_PER_LITER: f64 = 2.68;

const DEFAULT_WASTE_TARGET: f64 = 75.0;
const DEFAULT_RENEWABLE_TARGET: f64 = 40.0;

pub fn carbon_factor(name: &str) -> f64 {
    let name = name.to_lowercase();
    CARBON_FACTORS
        .iter()
        .filter(|(keyword, _)| name.contains(keyword))
        .last()
        .map(|(_, factor)| *factor)
        .unwrap_or(DEFAULT_CARBON_FACTOR)
}

/// Liters per unit (in thousands) by material family.
pub fn water_factor(name: &str) -> f64 {
    let name = name.to_lowercase();
    if name.contains("concrete") {
        3.0
    } else if name.contains("brick") || name.contains("mortar") {
        1.5
    } else {
        0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialImpact {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub quantity: f64,
    pub carbon_footprint: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentImpact {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub quantity: f64,
    pub fuel_consumption: f64,
    pub carbon_footprint: f64,
}

/// Aggregate footprint. `waste` and `renewable` are simulated percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub carbon: f64,
    pub water: f64,
    pub waste: f64,
    pub renewable: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityTargetsReport {
    pub carbon: f64,
    pub water: f64,
    pub waste: f64,
    pub renewable: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green_materials_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalMetrics {
    pub footprint: Footprint,
    pub material_impact: Vec<MaterialImpact>,
    pub equipment_impact: Vec<EquipmentImpact>,
    pub targets: SustainabilityTargetsReport,
}

pub fn calculate_environmental_metrics(
    materials: &[MaterialItem],
    equipment: &[EquipmentItem],
    sustainability: &SustainabilityTargets,
    sampler: &mut impl Sampler,
) -> EnvironmentalMetrics {
    let material_impact: Vec<MaterialImpact> = materials.iter().map(material_impact).collect();
    let equipment_impact: Vec<EquipmentImpact> = equipment.iter().map(equipment_impact).collect();

    let carbon = (material_impact.iter().map(|m| m.carbon_footprint).sum::<f64>()
        + equipment_impact.iter().map(|e| e.carbon_footprint).sum::<f64>())
    .round();

    let water = materials
        .iter()
        .map(|m| m.quantity() * water_factor(m.name()) * 1000.0)
        .sum::<f64>()
        .round();

    let waste_target = sustainability
        .waste_recycling_target
        .unwrap_or(DEFAULT_WASTE_TARGET);
    let waste = ((sampler.unit() * 20.0).floor() + waste_target - 15.0)
        .min(waste_target - 10.0)
        .max(50.0);

    let renewable_target = sustainability
        .renewable_energy_target
        .unwrap_or(DEFAULT_RENEWABLE_TARGET);
    let renewable = ((sampler.unit() * 15.0).floor() + renewable_target - 10.0)
        .min(renewable_target - 5.0)
        .max(20.0);

    let targets = SustainabilityTargetsReport {
        carbon: sustainability
            .target_carbon_footprint
            .unwrap_or(carbon * 0.8),
        water: water * 0.85,
        waste: waste_target,
        renewable: renewable_target,
        green_materials_percentage: sustainability.green_materials_percentage,
    };

    EnvironmentalMetrics {
        footprint: Footprint {
            carbon,
            water,
            waste,
            renewable,
        },
        material_impact,
        equipment_impact,
        targets,
    }
}

fn material_impact(item: &MaterialItem) -> MaterialImpact {
    MaterialImpact {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: item.quantity(),
        carbon_footprint: round2(item.quantity() * carbon_factor(item.name())),
        unit: item.unit.clone().unwrap_or_else(|| "units".to_string()),
    }
}

/// Monthly diesel emissions in tons: fuel × qty × 8h × 22d × 2.68 / 1000.
fn equipment_impact(item: &EquipmentItem) -> EquipmentImpact {
    let tons = item.fuel_consumption()
        * item.quantity()
        * HOURS_PER_DAY
        * WORKING_DAYS_PER_MONTH
        * DIESEL_KG_PER_LITER
        / 1000.0;

    EquipmentImpact {
        id: item.id.clone(),
        name: item.name.clone(),
        quantity: item.quantity(),
        fuel_consumption: item.fuel_consumption(),
        carbon_footprint: round2(tons),
    }
}
