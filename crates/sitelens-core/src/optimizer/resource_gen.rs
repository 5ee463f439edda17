use super::{first_max_by_key, or_fallback};
use crate::analyzer::equipment::EquipmentMetrics;
use crate::analyzer::labor::LaborMetrics;
use crate::analyzer::materials::MaterialMetrics;
use crate::analyzer::report::{Bottleneck, Recommendation};
use crate::project::{EquipmentItem, Impact, LaborItem, MaterialItem};

fn bottleneck_recommendation(
    id: u32,
    title: String,
    bottleneck: &Bottleneck,
    savings: f64,
    carbon: &str,
) -> Recommendation {
    Recommendation::new(id, title, bottleneck.mitigation.clone(), bottleneck.impact)
        .with_savings(savings)
        .with_carbon(carbon)
}

pub fn labor_recommendations(labor: &[LaborItem], metrics: &LaborMetrics) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    if labor.is_empty() {
        return recs;
    }

    if let Some(top) = first_max_by_key(labor, |l| l.hourly_rate() * l.count()) {
        let role = top.label();
        let weekly = or_fallback(top.hourly_rate, 30.0) * or_fallback(top.count, 5.0) * 40.0;
        recs.push(
            Recommendation::new(
                1,
                format!("Optimize {} Allocation", role),
                format!(
                    "Redistribute {} resources more efficiently across project phases.",
                    role
                ),
                Impact::High,
            )
            .with_savings(weekly * 0.15)
            .with_carbon("1.2"),
        );
    }

    recs.push(
        Recommendation::new(
            2,
            "Implement Skill Cross-Training",
            "Cross-train workers to perform multiple roles, reducing idle time and increasing \
             flexibility.",
            Impact::Medium,
        )
        .with_savings(metrics.total_cost * 0.08)
        .with_carbon("0.8"),
    );

    if let Some(bottleneck) = metrics.bottlenecks.first() {
        recs.push(bottleneck_recommendation(
            3,
            format!("Address {} Bottleneck", bottleneck.name),
            bottleneck,
            metrics.total_cost * 0.05,
            "0.5",
        ));
    }

    recs
}

pub fn material_recommendations(
    materials: &[MaterialItem],
    metrics: &MaterialMetrics,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    if materials.is_empty() {
        return recs;
    }

    let concrete: Vec<&MaterialItem> =
        materials.iter().filter(|m| m.name_contains("concrete")).collect();
    let steel: Vec<&MaterialItem> = materials.iter().filter(|m| m.name_contains("steel")).collect();

    if !concrete.is_empty() {
        let spend: f64 = concrete
            .iter()
            .map(|m| m.quantity() * or_fallback(m.unit_cost, 100.0))
            .sum();
        let carbon: f64 = concrete.iter().map(|m| m.quantity() * 0.5).sum();
        recs.push(
            Recommendation::new(
                1,
                "Optimize Concrete Mix Design",
                "Use optimized concrete mix with supplementary cementitious materials to reduce \
                 cement content.",
                Impact::High,
            )
            .with_savings(spend * 0.12)
            .with_carbon(carbon.round()),
        );
    }

    if !steel.is_empty() {
        let spend: f64 = steel
            .iter()
            .map(|m| m.quantity() * or_fallback(m.unit_cost, 1000.0))
            .sum();
        recs.push(
            Recommendation::new(
                2,
                "Consolidate Steel Orders",
                "Consolidate steel orders to reduce delivery costs and negotiate volume discounts.",
                Impact::Medium,
            )
            .with_savings(spend * 0.08)
            .with_carbon("2.4"),
        );
    }

    if recs.len() < 2 {
        recs.push(
            Recommendation::new(
                recs.len() as u32 + 1,
                "Implement Just-in-Time Delivery",
                "Schedule material deliveries to arrive just before they're needed to reduce \
                 storage costs and waste.",
                Impact::Medium,
            )
            .with_savings(metrics.total_cost * 0.05)
            .with_carbon("1.5"),
        );
    }

    if let Some(bottleneck) = metrics.bottlenecks.first() {
        recs.push(bottleneck_recommendation(
            recs.len() as u32 + 1,
            format!("Address {} Supply Risk", bottleneck.name),
            bottleneck,
            metrics.total_cost * 0.04,
            "0.9",
        ));
    }

    recs
}

pub fn equipment_recommendations(
    equipment: &[EquipmentItem],
    metrics: &EquipmentMetrics,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();
    if equipment.is_empty() {
        return recs;
    }

    if let Some(top) = first_max_by_key(equipment, |e| e.daily_rate() * e.quantity()) {
        let name = top.label();
        let savings = or_fallback(top.daily_rate, 500.0) * top.quantity() * 30.0 * 0.2;
        let carbon = (or_fallback(top.fuel_consumption, 10.0) * 0.6).round();
        recs.push(
            Recommendation::new(
                1,
                format!("Optimize {} Usage", name),
                format!(
                    "Improve scheduling of {} to reduce idle time and maximize utilization.",
                    name
                ),
                Impact::High,
            )
            .with_savings(savings)
            .with_carbon(carbon),
        );
    }

    recs.push(
        Recommendation::new(
            2,
            "Implement Equipment Sharing",
            "Share equipment between project phases or with nearby construction sites to reduce \
             rental costs.",
            Impact::Medium,
        )
        .with_savings(metrics.total_cost * 0.15)
        .with_carbon("3.2"),
    );

    if let Some(bottleneck) = metrics.bottlenecks.first() {
        recs.push(bottleneck_recommendation(
            3,
            format!("Address {} Bottleneck", bottleneck.name),
            bottleneck,
            metrics.total_cost * 0.07,
            "1.8",
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::equipment::calculate_equipment_metrics;
    use crate::analyzer::labor::calculate_labor_metrics;
    use crate::analyzer::materials::calculate_material_metrics;
    use crate::sampling::FixedSampler;
    use chrono::Utc;

    fn crew(role: &str, count: f64, rate: f64) -> LaborItem {
        LaborItem {
            role: Some(role.into()),
            count: Some(count),
            hourly_rate: Some(rate),
            ..Default::default()
        }
    }

    fn material(name: &str, quantity: f64, unit_cost: Option<f64>) -> MaterialItem {
        MaterialItem {
            name: Some(name.into()),
            category: Some("Structural".into()),
            quantity: Some(quantity),
            unit_cost,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_labor_no_recommendations() {
        assert!(labor_recommendations(&[], &LaborMetrics::default()).is_empty());
    }

    #[test]
    fn test_labor_templates() {
        let crews = vec![crew("Carpenters", 12.0, 35.0), crew("Electricians", 10.0, 45.0)];
        let metrics = calculate_labor_metrics(&crews, &mut FixedSampler(0.0), Utc::now());
        let recs = labor_recommendations(&crews, &metrics);

        assert_eq!(recs[0].title, "Optimize Electricians Allocation");
        // 45 * 10 * 40 * 0.15
        assert_eq!(recs[0].savings_estimate.as_deref(), Some("$2,700"));
        assert_eq!(recs[0].carbon_reduction.as_deref(), Some("1.2 tons CO₂e"));
        assert_eq!(recs[1].title, "Implement Skill Cross-Training");
        assert_eq!(recs[2].title, "Address Electricians Bottleneck");
        assert_eq!(recs[2].impact, Impact::High);
    }

    #[test]
    fn test_concrete_and_steel_templates() {
        let items = vec![
            material("Concrete", 450.0, Some(125.0)),
            material("Steel Rebar", 20.0, None),
        ];
        let metrics = calculate_material_metrics(&items, &mut FixedSampler(0.0), Utc::now());
        let recs = material_recommendations(&items, &metrics);
        let titles: Vec<&str> = recs.iter().map(|r| r.title.as_str()).collect();

        assert_eq!(
            titles,
            vec![
                "Optimize Concrete Mix Design",
                "Consolidate Steel Orders",
                "Address Concrete Supply Risk"
            ]
        );
        // 450 * 125 * 0.12
        assert_eq!(recs[0].savings_estimate.as_deref(), Some("$6,750"));
        assert_eq!(recs[0].carbon_reduction.as_deref(), Some("225 tons CO₂e"));
        // steel unit cost falls back to 1000: 20 * 1000 * 0.08
        assert_eq!(recs[1].savings_estimate.as_deref(), Some("$1,600"));
        assert_eq!(recs[2].id, 3);
    }

    #[test]
    fn test_just_in_time_fills_short_list() {
        let items = vec![
            material("Gravel", 500.0, Some(10.0)),
            material("Sand", 500.0, Some(10.0)),
        ];
        let metrics = calculate_material_metrics(&items, &mut FixedSampler(0.0), Utc::now());
        let recs = material_recommendations(&items, &metrics);
        assert_eq!(recs[0].id, 1);
        assert_eq!(recs[0].title, "Implement Just-in-Time Delivery");
        assert_eq!(recs[0].savings_estimate.as_deref(), Some("$500"));
        assert_eq!(recs[1].title, "Address Gravel Supply Risk");
        assert_eq!(recs[1].id, 2);
    }

    #[test]
    fn test_equipment_templates() {
        let fleet = vec![
            EquipmentItem {
                name: Some("Excavator".into()),
                quantity: Some(2.0),
                daily_rate: Some(450.0),
                fuel_consumption: Some(12.0),
                ..Default::default()
            },
            EquipmentItem {
                name: Some("Crane".into()),
                quantity: Some(1.0),
                daily_rate: Some(1200.0),
                fuel_consumption: None,
                ..Default::default()
            },
        ];
        let metrics = calculate_equipment_metrics(&fleet, &mut FixedSampler(0.0), Utc::now());
        let recs = equipment_recommendations(&fleet, &metrics);

        assert_eq!(recs[0].title, "Optimize Crane Usage");
        // 1200 * 1 * 30 * 0.2
        assert_eq!(recs[0].savings_estimate.as_deref(), Some("$7,200"));
        // fuel falls back to 10
        assert_eq!(recs[0].carbon_reduction.as_deref(), Some("6 tons CO₂e"));
        assert_eq!(recs[2].title, "Address Crane Bottleneck");
        // single crane: backup advice rather than cost advice
        assert_eq!(recs[2].description, "Arrange backup equipment or rental options");
        assert_eq!(recs[2].impact, Impact::Medium);
    }
}
