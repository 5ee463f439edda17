use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use sitelens_core::analyzer::report::{BottleneckReason, MAX_BOTTLENECKS};
use sitelens_core::project::{load_file, load_str, ProjectFormat};
use sitelens_core::sampling::{FixedClock, FixedSampler, RandomSampler};
use sitelens_core::{AnalysisError, AnalysisReport, Assistant, Engine, Impact, RiskLevel, Severity};
use std::path::{Path, PathBuf};

/// Get the workspace root (two levels up from CARGO_MANIFEST_DIR of sitelens-core).
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent()
        .unwrap() // crates/
        .parent()
        .unwrap() // workspace root
        .join("tests/fixtures")
}

fn project_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("projects").join(name)
}

/// Payloads the engine must reject; kept apart so directory scans skip them.
fn invalid_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("invalid").join(name)
}

fn mid_project() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn analyze_at(data: &Value, seed: u64, now: DateTime<Utc>) -> AnalysisReport {
    Engine::with_sources(RandomSampler::seeded(seed), FixedClock(now))
        .analyze(data)
        .unwrap()
}

fn downtown() -> Value {
    load_file(&project_fixture("downtown-office.json")).unwrap()
}

fn highrise() -> Value {
    load_file(&project_fixture("residential-highrise.yaml")).unwrap()
}

// ---- Full project fixtures ----

#[test]
fn test_downtown_office_costs() {
    let report = analyze_at(&downtown(), 42, mid_project());
    let metrics = &report.project_metrics;

    assert_eq!(metrics.project_type, "Commercial");
    assert_eq!(metrics.total_budget, 1_800_000.0);
    assert_eq!(metrics.total_material_cost, 322_000.0);
    assert_eq!(metrics.total_labor_cost, 327_040.0);
    assert_eq!(metrics.total_equipment_cost, 129_140.0);
    assert_eq!(report.total_cost(), 778_180.0);

    let budget = &report.budget_analysis;
    assert_eq!(budget.variance, 1_021_820.0);
    assert!((budget.utilization_rate - 43.2322).abs() < 0.01);
    assert!((budget.forecast - 778_180.0 * 1.05).abs() < 1e-6);
    assert_eq!(budget.recommendations.len(), 3);
}

#[test]
fn test_downtown_office_schedule() {
    let report = analyze_at(&downtown(), 42, mid_project());

    assert_eq!(report.project_metrics.project_duration, 228);
    assert_eq!(report.project_metrics.start_date, "2024-01-15T00:00:00.000Z");
    assert_eq!(report.project_metrics.end_date, "2024-08-30T00:00:00.000Z");
    assert_eq!(report.schedule_optimization.timeline_reduction_days, 12);
    assert_eq!(report.schedule_optimization.timeline_reduction, "12 days");

    let path: Vec<&str> = report
        .schedule_optimization
        .critical_path
        .iter()
        .map(|p| p.phase.as_str())
        .collect();
    assert_eq!(
        path,
        vec!["Structural Framework", "Finishing & Inspection", "Electrical & Plumbing"]
    );
    assert!(report
        .schedule_optimization
        .critical_path
        .iter()
        .all(|p| p.impact == Impact::High));

    let changes = &report.schedule_optimization.critical_path_changes;
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].task, "Structural Framework");
}

#[test]
fn test_completion_tracks_the_clock() {
    let data = downtown();
    let before = analyze_at(&data, 1, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    let after = analyze_at(&data, 1, Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap());
    let during = analyze_at(&data, 1, mid_project());

    assert_eq!(before.project_metrics.completion_percentage, 0.0);
    assert_eq!(after.project_metrics.completion_percentage, 100.0);
    let mid = during.project_metrics.completion_percentage;
    assert!(mid > 0.0 && mid < 100.0, "mid-project completion was {}", mid);
}

#[test]
fn test_downtown_office_risks() {
    let report = analyze_at(&downtown(), 42, mid_project());

    let titles: Vec<&str> = report.risk_assessment.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Weather", "Supply Chain", "Labor"]);

    let supply = &report.risk_assessment[1];
    assert!((supply.risk_score - 1.2).abs() < 1e-9);
    assert_eq!(supply.severity, Severity::High);
    assert_eq!(report.project_metrics.risk_level, RiskLevel::Medium);
    assert_eq!(report.risk_mitigation.len(), 3);
}

#[test]
fn test_downtown_office_bottlenecks() {
    let report = analyze_at(&downtown(), 42, mid_project());
    let resources = &report.resource_optimization;

    let labor: Vec<&str> = resources.labor.bottlenecks.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(labor, vec!["Electricians", "Plumbers", "Project Managers"]);
    assert_eq!(
        resources.labor.bottlenecks[2].reason,
        BottleneckReason::LimitedResources
    );

    let materials: Vec<&str> = resources
        .materials
        .bottlenecks
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(materials, vec!["Concrete", "Steel Beams"]);

    let equipment: Vec<&str> = resources
        .equipment
        .bottlenecks
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(equipment, vec!["Crane", "Bulldozer"]);
    assert!(resources
        .equipment
        .bottlenecks
        .iter()
        .all(|b| b.reason == BottleneckReason::HighCostEquipment));
}

#[test]
fn test_downtown_office_recommendations() {
    let report = analyze_at(&downtown(), 42, mid_project());
    let resources = &report.resource_optimization;

    assert_eq!(
        resources.labor.recommendations[0].title,
        "Optimize General Laborers Allocation"
    );
    let material_titles: Vec<&str> = resources
        .materials
        .recommendations
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    assert!(material_titles.contains(&"Optimize Concrete Mix Design"));
    assert!(material_titles.contains(&"Consolidate Steel Orders"));
    assert_eq!(resources.equipment.recommendations[0].title, "Optimize Crane Usage");
    assert_eq!(report.environmental_impact.recommendations.len(), 3);
}

#[test]
fn test_highrise_yaml_fixture() {
    let report = analyze_at(&highrise(), 42, mid_project());

    assert_eq!(report.project_metrics.project_type, "Residential");
    assert_eq!(report.project_metrics.project_duration, 364);
    assert_eq!(report.risk_assessment.len(), 5);
    assert_eq!(report.environmental_impact.targets.waste, 75.0);
    assert_eq!(report.environmental_impact.targets.renewable, 40.0);
    assert_eq!(report.schedule_optimization.critical_path.len(), 3);
    assert_eq!(
        report.schedule_optimization.critical_path[0].phase,
        "Structural Framework"
    );
}

// ---- Invariants ----

#[test]
fn test_seeded_analysis_is_repeatable() {
    for data in [downtown(), highrise()] {
        let first = serde_json::to_string(&analyze_at(&data, 7, mid_project())).unwrap();
        let second = serde_json::to_string(&analyze_at(&data, 7, mid_project())).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_project_data_is_echoed_verbatim() {
    let data = downtown();
    let report = analyze_at(&data, 3, mid_project());
    assert_eq!(report.project_data, data);
    assert_eq!(report.project_data["location"]["address"], "123 Main St, San Francisco, CA");
}

#[test]
fn test_yaml_and_json_produce_the_same_report() {
    let from_yaml = highrise();
    let as_json = serde_json::to_string(&from_yaml).unwrap();
    let from_json = load_str(&as_json, ProjectFormat::Json).unwrap();

    let a = serde_json::to_value(analyze_at(&from_yaml, 11, mid_project())).unwrap();
    let b = serde_json::to_value(analyze_at(&from_json, 11, mid_project())).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_bottleneck_lists_are_capped() {
    let labor: Vec<Value> = (0..8)
        .map(|i| {
            json!({"id": i, "role": format!("Specialist {}", i), "count": 1, "hourlyRate": 90})
        })
        .collect();
    let materials: Vec<Value> = (0..8)
        .map(|i| json!({"id": i, "name": format!("Fixture {}", i), "quantity": 2, "unitCost": 10}))
        .collect();
    let equipment: Vec<Value> = (0..8)
        .map(|i| json!({"id": i, "name": format!("Rig {}", i), "quantity": 1, "dailyRate": 900}))
        .collect();
    let data = json!({"labor": labor, "materials": materials, "equipment": equipment});

    let report = analyze_at(&data, 5, mid_project());
    let resources = &report.resource_optimization;
    assert_eq!(resources.labor.bottlenecks.len(), MAX_BOTTLENECKS);
    assert_eq!(resources.materials.bottlenecks.len(), MAX_BOTTLENECKS);
    assert_eq!(resources.equipment.bottlenecks.len(), MAX_BOTTLENECKS);
}

#[test]
fn test_labor_distribution_sums_to_about_100() {
    let report = analyze_at(&downtown(), 9, mid_project());
    let distribution = &report.resource_optimization.labor.distribution;
    let total: f64 = distribution.iter().map(|s| s.value).sum();
    assert!((total - 100.0).abs() <= distribution.len() as f64 / 2.0);
}

#[test]
fn test_simulated_fields_stay_in_range() {
    let report = analyze_at(&highrise(), 1234, mid_project());

    for line in &report.resource_optimization.labor.utilization {
        assert!(line.available <= line.assigned);
        assert!((0.0..=100.0).contains(&line.utilization_rate));
    }
    for line in &report.resource_optimization.materials.inventory {
        assert!(line.allocated <= line.quantity);
        assert!(line.remaining >= 0.0);
    }
    let footprint = &report.environmental_impact.current_footprint;
    assert!((60.0..=65.0).contains(&footprint.waste), "waste {}", footprint.waste);
    assert!((30.0..=35.0).contains(&footprint.renewable), "renewable {}", footprint.renewable);
}

#[test]
fn test_zero_budget_stays_finite() {
    let mut data = downtown();
    data["budget"] = json!(0);
    let report = analyze_at(&data, 2, mid_project());

    assert_eq!(report.budget_analysis.utilization_rate, 0.0);
    assert_eq!(report.budget_analysis.variance, -778_180.0);
    assert!(report.aggregate_figures().iter().all(|(_, v)| v.is_finite()));
}

// ---- Edge scenarios ----

#[test]
fn test_single_concrete_line() {
    let data = json!({
        "materials": [{
            "id": 1,
            "name": "Concrete",
            "quantity": 450,
            "unitCost": 125,
            "category": "Structural"
        }],
        "labor": [],
        "equipment": [],
        "schedule": [],
        "risks": [],
        "budget": 100000
    });
    let report = Engine::with_sources(FixedSampler(0.5), FixedClock(mid_project()))
        .analyze(&data)
        .unwrap();

    assert_eq!(report.project_metrics.total_material_cost, 56_250.0);
    assert_eq!(report.project_metrics.total_labor_cost, 0.0);
    assert_eq!(report.budget_analysis.utilization_rate, 56.25);
    assert_eq!(report.resource_optimization.materials.distribution.len(), 1);
    assert_eq!(report.resource_optimization.materials.distribution[0].value, 100.0);
    assert!(report.resource_optimization.labor.recommendations.is_empty());

    let titles: Vec<&str> = report.risk_assessment.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Weather", "Supply Chain", "Financial"]);
}

#[test]
fn test_month_long_project_without_phases() {
    let data = json!({"startDate": "2024-01-01", "endDate": "2024-01-31"});
    let report = Engine::with_sources(FixedSampler(0.5), FixedClock(mid_project()))
        .analyze(&data)
        .unwrap();

    assert_eq!(report.project_metrics.project_duration, 30);
    assert_eq!(report.project_metrics.completion_percentage, 0.0);
    assert_eq!(report.schedule_optimization.timeline_reduction_days, 2);
    assert!(report.schedule_optimization.critical_path.is_empty());
    assert!(report.schedule_optimization.critical_path_changes.is_empty());
}

#[test]
fn test_empty_fixture_is_rejected() {
    let data = load_file(&invalid_fixture("empty.json")).unwrap();
    let err = Engine::seeded(1).analyze(&data).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyInput));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_every_project_fixture_analyzes() {
    let pattern = format!("{}/**/*.*", fixtures_dir().join("projects").display());
    let files: Vec<PathBuf> = glob::glob(&pattern).unwrap().filter_map(|r| r.ok()).collect();
    assert!(files.len() >= 2);
    for file in files {
        let data = load_file(&file).unwrap();
        assert!(
            Engine::seeded(1).analyze(&data).is_ok(),
            "{} should analyze",
            file.display()
        );
    }
}

#[test]
fn test_fractional_ids_are_analyzed() {
    let data = json!({
        "materials": [{"id": 1.5, "name": "Steel", "quantity": 20, "unitCost": 900}],
        "schedule": [
            {"id": 0.5, "phase": "Survey", "startDate": "2024-01-01", "endDate": "2024-01-11"},
            {
                "id": 1.5,
                "phase": "Piling",
                "startDate": "2024-01-12",
                "endDate": "2024-02-11",
                "dependencies": [0.5]
            }
        ]
    });
    let report = analyze_at(&data, 4, mid_project());

    assert_eq!(report.project_metrics.total_material_cost, 18_000.0);
    assert_eq!(report.resource_optimization.materials.inventory.len(), 1);
    assert_eq!(report.schedule_optimization.critical_path[0].phase, "Piling");
    assert_eq!(report.project_data, data);
}

#[test]
fn test_mistyped_field_is_rejected() {
    let err = Engine::seeded(1)
        .analyze(&json!({"materials": "lots of concrete"}))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
    assert!(err.is_client_error());
}

// ---- Assistant over a real report ----

#[tokio::test]
async fn test_template_assistant_quotes_budget_figures() {
    let report = analyze_at(&downtown(), 42, mid_project());
    let reply = Assistant::template()
        .answer("Are we on budget?", Some(&report))
        .await;

    assert_eq!(reply.model, "template");
    assert!(reply.generated_text.contains("$1,800,000"));
}
