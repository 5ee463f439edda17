use crate::error::{AnalysisError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of an input row. Uploads use both numeric and string ids;
/// anything else (fractional numbers, booleans) is carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
    Other(Value),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
            ItemId::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Number(n)
    }
}

/// Impact rating shared by risks, bottlenecks and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    /// Multiplier applied to a probability when scoring a risk.
    pub fn weight(&self) -> f64 {
        match self {
            Impact::High => 3.0,
            Impact::Medium => 2.0,
            Impact::Low => 1.0,
        }
    }

    /// Parse a label. Only the exact `High` and `Medium` spellings count;
    /// anything else, including other casings, rates as `Low`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "High" => Impact::High,
            "Medium" => Impact::Medium,
            _ => Impact::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse an upload date: RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD` (UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render an instant as `2024-01-31T00:00:00.000Z`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<f64>,
}

impl MaterialItem {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or("Uncategorized")
    }

    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }

    pub fn unit_cost(&self) -> f64 {
        self.unit_cost.unwrap_or(0.0)
    }

    pub fn cost(&self) -> f64 {
        self.quantity() * self.unit_cost()
    }

    pub fn name_contains(&self, keyword: &str) -> bool {
        self.name().to_lowercase().contains(keyword)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_per_week: Option<f64>,
}

impl LaborItem {
    pub fn count(&self) -> f64 {
        self.count.unwrap_or(0.0)
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate.unwrap_or(0.0)
    }

    pub fn hours_per_week(&self) -> f64 {
        self.hours_per_week.unwrap_or(40.0)
    }

    /// Four weeks of wages for every worker on this line.
    pub fn monthly_cost(&self) -> f64 {
        self.count() * self.hourly_rate() * self.hours_per_week() * 4.0
    }

    /// Grouping key for the role distribution.
    pub fn role_category(&self) -> &str {
        self.role.as_deref().unwrap_or("Uncategorized")
    }

    /// Display label used in per-item outputs.
    pub fn label(&self) -> String {
        match (&self.role, &self.id) {
            (Some(role), _) => role.clone(),
            (None, Some(id)) => format!("Role {}", id),
            (None, None) => "Unassigned Role".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_consumption: Option<f64>,
}

impl EquipmentItem {
    pub fn quantity(&self) -> f64 {
        self.quantity.unwrap_or(1.0)
    }

    pub fn daily_rate(&self) -> f64 {
        self.daily_rate.unwrap_or(0.0)
    }

    pub fn fuel_consumption(&self) -> f64 {
        self.fuel_consumption.unwrap_or(0.0)
    }

    /// Rental cost over 22 working days.
    pub fn monthly_cost(&self) -> f64 {
        self.quantity() * self.daily_rate() * 22.0
    }

    pub fn label(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Equipment {}", id),
            (None, None) => "Unnamed Equipment".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePhase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<ItemId>,
}

impl SchedulePhase {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(parse_date)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date.as_deref().and_then(parse_date)
    }

    pub fn name(&self) -> &str {
        self.phase.as_deref().unwrap_or("Construction Phase")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RiskItem {
    pub fn probability(&self) -> f64 {
        self.probability.unwrap_or(0.3)
    }

    pub fn impact(&self) -> Impact {
        self.impact
            .as_deref()
            .map(Impact::from_label)
            .unwrap_or(Impact::Medium)
    }

    /// Label echoed back in the report; unknown labels are kept verbatim.
    pub fn impact_label(&self) -> String {
        self.impact.clone().unwrap_or_else(|| "Medium".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityTargets {
    pub waste_recycling_target: Option<f64>,
    pub renewable_energy_target: Option<f64>,
    pub target_carbon_footprint: Option<f64>,
    pub green_materials_percentage: Option<f64>,
}

/// Typed view over an uploaded project payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub materials: Vec<MaterialItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labor: Vec<LaborItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schedule: Vec<SchedulePhase>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risks: Vec<RiskItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sustainability: SustainabilityTargets,
    pub budget: Option<f64>,
    pub project_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ProjectInput {
    /// Validate and parse a raw payload.
    ///
    /// Only a missing, non-object or empty-object payload is rejected as empty;
    /// everything else is defaulted field by field.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) if !map.is_empty() => {
                Ok(serde_json::from_value(value.clone())?)
            }
            _ => Err(AnalysisError::EmptyInput),
        }
    }

    pub fn budget(&self) -> f64 {
        self.budget.unwrap_or(0.0)
    }

    pub fn project_type(&self) -> &str {
        self.project_type.as_deref().unwrap_or("Commercial")
    }

    /// Start date, or `now` when absent or unparseable.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.start_date.as_deref().and_then(parse_date).unwrap_or(now)
    }

    /// End date, or 180 days after `start` when absent or unparseable.
    pub fn end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        self.end_date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(start + chrono::Duration::days(180))
    }
}
