pub mod loader;
pub mod model;

pub use loader::{load_file, load_str, ProjectFormat};
pub use model::{
    format_timestamp, parse_date, EquipmentItem, Impact, ItemId, LaborItem, MaterialItem,
    ProjectInput, RiskItem, SchedulePhase, SustainabilityTargets,
};
