pub mod analyzer;
pub mod assistant;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod project;
pub mod sampling;
pub mod server;

pub use analyzer::report::{AnalysisReport, RiskLevel, Severity};
pub use analyzer::{analyze, Engine};
pub use assistant::{Assistant, AssistantReply};
pub use config::SiteLensConfig;
pub use error::AnalysisError;
pub use project::{Impact, ProjectInput};
