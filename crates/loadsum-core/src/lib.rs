pub mod error;
pub mod report;
pub mod resources;
pub mod runs;

pub use error::LoadsumError;
pub use report::{build_report, Report, ReportConfig, ResultsDir};
pub use resources::classify::{aggregate, classify, Role, RoleAverages, ScenarioBucketAverages};
pub use resources::{parse_blocks, ResourceMetric, ResourceSample, ScenarioBlock};
pub use runs::filename::{tag_from_path, RunTag, ScenarioTag};
pub use runs::{RunRecord, RUN_DURATION_SECS};
