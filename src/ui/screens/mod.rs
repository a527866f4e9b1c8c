pub mod chart;
pub mod dashboard;
pub mod schedule;
pub mod settings;

pub use chart::ChartScreen;
pub use dashboard::DashboardScreen;
pub use schedule::ScheduleScreen;
pub use settings::{SettingsField, SettingsScreen};
