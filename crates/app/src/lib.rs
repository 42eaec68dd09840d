pub mod app;
pub mod config;
pub mod discord;
pub mod error;
pub mod probes;
pub mod services;
pub mod util;

pub use app::AppState;
pub use config::{AppConfig, Environment};
pub use discord::{DiscordApi, EntitlementSource, HttpLatencyProbe};
pub use error::{AppError, Result};
pub use probes::{LatencyProbe, ProcessStats, SystemProcessStats};
pub use services::{AppServices, Probes, ReconcileStats, SampleReport};
pub use util::time::RunClock;
