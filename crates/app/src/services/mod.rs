mod entitlements;
mod sampler;

use std::sync::Arc;

use crate::config::AppConfig;

pub use entitlements::{EntitlementService, ReconcileStats};
pub use sampler::{Probes, SampleReport, SamplerService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for the maintenance jobs.
#[derive(Clone)]
pub struct AppServices {
    pub entitlements: EntitlementService,
    pub sampler: SamplerService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            entitlements: EntitlementService::new(shared.clone()),
            sampler: SamplerService::new(shared),
        }
    }
}
