//! Per-region state handed to every sweeper

use super::orchestrator::SweepOrchestrator;
use crate::aws::RegionalClients;
use std::sync::Arc;

/// What one sweeper invocation gets: its region, the deletion policy and
/// the lazily connected clients for that region.
#[derive(Debug)]
pub struct SweepContext {
    region: String,
    orchestrator: SweepOrchestrator,
    clients: Arc<RegionalClients>,
}

impl SweepContext {
    pub fn new(
        region: impl Into<String>,
        orchestrator: SweepOrchestrator,
        clients: Arc<RegionalClients>,
    ) -> Self {
        Self {
            region: region.into(),
            orchestrator,
            clients,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn orchestrator(&self) -> &SweepOrchestrator {
        &self.orchestrator
    }

    pub fn clients(&self) -> &Arc<RegionalClients> {
        &self.clients
    }
}
