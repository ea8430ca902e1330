use trellis_engine::RunService;

/// Application state shared across handlers: one run service per domain.
pub struct AppState {
    pipelines: RunService,
    policies: RunService,
}

impl AppState {
    pub fn new(pipelines: RunService, policies: RunService) -> Self {
        Self {
            pipelines,
            policies,
        }
    }

    pub fn service_for(&self, domain: &str) -> Option<&RunService> {
        match domain {
            "pipeline" => Some(&self.pipelines),
            "policy" => Some(&self.policies),
            _ => None,
        }
    }
}
