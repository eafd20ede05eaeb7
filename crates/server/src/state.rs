use std::sync::Arc;
use tunerhls_core::{ChannelListClient, Config, SessionManager};

/// Shared application state
pub struct AppState {
    config: Config,
    sessions: Arc<SessionManager>,
    channels: ChannelListClient,
}

impl AppState {
    pub fn new(config: Config, sessions: Arc<SessionManager>, channels: ChannelListClient) -> Self {
        Self {
            config,
            sessions,
            channels,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn channels(&self) -> &ChannelListClient {
        &self.channels
    }
}
