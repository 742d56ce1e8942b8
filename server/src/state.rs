use std::sync::Arc;

use crate::relay::RelayHub;

#[derive(Clone, Default)]
pub struct AppState {
    pub hub: Arc<RelayHub>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
