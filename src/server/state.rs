use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::AdminGate;
use crate::store::CategoryStore;

pub struct AppState {
    pub store: CategoryStore,
    pub gate: AdminGate,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: CategoryStore, gate: AdminGate) -> Arc<Self> {
        Arc::new(Self {
            store,
            gate,
            started_at: Utc::now(),
        })
    }
}
