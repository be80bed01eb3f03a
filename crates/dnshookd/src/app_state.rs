use std::sync::Arc;

use dnshook_core::HookEngine;

use crate::auth::Authenticator;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub(crate) engine: Arc<HookEngine>,
    pub(crate) auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(engine: HookEngine, auth: Authenticator) -> Self {
        Self {
            engine: Arc::new(engine),
            auth: Arc::new(auth),
        }
    }
}
