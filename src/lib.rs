pub mod config;
pub mod relay;

use std::sync::Arc;

use axum::extract::FromRef;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub hub: Arc<relay::Hub>,
}
