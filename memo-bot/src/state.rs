use std::sync::Arc;

use axum::extract::FromRef;

use crate::{bot::CommandRouter, config::Config, telegram::TelegramClient};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub router: Arc<CommandRouter>,
    pub telegram: TelegramClient,
    pub config: Arc<Config>,
}
