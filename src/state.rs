use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::messaging::SmsProvider;
use crate::services::sheets::MirrorProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub sms: Box<dyn SmsProvider>,
    pub mirror: Box<dyn MirrorProvider>,
}
