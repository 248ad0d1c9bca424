use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub sheets_spreadsheet_id: String,
    pub sheets_client_email: String,
    pub sheets_private_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "bosscars.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "changeme".to_string()),
            sheets_spreadsheet_id: env::var("GOOGLE_SHEETS_SPREADSHEET_ID").unwrap_or_default(),
            sheets_client_email: env::var("GOOGLE_SHEETS_CLIENT_EMAIL").unwrap_or_default(),
            sheets_private_key: env::var("GOOGLE_SHEETS_PRIVATE_KEY").unwrap_or_default(),
        }
    }
}
