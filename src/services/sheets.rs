use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{Booking, Review};

/// Spreadsheet mirror of bookings and reviews. Best-effort reporting copy,
/// never a source of truth: failures surface only through the mirrored flag
/// staying false, and a manual sync pushes the full state later.
#[async_trait]
pub trait MirrorProvider: Send + Sync {
    /// False when credentials are absent or placeholders. Best-effort call
    /// sites skip silently; explicit sync operations report an error.
    fn is_configured(&self) -> bool;

    async fn add_booking(&self, booking: &Booking) -> anyhow::Result<()>;
    async fn update_booking(&self, booking: &Booking) -> anyhow::Result<()>;
    async fn replace_bookings(&self, bookings: &[Booking]) -> anyhow::Result<()>;
    async fn add_review(&self, review: &Review) -> anyhow::Result<()>;
    async fn replace_reviews(&self, reviews: &[Review]) -> anyhow::Result<()>;
}

const BOOKINGS_RANGE: &str = "Sheet1!A:N";
const BOOKINGS_DATA_RANGE: &str = "Sheet1!A2:N";
const BOOKINGS_HEADER_RANGE: &str = "Sheet1!A1:N1";
const REVIEWS_RANGE: &str = "Reviews!A:K";
const REVIEWS_DATA_RANGE: &str = "Reviews!A2:K";
const REVIEWS_HEADER_RANGE: &str = "Reviews!A1:K1";

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Google Sheets mirror using a service account. Explicitly constructed and
/// injected; never a lazily-initialized global.
pub struct SheetsMirror {
    spreadsheet_id: String,
    client_email: String,
    private_key: String,
    configured: bool,
    client: reqwest::Client,
    token: tokio::sync::Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: std::time::Instant,
}

#[derive(Debug, serde::Serialize)]
struct TokenClaims {
    iss: String,
    scope: String,
    aud: String,
    exp: u64,
    iat: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl SheetsMirror {
    pub fn new(spreadsheet_id: String, client_email: String, private_key: String) -> Self {
        let configured = !spreadsheet_id.is_empty()
            && !client_email.is_empty()
            && !private_key.is_empty()
            && !client_email.contains("your-service-account")
            && !private_key.contains("YOUR_PRIVATE_KEY_HERE")
            && !spreadsheet_id.contains("your_spreadsheet_id");

        if configured {
            tracing::info!("Google Sheets mirror configured");
        } else {
            tracing::info!("Google Sheets mirror not configured, mirroring disabled");
        }

        Self {
            spreadsheet_id,
            client_email,
            // .env files carry the key with literal \n escapes
            private_key: private_key.replace("\\n", "\n"),
            configured,
            client: reqwest::Client::new(),
            token: tokio::sync::Mutex::new(None),
        }
    }

    /// Service-account OAuth flow: sign an RS256 assertion and trade it for a
    /// short-lived access token, cached until close to expiry.
    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > std::time::Instant::now() {
                return Ok(token.access_token.clone());
            }
        }

        let now = chrono::Utc::now().timestamp() as u64;
        let claims = TokenClaims {
            iss: self.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: TOKEN_URL.to_string(),
            exp: now + 3600,
            iat: now,
        };

        let key = jsonwebtoken::EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("invalid service account private key")?;
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &key,
        )
        .context("failed to sign token assertion")?;

        let response: TokenResponse = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("token exchange request failed")?
            .error_for_status()
            .context("token exchange rejected")?
            .json()
            .await
            .context("malformed token response")?;

        let access_token = response.access_token.clone();
        *cached = Some(CachedToken {
            access_token: response.access_token,
            // refresh a minute early
            expires_at: std::time::Instant::now()
                + std::time::Duration::from_secs(response.expires_in.saturating_sub(60)),
        });

        Ok(access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}{}",
            self.spreadsheet_id, range, suffix
        )
    }

    async fn append_row(&self, range: &str, row: Vec<Value>) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        self.client
            .post(self.values_url(range, ":append?valueInputOption=RAW&insertDataOption=INSERT_ROWS"))
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .context("sheets append request failed")?
            .error_for_status()
            .context("sheets append rejected")?;
        Ok(())
    }

    async fn write_range(&self, range: &str, values: Vec<Vec<Value>>) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        self.client
            .put(self.values_url(range, "?valueInputOption=RAW"))
            .bearer_auth(token)
            .json(&json!({ "values": values }))
            .send()
            .await
            .context("sheets update request failed")?
            .error_for_status()
            .context("sheets update rejected")?;
        Ok(())
    }

    async fn clear_range(&self, range: &str) -> anyhow::Result<()> {
        let token = self.access_token().await?;
        self.client
            .post(self.values_url(range, ":clear"))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .context("sheets clear request failed")?
            .error_for_status()
            .context("sheets clear rejected")?;
        Ok(())
    }

    /// Index of the data row whose first column holds `id`, 1-based as the
    /// sheets API counts rows. None when the id is not in the sheet yet.
    async fn find_row_by_id(&self, id: &str) -> anyhow::Result<Option<usize>> {
        let token = self.access_token().await?;
        let response: Value = self
            .client
            .get(self.values_url("Sheet1!A:A", ""))
            .bearer_auth(token)
            .send()
            .await
            .context("sheets lookup request failed")?
            .error_for_status()
            .context("sheets lookup rejected")?
            .json()
            .await
            .context("malformed sheets lookup response")?;

        let rows = response
            .get("values")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        Ok(rows
            .iter()
            .position(|row| row.get(0).and_then(|c| c.as_str()) == Some(id))
            .map(|idx| idx + 1))
    }
}

#[async_trait]
impl MirrorProvider for SheetsMirror {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn add_booking(&self, booking: &Booking) -> anyhow::Result<()> {
        self.append_row(BOOKINGS_RANGE, booking_row(booking)).await?;
        tracing::info!(booking_id = %booking.id, "booking mirrored to sheet");
        Ok(())
    }

    async fn update_booking(&self, booking: &Booking) -> anyhow::Result<()> {
        match self.find_row_by_id(&booking.id).await? {
            Some(row) => {
                let range = format!("Sheet1!A{row}:N{row}");
                self.write_range(&range, vec![booking_row(booking)]).await?;
                tracing::info!(booking_id = %booking.id, "booking row updated in sheet");
                Ok(())
            }
            // Not in the sheet yet (earlier append failed): append now.
            None => self.add_booking(booking).await,
        }
    }

    async fn replace_bookings(&self, bookings: &[Booking]) -> anyhow::Result<()> {
        self.write_range(BOOKINGS_HEADER_RANGE, vec![booking_header()])
            .await?;
        self.clear_range(BOOKINGS_DATA_RANGE).await?;
        if !bookings.is_empty() {
            let values = bookings.iter().map(booking_row).collect();
            self.write_range(BOOKINGS_DATA_RANGE, values).await?;
        }
        tracing::info!(count = bookings.len(), "bookings batch-synced to sheet");
        Ok(())
    }

    async fn add_review(&self, review: &Review) -> anyhow::Result<()> {
        self.append_row(REVIEWS_RANGE, review_row(review)).await?;
        tracing::info!(review_id = %review.id, "review mirrored to sheet");
        Ok(())
    }

    async fn replace_reviews(&self, reviews: &[Review]) -> anyhow::Result<()> {
        self.write_range(REVIEWS_HEADER_RANGE, vec![review_header()])
            .await?;
        self.clear_range(REVIEWS_DATA_RANGE).await?;
        if !reviews.is_empty() {
            let values = reviews.iter().map(review_row).collect();
            self.write_range(REVIEWS_DATA_RANGE, values).await?;
        }
        tracing::info!(count = reviews.len(), "reviews batch-synced to sheet");
        Ok(())
    }
}

fn booking_header() -> Vec<Value> {
    [
        "Booking ID",
        "Name",
        "Type",
        "Car Type",
        "Pickup Location",
        "Drop Location",
        "Travel Date",
        "Travel Time",
        "Email",
        "Mobile",
        "Status",
        "Mirrored",
        "Created At",
        "Updated At",
    ]
    .iter()
    .map(|s| json!(s))
    .collect()
}

fn booking_row(booking: &Booking) -> Vec<Value> {
    vec![
        json!(booking.id),
        json!(booking.name),
        json!(booking.service_type.as_str()),
        json!(booking.car_type.map(|c| c.as_str()).unwrap_or("N/A")),
        json!(booking.pickup_location),
        json!(booking.drop_location),
        json!(booking.travel_date),
        json!(booking.travel_time),
        json!(booking.email.as_deref().unwrap_or("N/A")),
        json!(booking.mobile),
        json!(booking.status.as_str()),
        json!(if booking.mirrored { "Yes" } else { "No" }),
        json!(booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        json!(booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]
}

fn review_header() -> Vec<Value> {
    [
        "Review ID",
        "Customer Name",
        "Booking ID",
        "Service Type",
        "Rating",
        "Comment",
        "Trip Date",
        "Verified",
        "Verified At",
        "Created At",
        "Updated At",
    ]
    .iter()
    .map(|s| json!(s))
    .collect()
}

fn review_row(review: &Review) -> Vec<Value> {
    vec![
        json!(review.id),
        json!(review.customer_name),
        json!(review.booking_id),
        json!(review.service_type.as_str()),
        json!(review.rating),
        json!(review.comment),
        json!(review.trip_date),
        json!(if review.verified { "Yes" } else { "No" }),
        json!(review
            .verified_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Not Verified".to_string())),
        json!(review.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        json!(review.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]
}
