use reqwest::Client;

/// Client for the object store holding uploaded PGN files.
///
/// Game records carry a storage key; the actual bytes live in a public
/// bucket and are fetched over plain HTTPS at replay time.
#[derive(Clone)]
pub struct PgnStorage {
    client: Client,
    base_url: String,
}

impl PgnStorage {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .user_agent("ClubChess/1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    /// Fetch the raw PGN text stored at `key`.
    /// Transport and HTTP failures are surfaced as-is; no retry.
    pub async fn fetch_pgn(&self, key: &str) -> Result<String, String> {
        let url = self.object_url(key);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err("PGN file not found".to_string());
        }

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        resp.text()
            .await
            .map_err(|e| format!("Body read error: {e}"))
    }
}
