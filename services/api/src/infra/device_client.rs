use anyhow::Context as _;
use std::time::Duration;

use crate::domain::repository::UnlockPort;

/// Controllers expose a plain HTTP relay endpoint on the lab network.
#[derive(Clone)]
pub struct HttpUnlockClient {
    pub http: reqwest::Client,
}

impl UnlockPort for HttpUnlockClient {
    async fn trigger_unlock(&self, ip: &str, api_token: &str) -> Result<(), anyhow::Error> {
        let url = format!("http://{ip}/open?apiToken={api_token}");
        self.http
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .context("unlock request failed")?
            .error_for_status()
            .context("unlock request rejected")?;
        Ok(())
    }
}
