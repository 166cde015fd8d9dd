// /////////////////////////////////////////////////////////////////////////////
// Offline Update Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `http_check`: polls a URL up to `retries` times, `delay_secs` apart,
//! until it sees `expected_status` or runs out of attempts.

use async_trait::async_trait;
use std::time::Duration;

use updater_domain::{CheckExecutor, ExecutionContext, UpdaterError};

pub struct HttpCheck {
    pub url: String,
    pub expected_status: u16,
    pub retries: u32,
    pub delay_secs: u64,
    pub timeout_secs: u64,
}

#[async_trait]
impl CheckExecutor for HttpCheck {
    async fn run(&self, _ctx: &ExecutionContext) -> Result<(), UpdaterError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| UpdaterError::check_failed(format!("http_check: building client: {e}")))?;

        let mut last_err = String::new();
        for attempt in 0..self.retries.max(1) {
            match client.get(&self.url).send().await {
                Ok(resp) if resp.status().as_u16() == self.expected_status => return Ok(()),
                Ok(resp) => last_err = format!("got status {}", resp.status()),
                Err(e) => last_err = e.to_string(),
            }
            if attempt + 1 < self.retries.max(1) {
                tokio::time::sleep(Duration::from_secs(self.delay_secs)).await;
            }
        }
        Err(UpdaterError::check_failed(format!("http_check: {} did not return {} after {} attempt(s): {last_err}", self.url, self.expected_status, self.retries.max(1))))
    }

    fn kind(&self) -> &'static str {
        "http_check"
    }
}
