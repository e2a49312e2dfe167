pub mod dispatcher;
#[cfg(test)]
pub(crate) mod recording;

use std::{future::Future, pin::Pin, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

pub use dispatcher::Dispatcher;

pub type NotifyFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Delivers a "trigger fired" signal to an external target.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, url: &'a str) -> NotifyFuture<'a>;
}

/// Calls the target URL with an empty `POST`. Any 2xx status is a delivery.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: Client,
}

impl WebhookNotifier {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self { http })
    }
}

impl Notifier for WebhookNotifier {
    fn notify<'a>(&'a self, url: &'a str) -> NotifyFuture<'a> {
        Box::pin(async move {
            let status = self
                .http
                .post(url)
                .send()
                .await
                .with_context(|| format!("webhook request to {url} failed"))?
                .error_for_status()
                .with_context(|| format!("webhook {url} returned error status"))?
                .status();
            debug!(url = %url, status = %status, "Webhook delivered");
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
