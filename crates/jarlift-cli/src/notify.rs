use std::time::Duration;

use anyhow::{bail, Context, Result};
use jarlift_core::NotifyConfig;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{info, warn};

use crate::render::TerminalRenderer;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
/// Discord rejects message content longer than this.
const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

pub(crate) fn failure_message(operation: &str, err: &anyhow::Error) -> String {
    let message = format!("jarlift {operation} failed: {err:#}");
    if message.chars().count() <= MAX_CONTENT_CHARS {
        return message;
    }
    let mut truncated = message
        .chars()
        .take(MAX_CONTENT_CHARS - 3)
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

pub(crate) fn webhook_payload(content: &str) -> Result<String> {
    serde_json::to_string(&WebhookMessage { content })
        .context("failed to encode webhook payload")
}

pub(crate) fn webhook_client() -> Result<Client> {
    Client::builder()
        .timeout(WEBHOOK_TIMEOUT)
        .build()
        .context("notify-failed: failed to build HTTP client")
}

pub(crate) fn send_webhook(client: &Client, url: &str, content: &str) -> Result<()> {
    let payload = webhook_payload(content)?;
    let response = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .context("notify-failed: webhook request failed")?;

    let status = response.status();
    if !status.is_success() {
        bail!("notify-failed: webhook returned {status}");
    }
    Ok(())
}

/// Posts the failure to the configured webhook. Never fails the caller.
pub(crate) fn notify_failure_best_effort(
    notify: &NotifyConfig,
    operation: &str,
    err: &anyhow::Error,
    renderer: TerminalRenderer,
) {
    if notify.webhook_url.is_none() {
        return;
    }
    match webhook_client() {
        Ok(client) => notify_failure_with_client(&client, notify, operation, err, renderer),
        Err(client_err) => {
            warn!(operation, error = %client_err, "failure notification not delivered");
            renderer.print_status("warn", &format!("{client_err:#}"));
        }
    }
}

pub(crate) fn notify_failure_with_client(
    client: &Client,
    notify: &NotifyConfig,
    operation: &str,
    err: &anyhow::Error,
    renderer: TerminalRenderer,
) {
    let Some(url) = notify.webhook_url.as_deref() else {
        return;
    };

    match send_webhook(client, url, &failure_message(operation, err)) {
        Ok(()) => info!(operation, "failure notification sent"),
        Err(notify_err) => {
            warn!(operation, error = %notify_err, "failure notification not delivered");
            renderer.print_status("warn", &format!("{notify_err:#}"));
        }
    }
}
