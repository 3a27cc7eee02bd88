//! Webhook notification for found wallets.
//!
//! Posts a single-embed JSON message (Discord webhook layout). Delivery
//! failures are logged and never affect the outcome of the search.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

use crate::worker::FoundWallet;

const EMBED_COLOR: u32 = 3_066_993;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned non-success status: {0}")]
    Status(StatusCode),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.into(),
            value,
            inline,
        }
    }
}

impl WebhookPayload {
    /// Builds the message announcing `wallet`.
    ///
    /// The mnemonic is wrapped in spoiler markers so it is hidden until clicked.
    pub fn for_wallet(wallet: &FoundWallet, timestamp: DateTime<Utc>) -> Self {
        let mnemonic = wallet.mnemonic().unwrap_or("unavailable");

        Self {
            embeds: vec![Embed {
                title: "Solana Vanity Address Found!".into(),
                description: "A new wallet matching the criteria has been generated.".into(),
                color: EMBED_COLOR,
                fields: vec![
                    EmbedField::new("Public Key", format!("`{}`", wallet.address), false),
                    EmbedField::new("Mnemonic Phrase (Private)", format!("||`{}`||", mnemonic), false),
                    EmbedField::new("Time to Find", format_elapsed(wallet.elapsed), true),
                    EmbedField::new("Timestamp", format_timestamp(timestamp), true),
                ],
            }],
        }
    }
}

/// Posts payloads to one webhook URL.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Sends `payload` as JSON. Any non-2xx status is an error.
    pub fn send(&self, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let body = serde_json::to_vec(payload)?;
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Status(status))
        }
    }
}

/// Announces `wallet` at `url`, logging and swallowing any failure.
///
/// Returns true if the webhook accepted the message.
pub fn notify_found(url: &str, wallet: &FoundWallet) -> bool {
    let payload = WebhookPayload::for_wallet(wallet, Utc::now());
    let result = WebhookNotifier::new(url).and_then(|notifier| notifier.send(&payload));

    match result {
        Ok(()) => {
            info!("webhook notification delivered");
            true
        }
        Err(e) => {
            warn!(error = %e, "webhook notification failed");
            false
        }
    }
}

/// Formats a duration rounded to whole seconds, e.g. `1h2m3s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs() + u64::from(elapsed.subsec_millis() >= 500);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// RFC 1123 timestamp, e.g. `Mon, 02 Jan 2006 15:04:05 UTC`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%a, %d %b %Y %H:%M:%S UTC").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{DerivationMode, Keypair};
    use chrono::TimeZone;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use zeroize::Zeroizing;

    /// Serves one request on loopback with the given status line and returns
    /// the URL to post to plus the handle yielding the received request body.
    fn serve_once(status_line: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/webhook", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            // Read headers, then as much body as Content-Length announces.
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status_line
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (url, handle)
    }

    fn sample_wallet() -> FoundWallet {
        let keypair = Keypair::from_seed(&[7u8; 32]);
        FoundWallet {
            address: keypair.address(),
            keypair,
            mnemonic: Some(Zeroizing::new("word ".repeat(23) + "word")),
            mode: DerivationMode::Hd,
            worker_id: 3,
            candidates: 42,
            elapsed: Duration::from_millis(83_600),
        }
    }

    #[test]
    fn test_payload_shape() {
        let wallet = sample_wallet();
        let timestamp = Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        let payload = WebhookPayload::for_wallet(&wallet, timestamp);
        let json = serde_json::to_value(&payload).unwrap();

        let embeds = json["embeds"].as_array().unwrap();
        assert_eq!(embeds.len(), 1);
        let embed = &embeds[0];
        assert_eq!(embed["color"], 3066993);

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0]["value"], format!("`{}`", wallet.address));
        assert!(fields[1]["value"].as_str().unwrap().starts_with("||`word"));
        assert!(fields[1]["value"].as_str().unwrap().ends_with("`||"));
        assert_eq!(fields[2]["value"], "1m24s");
        assert_eq!(fields[3]["value"], "Mon, 02 Jan 2006 15:04:05 UTC");
        assert_eq!(fields[3]["inline"], true);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(400)), "0s");
        assert_eq!(format_elapsed(Duration::from_secs(59)), "59s");
        assert_eq!(format_elapsed(Duration::from_secs(3_723)), "1h2m3s");
    }

    #[test]
    fn test_error_status_is_reported() {
        let (url, server) = serve_once("500 Internal Server Error");
        let payload = WebhookPayload::for_wallet(&sample_wallet(), Utc::now());

        let result = WebhookNotifier::new(url).unwrap().send(&payload);
        assert!(matches!(
            result,
            Err(NotifyError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /webhook "));
        assert!(request.contains("\"embeds\""));
    }

    #[test]
    fn test_error_status_is_swallowed() {
        let (url, server) = serve_once("404 Not Found");
        assert!(!notify_found(&url, &sample_wallet()));
        server.join().unwrap();
    }

    #[test]
    fn test_success_status_is_accepted() {
        let (url, server) = serve_once("204 No Content");
        assert!(notify_found(&url, &sample_wallet()));
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_webhook_is_swallowed() {
        let wallet = sample_wallet();
        // Port 9 on loopback is not expected to be listening.
        assert!(!notify_found("http://127.0.0.1:9/webhook", &wallet));
    }
}
