//! Generic webhook sink: POST (or configured method) of the event as JSON
//! to an arbitrary URL with arbitrary headers.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use watchdog_core::{Event, NotificationSink};

use crate::NotifyFlags;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(30);

pub struct WebhookSink {
    url: String,
    method: String,
    headers: Vec<(String, String)>,
    flags: NotifyFlags,
}

impl WebhookSink {
    pub fn new(
        url: String,
        method: String,
        headers: Vec<(String, String)>,
        flags: NotifyFlags,
    ) -> Self {
        WebhookSink {
            url,
            method,
            headers,
            flags,
        }
    }
}

/// The event as a JSON payload, field names matching the original
/// notifier's wire format so existing webhook receivers keep working.
fn event_payload(event: &Event) -> serde_json::Value {
    serde_json::json!({
        "event_type": event.kind.as_str(),
        "service_name": event.service,
        "message": event.message,
        "timestamp": event.timestamp,
        "status": event.observation,
    })
}

impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    fn should_deliver(&self, event: &Event) -> bool {
        self.flags.admits(event)
    }

    fn deliver(&self, event: &Event) -> (bool, String) {
        let method = match Method::from_str(&self.method.to_uppercase()) {
            Ok(method) => method,
            Err(_) => return (false, format!("unsupported HTTP method: {}", self.method)),
        };

        let mut header_map = HeaderMap::new();
        for (key, value) in &self.headers {
            let name = match HeaderName::from_bytes(key.as_bytes()) {
                Ok(name) => name,
                Err(_) => return (false, format!("invalid header name: {key}")),
            };
            let value = match HeaderValue::from_str(value) {
                Ok(value) => value,
                Err(_) => return (false, format!("invalid header value for {key}")),
            };
            header_map.insert(name, value);
        }

        let client = match reqwest::blocking::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => return (false, format!("failed to build HTTP client: {e}")),
        };

        match client
            .request(method, &self.url)
            .headers(header_map)
            .json(&event_payload(event))
            .send()
        {
            Ok(response) if response.status().is_success() => {
                (true, "webhook delivered".to_string())
            }
            Ok(response) => (false, format!("webhook returned {}", response.status())),
            Err(e) => (false, format!("webhook request failed: {e}")),
        }
    }
}
