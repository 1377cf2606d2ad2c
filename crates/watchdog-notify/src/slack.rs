//! Slack incoming-webhook sink: a single colored attachment per event.

use std::time::Duration;

use watchdog_core::{Event, EventKind, NotificationSink};

use crate::NotifyFlags;

const SLACK_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SlackSink {
    webhook_url: String,
    channel: Option<String>,
    flags: NotifyFlags,
}

impl SlackSink {
    pub fn new(webhook_url: String, channel: Option<String>, flags: NotifyFlags) -> Self {
        SlackSink {
            webhook_url,
            channel,
            flags,
        }
    }
}

fn color(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Failure => "danger",
        EventKind::Recovery => "good",
        EventKind::Restart => "warning",
        EventKind::RestartFailed => "danger",
    }
}

fn build_payload(event: &Event, channel: Option<&str>) -> serde_json::Value {
    let mut fields = vec![
        serde_json::json!({"title": "Service", "value": event.service, "short": true}),
        serde_json::json!({"title": "Event", "value": event.kind.as_str(), "short": true}),
        serde_json::json!({"title": "Time", "value": event.timestamp.to_string(), "short": true}),
    ];
    if let Some(error) = event
        .observation
        .as_ref()
        .and_then(|o| o.error_text.as_ref())
    {
        fields.push(serde_json::json!({"title": "Error", "value": error, "short": false}));
    }

    let attachment = serde_json::json!({
        "color": color(event.kind),
        "title": format!("Service Watchdog: {}", event.kind.as_str()),
        "text": event.message,
        "fields": fields,
        "footer": "Service Watchdog",
        "ts": event.timestamp,
    });

    let mut payload = serde_json::json!({ "attachments": [attachment] });
    if let Some(channel) = channel {
        payload["channel"] = serde_json::Value::String(channel.to_string());
    }
    payload
}

impl NotificationSink for SlackSink {
    fn name(&self) -> &str {
        "slack"
    }

    fn should_deliver(&self, event: &Event) -> bool {
        self.flags.admits(event)
    }

    fn deliver(&self, event: &Event) -> (bool, String) {
        let client = match reqwest::blocking::Client::builder()
            .timeout(SLACK_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => return (false, format!("failed to build HTTP client: {e}")),
        };

        let payload = build_payload(event, self.channel.as_deref());

        match client.post(&self.webhook_url).json(&payload).send() {
            Ok(response) if response.status().is_success() => {
                (true, "slack message delivered".to_string())
            }
            Ok(response) => (false, format!("slack webhook returned {}", response.status())),
            Err(e) => (false, format!("slack request failed: {e}")),
        }
    }
}
