//! Telegram Bot API sink: Markdown-formatted message via `sendMessage`.

use std::time::Duration;

use watchdog_core::{Event, EventKind, NotificationSink};

use crate::NotifyFlags;

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TelegramSink {
    bot_token: String,
    chat_id: String,
    flags: NotifyFlags,
}

impl TelegramSink {
    pub fn new(bot_token: String, chat_id: String, flags: NotifyFlags) -> Self {
        TelegramSink {
            bot_token,
            chat_id,
            flags,
        }
    }
}

fn emoji(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Failure => "\u{1F534}",
        EventKind::Recovery => "\u{1F7E2}",
        EventKind::Restart => "\u{1F504}",
        EventKind::RestartFailed => "\u{26A0}\u{FE0F}",
    }
}

fn format_text(event: &Event) -> String {
    let mut text = format!(
        "{} *Service Watchdog*\n\n*Service:* `{}`\n*Event:* {}\n*Time:* {}\n*Message:* {}",
        emoji(event.kind),
        event.service,
        event.kind.as_str(),
        event.timestamp,
        event.message,
    );
    if let Some(error) = event
        .observation
        .as_ref()
        .and_then(|o| o.error_text.as_ref())
    {
        text.push_str(&format!("\n*Error:* {error}"));
    }
    text
}

impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    fn should_deliver(&self, event: &Event) -> bool {
        self.flags.admits(event)
    }

    fn deliver(&self, event: &Event) -> (bool, String) {
        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );
        let client = match reqwest::blocking::Client::builder()
            .timeout(TELEGRAM_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => return (false, format!("failed to build HTTP client: {e}")),
        };

        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": format_text(event),
            "parse_mode": "Markdown",
        });

        match client.post(&url).json(&body).send() {
            Ok(response) if response.status().is_success() => {
                (true, "telegram message delivered".to_string())
            }
            Ok(response) => (
                false,
                format!("telegram API returned {}", response.status()),
            ),
            Err(e) => (false, format!("telegram request failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchdog_core::Observation;

    fn event_with_error() -> Event {
        Event {
            kind: EventKind::Failure,
            service: "nginx".to_string(),
            message: "Service has failed 2 consecutive checks.".to_string(),
            timestamp: 1_700_000_000,
            observation: Some(Observation {
                running: false,
                probe_method: watchdog_core::ProbeMethod::TcpPort,
                pid: None,
                cpu_percent: None,
                memory_bytes: None,
                uptime_seconds: None,
                error_text: Some("port 80 not listening".to_string()),
            }),
        }
    }

    #[test]
    fn format_includes_service_event_and_error() {
        let text = format_text(&event_with_error());
        assert!(text.contains("nginx"));
        assert!(text.contains("FAILURE"));
        assert!(text.contains("port 80 not listening"));
    }

    #[test]
    fn format_omits_error_line_when_no_observation() {
        let event = Event {
            kind: EventKind::Recovery,
            service: "nginx".to_string(),
            message: "Service is now running normally.".to_string(),
            timestamp: 1_700_000_100,
            observation: None,
        };
        let text = format_text(&event);
        assert!(!text.contains("*Error:*"));
    }

    #[test]
    fn should_deliver_respects_flags() {
        let sink = TelegramSink::new(
            "token".to_string(),
            "chat".to_string(),
            NotifyFlags {
                on_failure: false,
                ..Default::default()
            },
        );
        assert!(!sink.should_deliver(&event_with_error()));
    }
}
