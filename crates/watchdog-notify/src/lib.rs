// SPDX-License-Identifier: Apache-2.0

//! Notifier sinks for the watchdog daemon: Telegram, Slack, email, and
//! generic webhooks, plus the common enable/event-kind filtering every
//! transport shares (§9 "Plugin polymorphism").
//!
//! Each transport is a variant of [`Transport`], a closed sum type over the
//! four kinds the daemon understands. `watchdog-config` parses the `type:`
//! tag from YAML and hands back a [`NotifierSpec`]; [`build_sink`] turns
//! that into the boxed `NotificationSink` the scheduler actually calls.

mod email;
mod slack;
mod telegram;
mod webhook;

use watchdog_core::{Event, EventKind, NotificationSink};

pub use email::EmailSink;
pub use slack::SlackSink;
pub use telegram::TelegramSink;
pub use webhook::WebhookSink;

/// One transport and its transport-specific settings. The known tags are
/// closed; an unrecognized `type:` in config is a parse-time error in
/// `watchdog-config`, not a runtime one here.
#[derive(Debug, Clone)]
pub enum Transport {
    Telegram {
        bot_token: String,
        chat_id: String,
    },
    Slack {
        webhook_url: String,
        channel: Option<String>,
    },
    Email {
        smtp_host: String,
        smtp_port: u16,
        smtp_user: Option<String>,
        smtp_password: Option<String>,
        from_addr: String,
        to_addrs: Vec<String>,
    },
    Webhook {
        url: String,
        method: String,
        headers: Vec<(String, String)>,
    },
}

/// Delivery flags shared by every notifier, independent of transport
/// (mirrors the original's `on_failure`/`on_recovery`/`on_restart` trio;
/// `RESTART` and `RESTART_FAILED` share `on_restart`).
#[derive(Debug, Clone)]
pub struct NotifyFlags {
    pub enabled: bool,
    pub on_failure: bool,
    pub on_recovery: bool,
    pub on_restart: bool,
}

impl Default for NotifyFlags {
    fn default() -> Self {
        NotifyFlags {
            enabled: true,
            on_failure: true,
            on_recovery: true,
            on_restart: true,
        }
    }
}

impl NotifyFlags {
    fn admits(&self, event: &Event) -> bool {
        if !self.enabled {
            return false;
        }
        match event.kind {
            EventKind::Failure => self.on_failure,
            EventKind::Recovery => self.on_recovery,
            EventKind::Restart | EventKind::RestartFailed => self.on_restart,
        }
    }
}

/// One configured notifier: a transport plus the flags that gate it.
#[derive(Debug, Clone)]
pub struct NotifierSpec {
    pub transport: Transport,
    pub flags: NotifyFlags,
}

/// Builds the boxed sink for a configured notifier. Every sink variant
/// shares `flags` for `should_deliver`; only `deliver` differs by
/// transport.
pub fn build_sink(spec: NotifierSpec) -> Box<dyn NotificationSink> {
    match spec.transport {
        Transport::Telegram { bot_token, chat_id } => {
            Box::new(TelegramSink::new(bot_token, chat_id, spec.flags))
        }
        Transport::Slack {
            webhook_url,
            channel,
        } => Box::new(SlackSink::new(webhook_url, channel, spec.flags)),
        Transport::Email {
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            from_addr,
            to_addrs,
        } => Box::new(EmailSink::new(
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            from_addr,
            to_addrs,
            spec.flags,
        )),
        Transport::Webhook {
            url,
            method,
            headers,
        } => Box::new(WebhookSink::new(url, method, headers, spec.flags)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchdog_core::Event;

    fn event(kind: EventKind) -> Event {
        Event {
            kind,
            service: "nginx".to_string(),
            message: "test".to_string(),
            timestamp: 1_000,
            observation: None,
        }
    }

    #[test]
    fn disabled_flags_admit_nothing() {
        let flags = NotifyFlags {
            enabled: false,
            ..Default::default()
        };
        assert!(!flags.admits(&event(EventKind::Failure)));
    }

    #[test]
    fn restart_and_restart_failed_share_on_restart_flag() {
        let flags = NotifyFlags {
            on_restart: false,
            ..Default::default()
        };
        assert!(!flags.admits(&event(EventKind::Restart)));
        assert!(!flags.admits(&event(EventKind::RestartFailed)));
    }

    #[test]
    fn each_kind_gated_by_its_own_flag() {
        let flags = NotifyFlags {
            on_failure: false,
            on_recovery: true,
            on_restart: true,
            enabled: true,
        };
        assert!(!flags.admits(&event(EventKind::Failure)));
        assert!(flags.admits(&event(EventKind::Recovery)));
        assert!(flags.admits(&event(EventKind::Restart)));
    }
}
