//! Turns validated raw config into the types the rest of the workspace
//! consumes: `watchdog_core::ServiceSpec` per service, and
//! `watchdog_notify::NotifierSpec` per notifier.

use watchdog_core::ServiceSpec;
use watchdog_notify::{NotifierSpec, NotifyFlags, Transport};

use crate::raw::{RawConfig, RawNotifierConfig, RawServiceConfig};

pub fn to_service_spec(raw: &RawServiceConfig) -> ServiceSpec {
    ServiceSpec {
        name: raw.name.clone(),
        process_name: raw.process_name.clone(),
        pid_file_path: raw.pid_file_path.clone(),
        tcp_port: raw.tcp_port,
        health_url: raw.health_url.clone(),
        restart_cmd: raw.restart_cmd.clone(),
        start_cmd: raw.start_cmd.clone(),
        stop_cmd: raw.stop_cmd.clone(),
        working_dir: raw.working_dir.clone(),
        env: raw.env.clone(),
        check_interval: raw.check_interval,
        failure_threshold: raw.failure_threshold,
        restart_delay: raw.restart_delay,
        max_restarts: raw.max_restarts,
        restart_window: raw.restart_window,
        health_timeout: raw.health_timeout,
        enabled: raw.enabled,
    }
}

/// Assumes `raw` already passed `validate_notifier`; unknown/incomplete
/// notifiers never reach this point.
pub fn to_notifier_spec(raw: &RawNotifierConfig) -> Option<NotifierSpec> {
    let flags = NotifyFlags {
        enabled: raw.enabled,
        on_failure: raw.on_failure,
        on_recovery: raw.on_recovery,
        on_restart: raw.on_restart,
    };

    let transport = match raw.kind.as_str() {
        "telegram" => Transport::Telegram {
            bot_token: raw.bot_token.clone()?,
            chat_id: raw.chat_id.clone()?,
        },
        "slack" => Transport::Slack {
            webhook_url: raw.webhook_url.clone()?,
            channel: raw.channel.clone(),
        },
        "email" => Transport::Email {
            smtp_host: raw.smtp_host.clone()?,
            smtp_port: raw.smtp_port,
            smtp_user: raw.smtp_user.clone(),
            smtp_password: raw.smtp_password.clone(),
            from_addr: raw.from_addr.clone()?,
            to_addrs: raw.to_addrs.clone(),
        },
        "webhook" => Transport::Webhook {
            url: raw.url.clone()?,
            method: raw.method.clone(),
            headers: raw.headers.clone().into_iter().collect(),
        },
        _ => return None,
    };

    Some(NotifierSpec { transport, flags })
}

pub fn to_service_specs(raw: &RawConfig) -> Vec<ServiceSpec> {
    raw.services.iter().map(to_service_spec).collect()
}

pub fn to_notifier_specs(raw: &RawConfig) -> Vec<NotifierSpec> {
    raw.notifiers.iter().filter_map(to_notifier_spec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn service(name: &str) -> RawServiceConfig {
        RawServiceConfig {
            name: name.to_string(),
            enabled: true,
            process_name: Some("nginx".to_string()),
            pid_file_path: None,
            tcp_port: None,
            health_url: None,
            restart_cmd: Some("systemctl restart nginx".to_string()),
            start_cmd: None,
            stop_cmd: None,
            working_dir: None,
            env: BTreeMap::new(),
            check_interval: 30,
            failure_threshold: 2,
            restart_delay: 60,
            max_restarts: 3,
            restart_window: 3600,
            health_timeout: 10,
        }
    }

    #[test]
    fn service_spec_carries_every_field() {
        let spec = to_service_spec(&service("nginx"));
        assert_eq!(spec.name, "nginx");
        assert_eq!(spec.process_name.as_deref(), Some("nginx"));
        assert_eq!(spec.restart_cmd.as_deref(), Some("systemctl restart nginx"));
    }

    #[test]
    fn telegram_notifier_converts() {
        let raw = RawNotifierConfig {
            kind: "telegram".to_string(),
            enabled: true,
            on_failure: true,
            on_recovery: true,
            on_restart: true,
            bot_token: Some("tok".to_string()),
            chat_id: Some("chat".to_string()),
            webhook_url: None,
            channel: None,
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            from_addr: None,
            to_addrs: Vec::new(),
            url: None,
            method: "POST".to_string(),
            headers: BTreeMap::new(),
        };
        let spec = to_notifier_spec(&raw).unwrap();
        assert!(matches!(spec.transport, Transport::Telegram { .. }));
    }
}
