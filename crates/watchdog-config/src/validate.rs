//! Structural validation mirroring `config.py`'s `validate()` methods,
//! aggregating every problem found rather than stopping at the first.

use crate::raw::{RawConfig, RawNotifierConfig, RawServiceConfig};

pub fn validate_raw(config: &RawConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push("at least one service must be configured".to_string());
    }

    for service in &config.services {
        errors.extend(validate_service(service));
    }

    for notifier in &config.notifiers {
        errors.extend(validate_notifier(notifier));
    }

    errors
}

fn validate_service(service: &RawServiceConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let name = &service.name;

    if service.process_name.is_none()
        && service.pid_file_path.is_none()
        && service.tcp_port.is_none()
        && service.health_url.is_none()
    {
        errors.push(format!(
            "service '{name}': at least one of process_name, pid_file_path, tcp_port, or health_url must be set"
        ));
    }

    if service.restart_cmd.is_none() && service.start_cmd.is_none() {
        errors.push(format!(
            "service '{name}': restart_cmd or start_cmd must be set"
        ));
    }

    errors
}

fn validate_notifier(notifier: &RawNotifierConfig) -> Vec<String> {
    let mut errors = Vec::new();
    let kind = notifier.kind.as_str();

    match kind {
        "telegram" => {
            if notifier.bot_token.is_none() || notifier.chat_id.is_none() {
                errors.push("notifier 'telegram': bot_token and chat_id must be set".to_string());
            }
        }
        "slack" => {
            if notifier.webhook_url.is_none() {
                errors.push("notifier 'slack': webhook_url must be set".to_string());
            }
        }
        "email" => {
            if notifier.smtp_host.is_none() || notifier.from_addr.is_none() {
                errors.push("notifier 'email': smtp_host and from_addr must be set".to_string());
            }
            if notifier.to_addrs.is_empty() {
                errors.push("notifier 'email': to_addrs must contain at least one address".to_string());
            }
        }
        "webhook" => {
            if notifier.url.is_none() {
                errors.push("notifier 'webhook': url must be set".to_string());
            }
        }
        other => {
            errors.push(format!("notifier: unknown type '{other}'"));
        }
    }

    errors
}
