//! Generates the commented sample configuration emitted by `watchdogd
//! init` (`cli.py::init`), using this workspace's field names rather than
//! the Python original's (`pid_file` -> `pid_file_path`, `port` ->
//! `tcp_port`, `restart_command` -> `restart_cmd`, etc).

pub fn sample_config() -> String {
    r#"# Watchdog daemon configuration

# Global settings
log_file: /var/log/watchdogd.log
log_level: INFO
pid_file: /var/run/watchdogd.pid
state_file: /var/lib/watchdogd/state.toml

# Services to monitor
services:
  - name: nginx
    enabled: true
    # Detection methods (use at least one; checked in this order)
    health_url: http://localhost/health
    tcp_port: 80
    process_name: nginx

    # Restart configuration
    restart_cmd: systemctl restart nginx
    restart_delay: 60        # seconds to wait before restart
    max_restarts: 3          # max restarts within the window
    restart_window: 3600     # window in seconds (1 hour)

    # Check settings
    check_interval: 30       # seconds between checks
    failure_threshold: 2     # consecutive failures before acting

  - name: postgres
    enabled: true
    tcp_port: 5432
    restart_cmd: systemctl restart postgresql
    check_interval: 30
    failure_threshold: 3
    restart_delay: 30

  - name: my-app
    enabled: true
    pid_file_path: /var/run/my-app.pid
    health_url: http://localhost:3000/health
    restart_cmd: systemctl restart my-app
    working_dir: /opt/my-app
    env:
      NODE_ENV: production

# Notification channels
notifiers:
  - type: telegram
    enabled: true
    bot_token: ${TELEGRAM_BOT_TOKEN}
    chat_id: ${TELEGRAM_CHAT_ID}
    on_failure: true
    on_recovery: true
    on_restart: true

  - type: slack
    enabled: false
    webhook_url: ${SLACK_WEBHOOK_URL}

  - type: email
    enabled: false
    smtp_host: smtp.gmail.com
    smtp_port: 587
    smtp_user: ${SMTP_USER}
    smtp_password: ${SMTP_PASSWORD}
    from_addr: watchdog@example.com
    to_addrs:
      - admin@example.com

  - type: webhook
    enabled: false
    url: https://your-webhook.example.com/alerts
    method: POST
    headers:
      Authorization: Bearer ${WEBHOOK_TOKEN}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_from_str;
    use std::collections::HashMap;

    #[test]
    fn sample_config_parses_once_placeholders_are_filled() {
        let mut env = HashMap::new();
        env.insert("TELEGRAM_BOT_TOKEN".to_string(), "tok".to_string());
        env.insert("TELEGRAM_CHAT_ID".to_string(), "chat".to_string());
        env.insert("SLACK_WEBHOOK_URL".to_string(), "https://hooks.slack.com/x".to_string());
        env.insert("SMTP_USER".to_string(), "user".to_string());
        env.insert("SMTP_PASSWORD".to_string(), "pass".to_string());
        env.insert("WEBHOOK_TOKEN".to_string(), "secret".to_string());

        let config = load_from_str(&sample_config(), |name| env.get(name).cloned()).unwrap();
        assert_eq!(config.services.len(), 3);
        assert_eq!(config.notifiers.len(), 4);
    }
}
