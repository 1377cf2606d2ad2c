//! SMTP sink: a multipart alternative (plain text + HTML) message sent
//! over STARTTLS, with optional username/password auth.

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as LettreTransport};

use watchdog_core::Event;
use watchdog_core::NotificationSink;

use crate::NotifyFlags;

pub struct EmailSink {
    smtp_host: String,
    smtp_port: u16,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    from_addr: String,
    to_addrs: Vec<String>,
    flags: NotifyFlags,
}

impl EmailSink {
    pub fn new(
        smtp_host: String,
        smtp_port: u16,
        smtp_user: Option<String>,
        smtp_password: Option<String>,
        from_addr: String,
        to_addrs: Vec<String>,
        flags: NotifyFlags,
    ) -> Self {
        EmailSink {
            smtp_host,
            smtp_port,
            smtp_user,
            smtp_password,
            from_addr,
            to_addrs,
            flags,
        }
    }
}

fn subject(event: &Event) -> String {
    format!("[Service Watchdog] {}: {}", event.service, event.kind.as_str())
}

fn plain_body(event: &Event) -> String {
    let mut body = format!(
        "Service Watchdog Alert\n\nService: {}\nEvent: {}\nTime: {}\nMessage: {}\n",
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
        body.push_str(&format!("Error: {error}\n"));
    }
    body
}

fn html_body(event: &Event) -> String {
    let mut body = format!(
        "<h2>Service Watchdog Alert</h2><p><b>Service:</b> {}<br><b>Event:</b> {}<br><b>Time:</b> {}<br><b>Message:</b> {}</p>",
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
        body.push_str(&format!("<p><b>Error:</b> {error}</p>"));
    }
    body
}

impl NotificationSink for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    fn should_deliver(&self, event: &Event) -> bool {
        self.flags.admits(event)
    }

    fn deliver(&self, event: &Event) -> (bool, String) {
        if self.to_addrs.is_empty() {
            return (false, "no recipients configured".to_string());
        }

        let from: Mailbox = match self.from_addr.parse() {
            Ok(addr) => addr,
            Err(e) => return (false, format!("invalid from_addr: {e}")),
        };

        let mut builder = Message::builder().from(from).subject(subject(event));
        for addr in &self.to_addrs {
            let to: Mailbox = match addr.parse() {
                Ok(addr) => addr,
                Err(e) => return (false, format!("invalid recipient `{addr}`: {e}")),
            };
            builder = builder.to(to);
        }

        let message = match builder.multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(plain_body(event)))
                .singlepart(SinglePart::html(html_body(event))),
        ) {
            Ok(message) => message,
            Err(e) => return (false, format!("failed to build email: {e}")),
        };

        let mut transport_builder = match SmtpTransport::starttls_relay(&self.smtp_host) {
            Ok(builder) => builder.port(self.smtp_port),
            Err(e) => return (false, format!("failed to configure SMTP relay: {e}")),
        };

        if let (Some(user), Some(password)) = (&self.smtp_user, &self.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let transport = transport_builder.build();
        match transport.send(&message) {
            Ok(_) => (true, "email delivered".to_string()),
            Err(e) => (false, format!("email delivery failed: {e}")),
        }
    }
}
