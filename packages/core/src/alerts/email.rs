//! SMTP alert delivery.
//!
//! Sends an HTML email over a STARTTLS submission port whenever the monitor
//! reports a drop. Only successful drops ever reach the recipient; delivery
//! failures are returned to the caller and end up in the logs.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::alerts::notifier::Notifier;
use crate::config::EmailConfig;
use crate::error::NotifyError;
use crate::rates::RateObservation;

pub const SUBJECT: &str = "COTAÇÃO EURO BAIXOU HOJE";
pub const SENDER_NAME: &str = "Cotação Euro";

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Render the HTML body announcing a drop from `previous` to `current`.
pub fn render_drop_email(
    previous: &RateObservation,
    current: &RateObservation,
    sent_at: DateTime<Utc>,
) -> String {
    format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; color: #333;">
    <h2 style="color: #0078D7;">💶 Cotação do Euro</h2>
    <p>O Euro hoje está mais barato, custando <strong style="color: green;">R$ {current:.2}</strong>.</p>
    <p>Antes estava <strong style="color: red;">R$ {previous:.2}</strong>.</p>
    <hr />
    <p style="font-size: 12px; color: #888;">Atualizado em {stamp}</p>
  </body>
</html>"#,
        current = current.rate,
        previous = previous.rate,
        stamp = sent_at.format("%d/%m/%Y %H:%M UTC"),
    )
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            config.from.email.to_string(),
            config.password.expose().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|err| NotifyError::transport(err.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some(SENDER_NAME.to_string()), config.from.email.clone()),
            to: config.to.clone(),
        })
    }

    fn build_message(
        &self,
        previous: &RateObservation,
        current: &RateObservation,
    ) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT)
            .header(ContentType::TEXT_HTML)
            .body(render_drop_email(previous, current, Utc::now()))
            .map_err(|err| NotifyError::message(err.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_drop(
        &self,
        previous: &RateObservation,
        current: &RateObservation,
    ) -> Result<(), NotifyError> {
        let message = self.build_message(previous, current)?;

        tracing::info!("Sending drop notification to {}", self.to);

        self.transport
            .send(message)
            .await
            .map_err(|err| NotifyError::transport(err.to_string()))?;

        tracing::info!("Drop notification delivered to {}", self.to);
        Ok(())
    }
}
