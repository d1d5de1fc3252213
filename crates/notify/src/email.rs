//! SMTP delivery for order notifications.
//!
//! Uses lettre with STARTTLS against the configured relay. Bodies are
//! plain text built by [`crate::messages`].

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use secrecy::ExposeSecret;

use green_basket_core::Email;

use crate::config::EmailConfig;
use crate::messages::{build_body, build_subject};
use crate::{NotificationKind, Notifier, NotifyError, OrderNotice};

/// SMTP-backed [`Notifier`].
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailNotifier {
    /// Create a notifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Send`] when the relay parameters are
    /// rejected.
    pub fn new(config: &EmailConfig) -> Result<Self, NotifyError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_owned(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Send(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(
        &self,
        kind: NotificationKind,
        recipient: &Email,
        notice: &OrderNotice,
    ) -> Result<(), NotifyError> {
        let subject = build_subject(kind, notice);
        let body = build_body(kind, notice);

        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(recipient
                .as_str()
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(recipient.to_string()))?)
            .subject(subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotifyError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        tracing::info!(
            to = %recipient,
            subject = %subject,
            order_id = %notice.order_id,
            "Notification sent"
        );
        Ok(())
    }
}
