//! SMTP delivery for the daily digest
//!
//! Sends the digest body as plain text with the CSV report attached.
//! Host, port, and credentials come from `config::SmtpConfig`; the
//! default relay settings match a Gmail STARTTLS setup.

use std::path::Path;

use anyhow::{Context, Result};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpConfig;
use crate::error::PortfolioError;

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .sender
            .parse()
            .map_err(|e| PortfolioError::ConfigError(format!("invalid sender address: {}", e)))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .map_err(|e| {
                PortfolioError::ConfigError(format!("invalid recipient address: {}", e))
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| PortfolioError::MailError(format!("SMTP transport error: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Send a plain-text message, optionally attaching the CSV report.
    pub async fn send(
        &self,
        subject: &str,
        body: &str,
        attachment: Option<&Path>,
    ) -> Result<()> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject);

        let email = match attachment {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read attachment {:?}", path))?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "report.csv".to_string());

                let csv_part = Attachment::new(filename).body(
                    bytes,
                    ContentType::parse("text/csv")
                        .map_err(|e| PortfolioError::MailError(format!("bad content type: {}", e)))?,
                );

                builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(SinglePart::plain(body.to_string()))
                            .singlepart(csv_part),
                    )
                    .map_err(|e| PortfolioError::MailError(format!("failed to build email: {}", e)))?
            }
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(body.to_string())
                .map_err(|e| PortfolioError::MailError(format!("failed to build email: {}", e)))?,
        };

        self.transport
            .send(email)
            .await
            .map_err(|e| PortfolioError::MailError(format!("failed to send email: {}", e)))?;

        info!("Sent '{}' to {}", subject, self.to);
        Ok(())
    }
}
