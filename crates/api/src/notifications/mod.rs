//! Best-effort notification delivery.
//!
//! [`NotificationRouter`] subscribes to the event bus and emails the
//! configured alert address for the events administrators care about:
//! completed returns and critical escalations. Delivery is strictly
//! best-effort -- failures are logged and swallowed, and a missing SMTP or
//! alert-address configuration disables delivery entirely.

use keydesk_events::bus::{EVENT_REQUEST_ESCALATED, EVENT_RETURN_APPROVED};
use keydesk_events::{EmailConfig, EmailDelivery, KeyEvent};
use tokio::sync::broadcast;

/// Routes bus events to email notifications.
pub struct NotificationRouter {
    mailer: Option<EmailDelivery>,
    alert_email: Option<String>,
}

impl NotificationRouter {
    /// Build a router from the environment's SMTP configuration and the
    /// configured alert address.
    pub fn new(alert_email: Option<String>) -> Self {
        let mailer = EmailConfig::from_env().map(EmailDelivery::new);
        if mailer.is_none() {
            tracing::info!("SMTP not configured; notification emails disabled");
        }
        Self {
            mailer,
            alert_email,
        }
    }

    /// Consume events from `rx` until the bus is closed.
    pub async fn run(self, mut rx: broadcast::Receiver<KeyEvent>) {
        tracing::info!("Notification router started");

        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Notification router lagged; events lost");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed; notification router stopping");
                    break;
                }
            }
        }
    }

    /// Deliver a single event if it is notification-worthy and delivery is
    /// configured.
    async fn handle(&self, event: &KeyEvent) {
        if !matches!(
            event.event_type.as_str(),
            EVENT_RETURN_APPROVED | EVENT_REQUEST_ESCALATED
        ) {
            return;
        }

        let (Some(mailer), Some(to)) = (&self.mailer, &self.alert_email) else {
            tracing::debug!(event_type = %event.event_type, "Notification skipped (not configured)");
            return;
        };

        if let Err(e) = mailer.deliver(to, event).await {
            tracing::error!(
                event_type = %event.event_type,
                error = %e,
                "Notification email failed (state transition unaffected)",
            );
        }
    }
}
