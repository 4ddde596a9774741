//! Risk alert emails over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::{Notifier, RiskNotification};
use crate::config::AppConfig;
use crate::error::NotifyError;
use crate::models::RiskLevel;

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    dashboard_url: String,
}

impl SmtpNotifier {
    pub fn from_config(config: &AppConfig) -> Result<Self, NotifyError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.smtp_from.parse()?,
            dashboard_url: config.dashboard_url.clone(),
        })
    }

    fn build_message(&self, n: &RiskNotification) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(n.name.clone()), n.email.parse()?))
            .subject(subject(n))
            .header(ContentType::TEXT_HTML)
            .body(html_body(n, &self.dashboard_url))
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    fn build_welcome(
        &self,
        name: &str,
        email: &str,
        location_name: &str,
    ) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(Mailbox::new(Some(name.to_string()), email.parse()?))
            .subject(welcome_subject(name))
            .header(ContentType::TEXT_HTML)
            .body(welcome_body(name, location_name, &self.dashboard_url))
            .map_err(|e| NotifyError::Build(e.to_string()))
    }

    /// Confirm a new subscription to `location_name`.
    pub async fn send_welcome(
        &self,
        name: &str,
        email: &str,
        location_name: &str,
    ) -> Result<(), NotifyError> {
        let message = self.build_welcome(name, email, location_name)?;
        self.transport.send(message).await?;
        info!("Welcome email sent to {} for {}", email, location_name);
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &RiskNotification) -> Result<(), NotifyError> {
        let message = self.build_message(notification)?;
        self.transport.send(message).await?;
        info!(
            "Risk email sent to {} for {} ({})",
            notification.email, notification.location_name, notification.level
        );
        Ok(())
    }
}

fn subject(n: &RiskNotification) -> String {
    format!("Coastal Risk Alert at {} - {}", n.location_name, n.level)
}

fn colour(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "#ef4444",
        RiskLevel::Moderate => "#eab308",
        RiskLevel::Low => "#16a34a",
    }
}

fn advice(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => {
            "Please exercise extreme caution. High waves and wind-waves can be dangerous. \
             Consider avoiding coastal activities until conditions improve."
        }
        RiskLevel::Moderate => {
            "Be aware of the changing conditions. Moderate risk levels suggest that you \
             should be cautious and monitor the situation closely."
        }
        RiskLevel::Low => {
            "Current conditions are favorable. Enjoy your coastal activities, but always \
             be aware of your surroundings."
        }
    }
}

/// Minimal escaping for values interpolated into the HTML body.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_body(n: &RiskNotification, dashboard_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: auto; padding: 20px;">
  <h2 style="color: {colour}; text-align: center;">Coastal Risk Alert: {level}</h2>
  <p style="text-align: center; color: #666;">A change in coastal conditions has been detected.</p>
  <p>Hi <b>{name}</b>,</p>
  <p>The risk level at <b>{location}</b> has changed to <b>{level}</b>.</p>
  <p>Here are the latest readings:</p>
  <ul>
    <li><b>Wave Height:</b> {wave:.1} m</li>
    <li><b>Wind-Wave Height:</b> {wind_wave:.1} m</li>
  </ul>
  <p style="font-style: italic; color: #555;">{advice}</p>
  <p style="text-align: center;"><a href="{dashboard}">View Full Details on the Dashboard</a></p>
  <p style="font-size: 12px; color: #888; text-align: center;">This is an automated notification from Sea-Blue Dashboard.</p>
</div>"#,
        colour = colour(n.level),
        level = n.level,
        name = escape(&n.name),
        location = escape(&n.location_name),
        wave = n.wave_height,
        wind_wave = n.wind_wave_height,
        advice = advice(n.level),
        dashboard = escape(dashboard_url),
    )
}

fn welcome_subject(name: &str) -> String {
    format!("Welcome to Sea-Blue, {}! Your coastal alerts are active.", name)
}

fn welcome_body(name: &str, location_name: &str, dashboard_url: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: auto; padding: 20px;">
  <h2 style="color: #0d47a1; text-align: center;">Welcome to Sea-Blue!</h2>
  <p>Hello <b>{name}</b>,</p>
  <p>You have successfully subscribed to coastal alerts for <b>{location}</b>.</p>
  <p>We monitor wave height and wind-wave height to help you assess coastal risks.</p>
  <table style="width: 100%; border-collapse: collapse;">
    <tr><td><b>Subscribed Location</b></td><td>{location}</td></tr>
    <tr><td><b>Alerts for</b></td><td>Wave &amp; Wind-Wave Height</td></tr>
  </table>
  <p style="text-align: center;"><a href="{dashboard}">Explore the Dashboard</a></p>
  <p style="font-size: 12px; color: #888; text-align: center;">You will receive a notification whenever the risk level changes. Stay safe!</p>
</div>"#,
        name = escape(name),
        location = escape(location_name),
        dashboard = escape(dashboard_url),
    )
}
