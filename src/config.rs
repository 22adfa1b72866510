//! Runtime configuration.
//!
//! Everything is supplied through environment variables, the way the
//! hosting trigger injects secrets:
//!
//! - `NOTIFICATION_EMAIL` — sender address
//! - `TO_EMAIL` — notification recipient
//! - `CONTACT_SUBJECT` — subject line (optional)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD` — delivery
//!
//! Loading is lenient: missing addresses stay empty and surface later as
//! an empty-recipient error at compose time.

use serde::{Deserialize, Serialize};

/// Default subject line for notification emails.
pub const DEFAULT_SUBJECT: &str = "NUEVO CONTACTO";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sender address for outgoing notifications.
    pub notification_email: String,
    /// Recipient of the notification email.
    pub to_email: String,
    /// Subject line for notification emails.
    pub subject: String,
    /// SMTP delivery settings.
    pub smtp: SmtpConfig,
}

/// SMTP delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,
    /// SMTP server port.
    pub port: u16,
    /// Username for SMTP authentication, if the relay requires one.
    pub username: Option<String>,
    /// Password for SMTP authentication.
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notification_email: String::new(),
            to_email: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
            smtp: SmtpConfig::default(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            notification_email: env_or("NOTIFICATION_EMAIL", defaults.notification_email),
            to_email: env_or("TO_EMAIL", defaults.to_email),
            subject: env_or("CONTACT_SUBJECT", defaults.subject),
            smtp: SmtpConfig {
                host: env_or("SMTP_HOST", defaults.smtp.host),
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.smtp.port),
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            },
        }
    }
}

fn env_or(name: &str, fallback: String) -> String {
    std::env::var(name).unwrap_or(fallback)
}
