//! Outgoing email interface.
//!
//! The crate only composes messages; delivery belongs to an [`EmailDispatcher`]
//! supplied by the caller.

use crate::errors::{Error, Result};
use std::future::Future;
use tracing::info;

/// Email kinds the application sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailTemplate {
    /// Invitation to join a family
    FamilyInvitation {
        /// Family being joined
        family_name: String,
        /// Link carrying the invitation token
        invitation_url: String,
        /// Days until the link expires
        expires_in_days: i64,
    },
    /// Sent after sign-up
    Welcome {
        /// Display name of the new user
        name: String,
    },
    /// Password reset link
    PasswordReset {
        /// One-time reset link
        reset_url: String,
    },
}

/// A composed message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// What to send
    pub template: EmailTemplate,
}

impl EmailMessage {
    /// Builds a message, rejecting obviously malformed addresses.
    pub fn new(to: &str, template: EmailTemplate) -> Result<Self> {
        let to = to.trim();
        let valid = to
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(Error::Validation {
                message: format!("'{to}' is not a valid email address"),
            });
        }
        Ok(Self {
            to: to.to_string(),
            template,
        })
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> String {
        match &self.template {
            EmailTemplate::FamilyInvitation { family_name, .. } => {
                format!("Invitation to join {family_name} on Pantry Buddy")
            }
            EmailTemplate::Welcome { .. } => "Welcome to Pantry Buddy".to_string(),
            EmailTemplate::PasswordReset { .. } => "Reset your Pantry Buddy password".to_string(),
        }
    }

    /// Plain-text body.
    #[must_use]
    pub fn body(&self) -> String {
        match &self.template {
            EmailTemplate::FamilyInvitation {
                family_name,
                invitation_url,
                expires_in_days,
            } => format!(
                "You've been invited to join the \"{family_name}\" family.\n\n\
                 Join here: {invitation_url}\n\n\
                 This invitation will expire in {expires_in_days} days. \
                 If you didn't expect it, you can safely ignore this email."
            ),
            EmailTemplate::Welcome { name } => format!(
                "Hi {name},\n\nYour account is ready. Add your first products and \
                 we'll remind you before they expire."
            ),
            EmailTemplate::PasswordReset { reset_url } => format!(
                "Someone asked to reset your password.\n\nReset it here: {reset_url}\n\n\
                 If this wasn't you, ignore this email."
            ),
        }
    }
}

/// Delivers composed email messages.
pub trait EmailDispatcher {
    /// Sends one message.
    fn dispatch(&self, message: &EmailMessage) -> impl Future<Output = Result<()>> + Send;
}

/// Dispatcher that only records messages in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl EmailDispatcher for LogDispatcher {
    async fn dispatch(&self, message: &EmailMessage) -> Result<()> {
        info!("Email to {}: {}", message.to, message.subject());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_invitation_subject_and_body() {
        let message = EmailMessage::new(
            "carol@example.com",
            EmailTemplate::FamilyInvitation {
                family_name: "Smiths".to_string(),
                invitation_url: "https://pantry.example/join-family?token=abc".to_string(),
                expires_in_days: 7,
            },
        )
        .unwrap();

        assert_eq!(message.subject(), "Invitation to join Smiths on Pantry Buddy");
        assert!(message.body().contains("token=abc"));
        assert!(message.body().contains("expire in 7 days"));
    }

    #[test]
    fn test_rejects_bad_addresses() {
        for bad in ["", "carol", "@example.com", "carol@localhost"] {
            assert!(
                matches!(
                    EmailMessage::new(bad, EmailTemplate::Welcome { name: "x".into() }),
                    Err(Error::Validation { message: _ })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_log_dispatcher_succeeds() {
        let message = EmailMessage::new(
            "dave@example.com",
            EmailTemplate::PasswordReset {
                reset_url: "https://pantry.example/reset".to_string(),
            },
        )
        .unwrap();
        assert!(LogDispatcher.dispatch(&message).await.is_ok());
    }
}
