use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider error code reported for a duplicate registration email.
pub const EMAIL_IN_USE_CODE: &str = "auth/email-already-in-use";

/// Everything a submission attempt can fail with. The first four are local
/// validation gates; the last two come back from the remote workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing required fields")]
    MissingFields,
    #[error("password shorter than minimum length")]
    WeakPassword,
    #[error("password and confirmation do not match")]
    PasswordMismatch,
    #[error("credentials rejected")]
    InvalidCredentials,
    #[error("email already registered")]
    EmailTaken,
    #[error("unexpected provider or transport failure")]
    Unknown,
}

/// How much the user-facing message reveals. Sign-in failures stay generic
/// so the message never says which of email or password was wrong; the
/// sign-up email-taken failure is deliberately specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    Specific,
    Generic,
}

impl AuthFailure {
    pub fn disclosure(self) -> Disclosure {
        match self {
            Self::MissingFields | Self::WeakPassword | Self::PasswordMismatch | Self::EmailTaken => {
                Disclosure::Specific
            }
            Self::InvalidCredentials | Self::Unknown => Disclosure::Generic,
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::MissingFields => "* Please enter all the fields",
            Self::WeakPassword => "* Passwords should be minimum 8 char",
            Self::PasswordMismatch => "Passwords do not match",
            Self::InvalidCredentials => "LogIn failed due incorrect credentials",
            Self::EmailTaken => "The email address is already in use",
            Self::Unknown => "Something went wrong! Please try again",
        }
    }
}

/// Wire shape for backend error bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_rejection_stays_generic_while_email_taken_is_disclosed() {
        assert_eq!(AuthFailure::InvalidCredentials.disclosure(), Disclosure::Generic);
        assert_eq!(AuthFailure::Unknown.disclosure(), Disclosure::Generic);
        assert_eq!(AuthFailure::EmailTaken.disclosure(), Disclosure::Specific);
        assert!(!AuthFailure::InvalidCredentials
            .user_message()
            .contains("password"));
    }
}
