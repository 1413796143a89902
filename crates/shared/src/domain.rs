use serde::{Deserialize, Serialize};

use crate::error::AuthFailure;

/// Opaque user identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid(pub String);

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Role stamped on every profile record at registration time; not user-selectable.
pub const SIGNUP_ROLE: &str = "Admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePicture {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub profile_picture: Option<ProfilePicture>,
}

/// Lifecycle of one submission attempt. Replaced wholesale at the start of
/// every attempt, so no flag from a previous attempt survives a resubmit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(AuthFailure),
}

impl SubmissionState {
    /// Callers see `Validating` and `Submitting` as one in-flight phase.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

/// Outcome of a credential-verification call. Ownership of long-lived
/// session state belongs to the session consumer, not to this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResult {
    pub established: bool,
    pub user_id: Option<Uid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAccount {
    pub uid: Uid,
    pub email: String,
}

/// Document-store record written once per registration, keyed by the
/// provider-issued uid. Field names match the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileRecord {
    pub email: String,
    pub uid: Uid,
    pub full_name: String,
    pub role: String,
}

/// Where the session consumer is told to send the user after a successful
/// submission. Sign-up routes to the sign-in entry point, not the root:
/// registration does not establish a session view by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationTarget {
    Root,
    SignIn,
}

impl NavigationTarget {
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::SignIn => "/signIn",
        }
    }
}
