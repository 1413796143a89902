use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{
        CreatedAccount, Credentials, NavigationTarget, RegistrationRequest, SessionResult,
        SubmissionState, Uid, UserProfileRecord, SIGNUP_ROLE,
    },
    error::AuthFailure,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub mod validation;

/// Blob-store key prefix under which profile pictures are stored.
pub const PROFILE_PICTURE_PREFIX: &str = "profile-pictures";

/// Document-store collection holding one profile record per user.
pub const USERS_COLLECTION: &str = "users";

pub fn profile_picture_key(uid: &Uid) -> String {
    format!("{PROFILE_PICTURE_PREFIX}/{uid}")
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("email already registered ({})", shared::error::EMAIL_IN_USE_CODE)]
    EmailAlreadyInUse,
    #[error("backend rejected the request: {code}: {message}")]
    Backend { code: String, message: String },
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CreatedAccount, ProviderError>;

    /// Verify credentials with redirect suppressed: the caller, never the
    /// provider, decides navigation. A credentials rejection is a normal
    /// `SessionResult`, not an error.
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionResult, ProviderError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: &[u8], content_type: Option<&str>) -> Result<()>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn set_user_record(&self, uid: &Uid, record: &UserProfileRecord) -> Result<()>;
}

/// Receives navigation signals after a successful submission. Long-lived
/// session state (router, layout) lives behind this seam, not here.
#[async_trait]
pub trait SessionConsumer: Send + Sync {
    async fn navigate(&self, target: NavigationTarget);
}

pub struct MissingIdentityProvider;

#[async_trait]
impl IdentityProvider for MissingIdentityProvider {
    async fn create_account(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<CreatedAccount, ProviderError> {
        Err(ProviderError::Transport(anyhow!(
            "identity provider is unavailable"
        )))
    }

    async fn verify_credentials(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<SessionResult, ProviderError> {
        Err(ProviderError::Transport(anyhow!(
            "identity provider is unavailable"
        )))
    }
}

pub struct MissingBlobStore;

#[async_trait]
impl BlobStore for MissingBlobStore {
    async fn put(&self, key: &str, _data: &[u8], _content_type: Option<&str>) -> Result<()> {
        Err(anyhow!("blob store is unavailable for key {key}"))
    }
}

pub struct MissingDocumentStore;

#[async_trait]
impl DocumentStore for MissingDocumentStore {
    async fn set_user_record(&self, uid: &Uid, _record: &UserProfileRecord) -> Result<()> {
        Err(anyhow!("document store is unavailable for uid {uid}"))
    }
}

/// Drops navigation signals; stands in for the session consumer in
/// headless runs and unwired controllers.
pub struct DiscardingSessionConsumer;

#[async_trait]
impl SessionConsumer for DiscardingSessionConsumer {
    async fn navigate(&self, _target: NavigationTarget) {}
}

/// How far the registration saga got through its three remote steps.
/// Account creation, picture upload and profile write are independently
/// failable and not transactional; the reached stage stays observable so
/// partial completions can be reconciled out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationProgress {
    AccountCreated,
    PictureStored,
    ProfileRecorded,
}

pub struct SignInController {
    identity: Arc<dyn IdentityProvider>,
    session: Arc<dyn SessionConsumer>,
    inner: Mutex<SubmissionState>,
}

impl SignInController {
    pub fn new() -> Arc<Self> {
        Self::new_with_providers(
            Arc::new(MissingIdentityProvider),
            Arc::new(DiscardingSessionConsumer),
        )
    }

    pub fn new_with_providers(
        identity: Arc<dyn IdentityProvider>,
        session: Arc<dyn SessionConsumer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            session,
            inner: Mutex::new(SubmissionState::Idle),
        })
    }

    pub async fn state(&self) -> SubmissionState {
        self.inner.lock().await.clone()
    }

    /// Runs one sign-in attempt through the validation gates and, if they
    /// pass, the remote verification call. A call while a prior attempt is
    /// still in flight is a no-op returning the in-flight state.
    pub async fn submit(&self, credentials: &Credentials) -> SubmissionState {
        {
            let mut state = self.inner.lock().await;
            if state.is_busy() {
                return state.clone();
            }
            // Replace wholesale: no flag from a previous attempt survives.
            *state = SubmissionState::Validating;
            if let Err(failure) = validation::validate_credentials(credentials) {
                info!(%failure, "sign-in rejected before provider call");
                *state = SubmissionState::Failed(failure);
                return state.clone();
            }
            *state = SubmissionState::Submitting;
        }

        let outcome = match self
            .identity
            .verify_credentials(&credentials.email, &credentials.password)
            .await
        {
            Ok(SessionResult {
                established: true, ..
            }) => {
                info!("sign-in succeeded");
                self.session.navigate(NavigationTarget::Root).await;
                SubmissionState::Succeeded
            }
            Ok(SessionResult {
                established: false, ..
            }) => {
                // Deliberately generic: the message never says which of
                // email or password was wrong.
                SubmissionState::Failed(AuthFailure::InvalidCredentials)
            }
            Err(err) => {
                error!(error = %err, "credential verification failed");
                SubmissionState::Failed(AuthFailure::Unknown)
            }
        };

        let mut state = self.inner.lock().await;
        *state = outcome.clone();
        outcome
    }
}

struct SignUpState {
    submission: SubmissionState,
    progress: Option<RegistrationProgress>,
}

struct RegistrationOutcome {
    state: SubmissionState,
    progress: Option<RegistrationProgress>,
}

pub struct SignUpController {
    identity: Arc<dyn IdentityProvider>,
    blobs: Arc<dyn BlobStore>,
    documents: Arc<dyn DocumentStore>,
    session: Arc<dyn SessionConsumer>,
    inner: Mutex<SignUpState>,
}

impl SignUpController {
    pub fn new() -> Arc<Self> {
        Self::new_with_providers(
            Arc::new(MissingIdentityProvider),
            Arc::new(MissingBlobStore),
            Arc::new(MissingDocumentStore),
            Arc::new(DiscardingSessionConsumer),
        )
    }

    pub fn new_with_providers(
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
        documents: Arc<dyn DocumentStore>,
        session: Arc<dyn SessionConsumer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            identity,
            blobs,
            documents,
            session,
            inner: Mutex::new(SignUpState {
                submission: SubmissionState::Idle,
                progress: None,
            }),
        })
    }

    pub async fn state(&self) -> SubmissionState {
        self.inner.lock().await.submission.clone()
    }

    /// Stage reached by the most recent attempt's registration saga, if an
    /// account was created at all.
    pub async fn last_progress(&self) -> Option<RegistrationProgress> {
        self.inner.lock().await.progress
    }

    /// Runs one registration attempt: ordered validation gates, account
    /// creation, then the two dependent writes (picture upload, profile
    /// record). Re-submission while an attempt is in flight is a no-op.
    pub async fn submit(&self, request: &RegistrationRequest) -> SubmissionState {
        {
            let mut inner = self.inner.lock().await;
            if inner.submission.is_busy() {
                return inner.submission.clone();
            }
            inner.submission = SubmissionState::Validating;
            inner.progress = None;
            if let Err(failure) = validation::validate_registration(request) {
                info!(%failure, "registration rejected before provider call");
                inner.submission = SubmissionState::Failed(failure);
                return inner.submission.clone();
            }
            inner.submission = SubmissionState::Submitting;
        }

        let outcome = self.run_registration(request).await;

        let mut inner = self.inner.lock().await;
        inner.submission = outcome.state.clone();
        inner.progress = outcome.progress;
        outcome.state
    }

    /// The remote half of the attempt. The three steps are sequenced, not
    /// transactional: on a mid-saga failure the account is kept for
    /// out-of-band reconciliation, never rolled back or retried here.
    async fn run_registration(&self, request: &RegistrationRequest) -> RegistrationOutcome {
        let account = match self
            .identity
            .create_account(&request.email, &request.password)
            .await
        {
            Ok(account) => account,
            Err(ProviderError::EmailAlreadyInUse) => {
                info!("registration rejected: email already in use");
                return RegistrationOutcome {
                    state: SubmissionState::Failed(AuthFailure::EmailTaken),
                    progress: None,
                };
            }
            Err(err) => {
                error!(error = %err, "account creation failed");
                return RegistrationOutcome {
                    state: SubmissionState::Failed(AuthFailure::Unknown),
                    progress: None,
                };
            }
        };

        let mut progress = RegistrationProgress::AccountCreated;
        info!(uid = %account.uid, "account created");

        if let Some(picture) = request.profile_picture.as_ref() {
            let key = profile_picture_key(&account.uid);
            if let Err(err) = self
                .blobs
                .put(&key, &picture.bytes, picture.content_type.as_deref())
                .await
            {
                warn!(
                    uid = %account.uid,
                    stage = ?progress,
                    error = %err,
                    "registration left a partially provisioned account; keeping it for reconciliation"
                );
                return RegistrationOutcome {
                    state: SubmissionState::Failed(AuthFailure::Unknown),
                    progress: Some(progress),
                };
            }
            progress = RegistrationProgress::PictureStored;
        }

        let record = UserProfileRecord {
            email: account.email.clone(),
            uid: account.uid.clone(),
            full_name: request.full_name.clone(),
            role: SIGNUP_ROLE.to_string(),
        };
        if let Err(err) = self.documents.set_user_record(&account.uid, &record).await {
            warn!(
                uid = %account.uid,
                stage = ?progress,
                error = %err,
                "registration left a partially provisioned account; keeping it for reconciliation"
            );
            return RegistrationOutcome {
                state: SubmissionState::Failed(AuthFailure::Unknown),
                progress: Some(progress),
            };
        }
        progress = RegistrationProgress::ProfileRecorded;

        info!(uid = %account.uid, "registration completed");
        self.session.navigate(NavigationTarget::SignIn).await;
        RegistrationOutcome {
            state: SubmissionState::Succeeded,
            progress: Some(progress),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
