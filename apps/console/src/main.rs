use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use auth_core::{SessionConsumer, SignInController, SignUpController};
use clap::{Parser, Subcommand};
use identity_rest::RestBackend;
use shared::domain::{
    Credentials, NavigationTarget, ProfilePicture, RegistrationRequest, SubmissionState,
};
use tracing::debug;
use url::Url;

mod config;

#[derive(Parser, Debug)]
struct Cli {
    /// Backend base URL; overrides client.toml and the environment.
    #[arg(long)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new account with a profile picture.
    SignUp {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// Path to the picture uploaded after the account is created.
        #[arg(long)]
        profile_picture: PathBuf,
    },
    /// Sign in with existing credentials.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

/// Stands in for the router: prints where a real session consumer would
/// send the user.
struct AnnouncingSessionConsumer;

#[async_trait]
impl SessionConsumer for AnnouncingSessionConsumer {
    async fn navigate(&self, target: NavigationTarget) {
        println!("navigating to {}", target.path());
    }
}

fn content_type_for(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => Some("image/png"),
        Some("jpg" | "jpeg") => Some("image/jpeg"),
        Some("gif") => Some("image/gif"),
        Some("webp") => Some("image/webp"),
        _ => None,
    }
}

fn render_outcome(state: &SubmissionState, success: &str) {
    match state {
        SubmissionState::Succeeded => println!("{success}"),
        SubmissionState::Failed(failure) => println!("{}", failure.user_message()),
        // One fresh controller per invocation: submit only returns a
        // terminal state here.
        _ => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings();
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }
    debug!(backend_url = %settings.backend_url, "resolved settings");

    let base_url = Url::parse(&settings.backend_url)
        .with_context(|| format!("invalid backend url {}", settings.backend_url))?;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_seconds))
        .build()
        .context("failed to build http client")?;
    let backend = Arc::new(RestBackend::with_client(http, &base_url));
    let session = Arc::new(AnnouncingSessionConsumer);

    match cli.command {
        Command::SignIn { email, password } => {
            let controller = SignInController::new_with_providers(backend, session);
            let state = controller.submit(&Credentials { email, password }).await;
            render_outcome(&state, "SignIn Successful");
        }
        Command::SignUp {
            full_name,
            email,
            password,
            confirm_password,
            profile_picture,
        } => {
            let bytes = tokio::fs::read(&profile_picture)
                .await
                .with_context(|| format!("failed to read {}", profile_picture.display()))?;
            let picture = ProfilePicture {
                filename: profile_picture
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("profile-picture")
                    .to_string(),
                content_type: content_type_for(&profile_picture).map(str::to_string),
                bytes,
            };
            let controller = SignUpController::new_with_providers(
                backend.clone(),
                backend.clone(),
                backend,
                session,
            );
            let state = controller
                .submit(&RegistrationRequest {
                    full_name,
                    email,
                    password,
                    confirm_password,
                    profile_picture: Some(picture),
                })
                .await;
            render_outcome(&state, "SignUp Successful");
        }
    }

    Ok(())
}
