//! # Agora Binary
//!
//! The composition root: loads configuration, restores the session, wires the
//! HTTP plugin into the client layer and runs one command.

mod cli;
mod view;

use std::process::ExitCode;
use std::sync::Arc;

use ag_client::{
    publish_thread, Authenticator, InteractionController, ReplyTarget, SubmitOutcome, VoteOutcome,
};
use ag_config::{AppConfig, LogFormat};
use ag_core::{
    AuthApi, CommentId, ForumError, Identity, NewThread, SessionProvider, SessionStore, ThreadRepo,
};
use ag_http::HttpForumClient;
use ag_session_local::LocalSession;
use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Command, Flags};

/// Ports the commands run against, all backed by the same session.
struct App {
    repo: Arc<dyn ThreadRepo>,
    auth: Arc<dyn AuthApi>,
    session: Arc<dyn SessionStore>,
}

impl App {
    fn identity(&self) -> Arc<dyn SessionProvider> {
        Arc::new(SessionView(self.session.clone()))
    }
}

/// Narrows a `SessionStore` to the read-only view the controller needs.
struct SessionView(Arc<dyn SessionStore>);

impl SessionProvider for SessionView {
    fn current_identity(&self) -> Option<Identity> {
        self.0.current_identity()
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let flags = Flags::from_args();

    // 1. Configuration and logging
    let config = AppConfig::load(flags.config.clone())?;
    init_tracing(config.log_format);
    debug!(?config, "configuration");

    // 2. Session, restored from the previous run if any
    let session = Arc::new(LocalSession::init(&config.session_file).await?);
    info!(
        path = %session.path().display(),
        signed_in = session.current_identity().is_some(),
        "session ready"
    );

    // 3. HTTP plugin sharing that session
    let client = Arc::new(HttpForumClient::new(
        &config.api_url,
        config.request_timeout(),
        &config.user_agent,
        session.clone(),
    )?);
    info!(api_url = %config.api_url, "forum client ready");

    let app = App {
        repo: client.clone(),
        auth: client,
        session,
    };

    match run(&app, flags.command).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(ForumError::Unauthenticated) => {
            eprintln!("You need to sign in first: agora login --email <EMAIL>");
            Ok(ExitCode::FAILURE)
        }
        Err(ForumError::NotFound(_)) => {
            eprintln!("Thread not found.");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(app: &App, command: Command) -> ag_core::Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = Authenticator::new(app.auth.clone(), app.session.clone())
                .login(&email, SecretString::from(password))
                .await?;
            println!("Signed in as {}", user.username);
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let user = Authenticator::new(app.auth.clone(), app.session.clone())
                .register(&username, &email, SecretString::from(password))
                .await?;
            println!("Welcome, {}", user.username);
        }
        Command::Logout => {
            Authenticator::new(app.auth.clone(), app.session.clone())
                .sign_out()
                .await?;
            println!("Signed out");
        }
        Command::Whoami => match app.session.current_identity() {
            Some(user) => println!("{} ({:?})", user.username, user.role),
            None => println!("Not signed in"),
        },
        Command::Show { slug } => {
            let ctl =
                InteractionController::open(app.repo.clone(), app.identity(), &slug).await?;
            print!("{}", view::render_thread(&ctl, Utc::now()));
        }
        Command::Upvote { slug, comment } => {
            let mut ctl =
                InteractionController::open(app.repo.clone(), app.identity(), &slug).await?;
            let outcome = match comment {
                Some(id) => ctl.upvote_comment(&CommentId::from(id)).await?,
                None => ctl.upvote_post().await?,
            };
            match outcome {
                VoteOutcome::Applied => println!("Upvoted"),
                VoteOutcome::Dropped => println!("Vote not recorded"),
            }
        }
        Command::Reply { slug, text, to } => {
            let mut ctl =
                InteractionController::open(app.repo.clone(), app.identity(), &slug).await?;
            ctl.select_reply_target(ReplyTarget::from(to.map(CommentId::from)));
            ctl.set_draft(text);
            match ctl.submit_draft().await? {
                SubmitOutcome::Skipped => println!("Nothing to post"),
                SubmitOutcome::Posted { refreshed } => {
                    if !refreshed {
                        eprintln!("Reply posted, but the thread could not be reloaded");
                    }
                    print!("{}", view::render_thread(&ctl, Utc::now()));
                }
            }
        }
        Command::Publish {
            category,
            title,
            content,
        } => {
            let draft = NewThread {
                title,
                content,
                category_id: category.into(),
            };
            let thread = publish_thread(&app.repo, &app.identity(), &draft).await?;
            println!("Published: agora show {}", thread.slug);
        }
    }
    Ok(())
}
