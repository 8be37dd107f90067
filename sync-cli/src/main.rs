//! # sitesync
//!
//! Sync a local directory to a Neocities-style static hosting API with as
//! few API requests as possible.
//!
//! ## Example
//!
//! ```bash
//! # Sync ./public, logging in with a username and password
//! sitesync --username alice --password hunter2 --path public
//!
//! # Use an API key instead, and skip file types free accounts may not upload
//! NEOCITIES_API_KEY=... sitesync --path public --ignore-disallowed-file-types
//!
//! # See what would change without touching anything
//! sitesync --api-key ... --path public --dry-run
//!
//! # Save a login once, then sync without credentials
//! sitesync login --username alice
//! sitesync --path public
//! sitesync logout
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use sync_client::{
    relative_to_root, FileStateStore, HttpRemote, HttpRemoteConfig, RemoteApi, Scanner,
    SyncOptions, Syncer,
};
use sync_core::{ApplyMode, Exclusions, SyncResult};
use sync_types::{Credentials, LoginOutcome, Session};
use tracing_subscriber::EnvFilter;

mod config;
mod login;
mod report;

use config::Config;
use login::{Auth, KeyringStore, Profile};

/// Sync a local directory to a static hosting API.
#[derive(Parser, Debug)]
#[command(name = "sitesync")]
#[command(version, about, long_about = None)]
#[command(subcommand_negates_reqs = true)]
struct Cli {
    /// Account username (default: the saved login)
    #[arg(long, env = "SITESYNC_USERNAME")]
    username: Option<String>,

    /// Account password (default: use the saved API key)
    #[arg(long, env = "SITESYNC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// API key to use instead of logging in
    #[arg(long, env = "NEOCITIES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Local directory to sync
    #[arg(long, required = true)]
    path: Option<PathBuf>,

    /// State file (default: <PATH>/.state)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Skip file types that free accounts cannot upload
    #[arg(long)]
    ignore_disallowed_file_types: bool,

    /// How to apply changes: safe or fast
    #[arg(long)]
    apply_mode: Option<ApplyMode>,

    /// Print the plan without changing anything
    #[arg(long)]
    dry_run: bool,

    /// API root URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the saved default username
    #[arg(long, global = true, env = "SITESYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in once and save the API key in the OS credential store
    Login {
        /// Account username
        #[arg(long, env = "SITESYNC_USERNAME")]
        username: String,

        /// Account password (will prompt if not provided)
        #[arg(long, env = "SITESYNC_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove a saved API key
    Logout {
        /// Account username (default: the saved login)
        #[arg(long)]
        username: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command.take() {
        Some(Commands::Login { username, password }) => login(&cli, username, password).await,
        Some(Commands::Logout { username }) => logout(&cli, username),
        None => sync(cli).await,
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for sitesync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "sitesync", "sitesync")
        .context("Could not determine home directory")?;
    Ok(dirs.config_dir().to_path_buf())
}

fn profile(cli: &Cli) -> Result<Profile> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };
    Ok(Profile::new(&data_dir))
}

fn load_config(cli: &Cli) -> Result<Config> {
    Ok(match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    })
}

fn remote(cli: &Cli, config: &Config) -> Result<HttpRemote> {
    HttpRemote::with_config(HttpRemoteConfig {
        base_url: cli
            .base_url
            .clone()
            .unwrap_or_else(|| config.remote.base_url.clone()),
        timeout: Duration::from_secs(cli.timeout.unwrap_or(config.remote.timeout_secs)),
    })
    .context("Failed to build HTTP client")
}

/// Exchange credentials for a session, or print why that failed.
async fn open_session(
    remote: &HttpRemote,
    username: String,
    password: String,
) -> Result<Result<Session, ExitCode>> {
    let outcome = remote
        .login(&Credentials::new(username, password))
        .await
        .context("Login failed")?;
    Ok(match outcome {
        LoginOutcome::LoggedIn(session) => Ok(session),
        LoginOutcome::InvalidAuth => Err(report::login_failed(SyncResult::InvalidAuth)),
        LoginOutcome::NetworkError(reason) => {
            tracing::warn!("Login request failed: {}", reason);
            Err(report::login_failed(SyncResult::NetworkError))
        }
    })
}

async fn login(cli: &Cli, username: String, password: Option<String>) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let remote = remote(cli, &config)?;
    let profile = profile(cli)?;

    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {username}: "))
            .context("Failed to read password")?,
    };
    let session = match open_session(&remote, username.clone(), password).await? {
        Ok(session) => session,
        Err(code) => return Ok(code),
    };

    login::remember(&username, session.api_key(), &profile, &KeyringStore)?;
    eprintln!("{}", report::LOGIN_SUCCESSFUL);
    Ok(ExitCode::SUCCESS)
}

fn logout(cli: &Cli, username: Option<String>) -> Result<ExitCode> {
    let profile = profile(cli)?;
    match login::forget(username, &profile, &KeyringStore)? {
        Some(_) => {
            eprintln!("{}", report::LOGOUT_SUCCESSFUL);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("{}", report::NOT_LOGGED_IN);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn sync(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let remote = remote(&cli, &config)?;
    let root = cli.path.clone().context("--path is required")?;

    let auth = match cli.api_key.clone() {
        Some(key) => Auth::ApiKey(key),
        None => login::resolve(
            cli.username.clone(),
            cli.password.clone(),
            &profile(&cli)?,
            &KeyringStore,
        )?,
    };
    let session = match auth {
        Auth::ApiKey(key) => Session::new(key),
        Auth::Credentials { username, password } => {
            match open_session(&remote, username, password).await? {
                Ok(session) => session,
                Err(code) => return Ok(code),
            }
        }
    };

    let state = cli.state.unwrap_or_else(|| root.join(".state"));
    let mut exclusions = Exclusions::new()
        .with_state_file(relative_to_root(&root, &state))
        .ignore_disallowed_file_types(
            cli.ignore_disallowed_file_types || config.sync.ignore_disallowed_file_types,
        );
    if let Some(extensions) = config.sync.disallowed_extensions {
        exclusions = exclusions.with_disallowed_extensions(extensions);
    }

    let scanner = Scanner::new(&root, exclusions).with_concurrency(config.sync.scan_concurrency);
    let options = SyncOptions {
        apply_mode: cli.apply_mode.unwrap_or(config.sync.apply_mode),
        dry_run: cli.dry_run,
    };
    tracing::info!(
        "Syncing {} (state: {}, mode: {})",
        root.display(),
        state.display(),
        options.apply_mode
    );

    let syncer = Syncer::new(remote, FileStateStore::new(&state), scanner).with_options(options);
    let report = syncer
        .run(&session)
        .await
        .with_context(|| format!("Failed to sync {}", root.display()))?;

    if options.dry_run {
        Ok(report::dry_run(&report))
    } else {
        Ok(report::finished(&report))
    }
}
