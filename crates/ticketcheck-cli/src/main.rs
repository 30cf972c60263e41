//! ticketcheck - event check-in from the terminal
//!
//! Drives the check-in core without a camera: each input line is one
//! decoded barcode.
//!
//! ## Commands
//!
//! - `sign-in` / `sign-in-social` / `sign-out` / `whoami`: session management
//! - `editions`: list the edition calendar
//! - `scan`: run the scan loop against an edition

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use futures::future::BoxFuture;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, Instrument, Level};

use ticketcheck_auth::{AuthClient, CredentialSource, SessionSource, SessionStatus};
use ticketcheck_core::{
    obs, BarcodeEvent, BarcodeKind, CameraPermissions, CheckInResult, CheckInSubmitter,
    ClientConfig, DecodeOutcome, Edition, EditionSelect, EditionSelectView, EditionsClient,
    FetchState, HandoffView, HttpCheckInSubmitter, PendingCheckIn, PermissionApiError,
    PermissionState, ScannerScreen, ScannerView, SubmissionOutcome,
};

/// Where social sign-in lands once the provider hands back.
const SOCIAL_CALLBACK: &str = "/edition-select";

#[derive(Parser)]
#[command(name = "ticketcheck")]
#[command(author = "IW3 Engineering")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scan attendee QR codes and check them in", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Auth server URL (default: TICKETCHECK_BACKEND_URL or http://localhost:3000)
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Ticketing API URL (default: TICKETCHECK_API_URL or {backend}/api)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session cookie issued by `sign-in`
    #[arg(long, global = true, env = "TICKETCHECK_COOKIE", hide_env_values = true)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    SignIn {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Start a social sign-in and print the provider URL
    SignInSocial {
        /// Provider name (e.g. google, github)
        #[arg(long)]
        provider: String,
    },

    /// Show the current session
    Whoami,

    /// Sign out and forget the session cookie
    SignOut,

    /// List the edition calendar
    Editions {
        /// Print the editions as JSON instead of a table
        #[arg(long)]
        json_output: bool,
    },

    /// Check attendees in, one decoded code per input line
    ///
    /// Lines are `<payload>` (QR) or `<kind>:<payload>`. Loop commands:
    /// `:again` scans another, `:switch <slug> [title]` switches edition,
    /// `:quit` exits once any outstanding check-in has resolved.
    Scan {
        /// Edition slug
        #[arg(long)]
        edition: Option<String>,

        /// Edition title (default: the slug)
        #[arg(long)]
        title: Option<String>,

        /// Read codes from a file instead of stdin
        #[arg(long)]
        codes: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ticketcheck_core::init_tracing(cli.json, level);

    let config = client_config(cli.backend_url.as_deref(), cli.api_url.as_deref());
    config.validate().context("Invalid client configuration")?;
    let auth = Arc::new(auth_client(&config, cli.cookie.as_deref())?);

    match cli.command {
        Commands::SignIn { email, password } => cmd_sign_in(&auth, &email, &password).await,
        Commands::SignInSocial { provider } => cmd_sign_in_social(&auth, &provider).await,
        Commands::Whoami => cmd_whoami(&auth).await,
        Commands::SignOut => cmd_sign_out(&auth).await,
        Commands::Editions { json_output } => cmd_editions(&auth, &config, json_output).await,
        Commands::Scan {
            edition,
            title,
            codes,
        } => {
            let edition = edition.map(|slug| {
                let title = title.unwrap_or_else(|| slug.clone());
                Edition::new(slug, title)
            });
            cmd_scan(auth, &config, edition, codes.as_deref()).await
        }
    }
}

fn client_config(backend_url: Option<&str>, api_url: Option<&str>) -> ClientConfig {
    let mut config = match backend_url {
        Some(backend) => ClientConfig::with_backend(backend),
        None => ClientConfig::from_env(),
    };
    if let Some(api) = api_url {
        config.api_url = api.trim().trim_end_matches('/').to_string();
    }
    config
}

fn auth_client(config: &ClientConfig, cookie: Option<&str>) -> Result<AuthClient> {
    let client = AuthClient::new(config.auth_config()).context("Failed to build auth client")?;
    Ok(match cookie {
        Some(cookie) => client.with_cookie(cookie),
        None => client,
    })
}

async fn cmd_sign_in(auth: &AuthClient, email: &str, password: &str) -> Result<()> {
    let session = auth
        .sign_in_with_credentials(email, password)
        .await
        .context("Sign-in failed")?;

    println!("Signed in as {} <{}>", session.user.name, session.user.email);
    if let Some(cookie) = auth.cookie_header() {
        println!();
        println!("Reuse this session with:");
        println!("  export TICKETCHECK_COOKIE='{cookie}'");
    }
    Ok(())
}

async fn cmd_sign_in_social(auth: &AuthClient, provider: &str) -> Result<()> {
    let redirect = auth
        .sign_in_with_provider(provider, SOCIAL_CALLBACK)
        .await
        .with_context(|| format!("Could not start {provider} sign-in"))?;
    println!("Open this URL to continue:");
    println!("  {}", redirect.url);
    Ok(())
}

async fn cmd_whoami(auth: &AuthClient) -> Result<()> {
    match auth.get_session().await {
        SessionStatus::Present(session) => {
            println!("{} <{}>", session.user.name, session.user.email);
            if let Some(role) = &session.user.role {
                println!("  role:    {role}");
            }
            println!("  expires: {}", session.session.expires_at.to_rfc3339());
        }
        SessionStatus::Absent => println!("Not signed in"),
        SessionStatus::Pending => bail!("Session could not be resolved; is the auth server up?"),
    }
    Ok(())
}

async fn cmd_sign_out(auth: &AuthClient) -> Result<()> {
    auth.sign_out().await.context("Sign-out failed")?;
    println!("Signed out");
    Ok(())
}

async fn cmd_editions(auth: &AuthClient, config: &ClientConfig, json_output: bool) -> Result<()> {
    let phase = auth.session_status().await.phase();
    let client = EditionsClient::new(config).context("Failed to build editions client")?;
    let fetch = FetchState::from(client.calendar().await);

    match EditionSelect::view(phase, &fetch) {
        EditionSelectView::Loading => bail!("Session could not be resolved; is the auth server up?"),
        EditionSelectView::SignInRequired => bail!("Sign in to list editions"),
        EditionSelectView::LoadFailed { message } => bail!("Could not load editions: {message}"),
        EditionSelectView::Empty if json_output => println!("[]"),
        EditionSelectView::Empty => println!("No upcoming editions"),
        EditionSelectView::List(listings) if json_output => {
            println!("{}", serde_json::to_string_pretty(&listings)?);
        }
        EditionSelectView::List(listings) => {
            println!("{:<20} {:<30} {:<12} LOCATION", "SLUG", "TITLE", "START");
            for listing in listings {
                println!(
                    "{:<20} {:<30} {:<12} {}",
                    listing.slug, listing.title, listing.start_date, listing.location
                );
            }
        }
    }
    Ok(())
}

async fn cmd_scan(
    auth: Arc<AuthClient>,
    config: &ClientConfig,
    edition: Option<Edition>,
    codes: Option<&Path>,
) -> Result<()> {
    let credentials: Arc<dyn CredentialSource> = auth.clone();
    let submitter =
        HttpCheckInSubmitter::new(config, credentials).context("Failed to build submitter")?;

    let mut screen = ScannerScreen::new(edition);
    let status = auth.session_status().await;
    if screen.observe_session(&status).is_some() {
        bail!("Not signed in; run `ticketcheck sign-in` and export TICKETCHECK_COOKIE");
    }
    if status.phase() == ticketcheck_auth::SessionPhase::Pending {
        bail!("Session could not be resolved; is the auth server up?");
    }
    screen.resolve_permission(&TerminalCamera).await;

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match codes {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut out = std::io::stdout();
    let summary = run_scan_loop(&mut screen, &submitter, input, &mut out).await?;
    info!(
        submitted = summary.submitted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        stale = summary.stale,
        ignored = summary.ignored,
        "Scan session finished"
    );
    writeln!(out, "{summary}")?;
    Ok(())
}

/// The terminal has no camera; decoded codes arrive as lines, so access is
/// always granted.
struct TerminalCamera;

#[async_trait]
impl CameraPermissions for TerminalCamera {
    async fn status(&self) -> Result<PermissionState, PermissionApiError> {
        Ok(PermissionState::Granted)
    }

    async fn request(&self) -> Result<PermissionState, PermissionApiError> {
        Ok(PermissionState::Granted)
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputLine {
    Blank,
    Decode(BarcodeEvent),
    Again,
    Switch(Option<Edition>),
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> InputLine {
    let line = line.trim();
    if line.is_empty() {
        return InputLine::Blank;
    }

    if let Some(command) = line.strip_prefix(':') {
        let mut words = command.split_whitespace();
        return match words.next() {
            Some("again") => InputLine::Again,
            Some("quit") => InputLine::Quit,
            Some("switch") => {
                let edition = words.next().map(|slug| {
                    let title = words.collect::<Vec<_>>().join(" ");
                    let title = if title.is_empty() { slug.to_string() } else { title };
                    Edition::new(slug, title)
                });
                InputLine::Switch(edition)
            }
            _ => InputLine::Unknown(line.to_string()),
        };
    }

    // Only a known symbology counts as a prefix; `https://...` stays a QR payload.
    if let Some((kind, payload)) = line.split_once(':') {
        let kind = BarcodeKind::parse(kind);
        if !matches!(kind, BarcodeKind::Other(_)) {
            return InputLine::Decode(BarcodeEvent {
                kind,
                data: payload.to_string(),
            });
        }
    }
    InputLine::Decode(BarcodeEvent::qr(line))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ScanSummary {
    submitted: usize,
    succeeded: usize,
    failed: usize,
    stale: usize,
    ignored: usize,
}

impl std::fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} submitted, {} checked in, {} failed, {} stale, {} ignored",
            self.submitted, self.succeeded, self.failed, self.stale, self.ignored
        )
    }
}

type InFlight<'a> = (PendingCheckIn, BoxFuture<'a, CheckInResult>);

async fn await_in_flight(slot: &mut Option<InFlight<'_>>) -> CheckInResult {
    match slot {
        Some((_, request)) => request.await,
        None => std::future::pending().await,
    }
}

/// Multiplex input lines with the single outstanding submission.
///
/// Lines keep flowing while a check-in is in flight; decodes that arrive
/// meanwhile reach the controller and are dropped there. A completed
/// submission is applied before the next line is read.
async fn run_scan_loop<S, R, W>(
    screen: &mut ScannerScreen,
    submitter: &S,
    input: R,
    out: &mut W,
) -> Result<ScanSummary>
where
    S: CheckInSubmitter + ?Sized,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut in_flight: Option<InFlight<'_>> = None;
    let mut input_done = false;
    let mut summary = ScanSummary::default();

    writeln!(out, "{}", describe(&screen.view()))?;

    while !input_done || in_flight.is_some() {
        tokio::select! {
            biased;

            result = await_in_flight(&mut in_flight), if in_flight.is_some() => {
                let Some((pending, _)) = in_flight.take() else {
                    continue;
                };
                match screen.complete(&pending, result) {
                    SubmissionOutcome::Handoff(handoff) => {
                        summary.succeeded += 1;
                        writeln!(out, "{}", describe_handoff(&handoff.view()))?;
                        writeln!(out, "Type :again to scan another")?;
                    }
                    SubmissionOutcome::Failed { message } => {
                        summary.failed += 1;
                        writeln!(out, "✘ {message}")?;
                        writeln!(out, "Type :again to scan another")?;
                    }
                    SubmissionOutcome::Stale => {
                        summary.stale += 1;
                        writeln!(out, "(late result for a previous scan discarded)")?;
                    }
                }
            }

            line = lines.next_line(), if !input_done => {
                let Some(line) = line.context("Failed to read input")? else {
                    input_done = true;
                    continue;
                };
                match parse_line(&line) {
                    InputLine::Blank => {}
                    InputLine::Quit => input_done = true,
                    InputLine::Unknown(raw) => writeln!(out, "Unknown command: {raw}")?,
                    InputLine::Again => match screen.scan_another() {
                        Ok(()) => writeln!(out, "Ready for the next code")?,
                        Err(e) => writeln!(out, "{e}")?,
                    },
                    InputLine::Switch(edition) => {
                        screen.switch_edition();
                        if let Some(edition) = edition {
                            screen.select_edition(edition)?;
                        }
                        writeln!(out, "{}", describe(&screen.view()))?;
                    }
                    InputLine::Decode(event) => match screen.handle_barcode(&event) {
                        DecodeOutcome::Ignored(reason) => {
                            summary.ignored += 1;
                            writeln!(out, "(ignored: {})", reason.as_str())?;
                        }
                        DecodeOutcome::Submit(pending) => {
                            summary.submitted += 1;
                            writeln!(out, "Checking in {} ...", pending.request.participant_id)?;
                            obs::emit_check_in_submitted(&pending);
                            let request = pending.request.clone();
                            let span = obs::check_in_span(&pending);
                            let submission: BoxFuture<'_, CheckInResult> =
                                Box::pin(async move { submitter.submit(&request).await }.instrument(span));
                            in_flight = Some((pending, submission));
                        }
                    },
                }
            }
        }
    }

    Ok(summary)
}

fn describe(view: &ScannerView) -> String {
    match view {
        ScannerView::NoEdition => {
            "No edition selected. Use :switch <slug> [title] or pass --edition.".to_string()
        }
        ScannerView::Loading => "Loading...".to_string(),
        ScannerView::SignInRequired => "Sign in required".to_string(),
        ScannerView::PermissionRequired => "Camera access denied".to_string(),
        ScannerView::Ready { edition, .. } => {
            format!("Scanning for {} ({}). One code per line.", edition.title, edition.slug)
        }
    }
}

fn describe_handoff(view: &HandoffView) -> String {
    match view {
        HandoffView::Success {
            name,
            email,
            ticket,
            edition,
            checked_at,
            ..
        } => format!("✔ {name} <{email}> checked in: {ticket}, {edition}, at {checked_at}"),
        HandoffView::Failure { message } => format!("✘ {message}"),
        HandoffView::NoResult => "No result to show".to_string(),
    }
}
