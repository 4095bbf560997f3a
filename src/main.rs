#![forbid(unsafe_code)]

//! `scorm-autopilot` — automated SCORM lesson completion binary.
//!
//! Bootstraps configuration, creates the `WebDriver` browser session,
//! authenticates, discovers the course's SCORM modules, and runs the
//! advancement loop until the list is exhausted or the run is cancelled.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use scorm_autopilot::config::GlobalConfig;
use scorm_autopilot::driver::webdriver::WebDriverSession;
use scorm_autopilot::driver::PageDriver;
use scorm_autopilot::orchestrator::runner::SessionOrchestrator;
use scorm_autopilot::{auth, discovery, AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "scorm-autopilot", about = "Automated SCORM lesson completion", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the configured 1-based starting module number.
    #[arg(long)]
    start_from: Option<u32>,

    /// Override the configured module title keyword.
    #[arg(long)]
    keyword: Option<String>,

    /// List the discovered modules and exit without processing them.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("scorm-autopilot bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(start) = args.start_from {
        config.start_from_lesson = start;
    }
    if let Some(keyword) = args.keyword {
        config.lesson_keyword = keyword;
    }
    config.load_credentials().await?;
    info!("configuration loaded");

    let cancel = CancellationToken::new();
    spawn_cancel_listener(cancel.clone());

    let driver = WebDriverSession::connect(&config.webdriver_url).await?;
    info!("browser session created");

    let outcome = drive(&driver, &config, args.dry_run, cancel).await;

    // The session is torn down whatever the run produced.
    if let Err(err) = driver.teardown().await {
        warn!(%err, "browser session teardown failed");
    }
    outcome
}

async fn drive(
    driver: &dyn PageDriver,
    config: &GlobalConfig,
    dry_run: bool,
    cancel: CancellationToken,
) -> Result<()> {
    auth::login(driver, config).await?;

    let modules = discovery::discover_modules(driver, config).await?;
    if modules.is_empty() {
        info!("no modules matched, nothing to do");
        return Ok(());
    }

    if dry_run {
        for (index, module) in modules.iter().enumerate() {
            info!(number = index + 1, title = %module.title, url = %module.url, "discovered");
        }
        return Ok(());
    }

    let orchestrator = SessionOrchestrator::from_config(config, cancel);
    let tally = orchestrator
        .run(driver, &modules, config.start_from_lesson)
        .await?;
    info!(
        completed = tally.completed,
        failed = tally.failed,
        attempted = tally.attempted(),
        "run finished"
    );
    Ok(())
}

fn spawn_cancel_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, finishing the current module");
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
