mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use vigil_config::{Config, Profile};
use vigil_core::Dashboard;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::commands::Session;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a webhook
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vigil", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let session = open_session(&cli.global)?;
            tracing::debug!(command = ?cmd, profile = %session.profile, "dispatching command");
            let result = commands::dispatch(cmd, &session, &cli.global).await;
            session.dashboard.shutdown();
            result
        }
    }
}

/// Build the dashboard from the config file, active profile, and CLI overrides.
fn open_session(global: &GlobalOpts) -> Result<Session, CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(vigil_config::config_path);
    let cfg = vigil_config::load_config_from(&path)?;
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile = select_profile(&cfg, &profile_name, global, &path)?;
    if let Some(ref url) = global.base_url {
        profile.base_url = Some(url.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    // Token: flag > profile chain (env var → keyring → plaintext)
    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .or_else(|| vigil_config::resolve_token(&profile, &profile_name));

    let cache_dir = (!global.no_cache).then(vigil_config::cache_dir);
    let dashboard_config =
        vigil_config::build_dashboard_config(&profile, &cfg.defaults, token, cache_dir)?;

    Ok(Session {
        dashboard: Dashboard::new(dashboard_config)?,
        profile: profile_name,
    })
}

/// The named profile, or an ad-hoc one when only `--base-url` is given.
fn select_profile(
    cfg: &Config,
    name: &str,
    global: &GlobalOpts,
    path: &std::path::Path,
) -> Result<Profile, CliError> {
    if let Some(profile) = cfg.profiles.get(name) {
        return Ok(profile.clone());
    }
    if let Some(ref url) = global.base_url {
        return Ok(Profile::new(url.clone()));
    }
    if global.profile.is_some() || !cfg.profiles.is_empty() {
        return Err(CliError::ProfileNotFound {
            name: name.into(),
            available: cfg.profile_names(),
        });
    }
    Err(CliError::NoConfig {
        path: path.display().to_string(),
    })
}
