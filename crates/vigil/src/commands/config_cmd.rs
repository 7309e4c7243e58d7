//! Config subcommand handlers.

use std::io::BufRead;
use std::path::PathBuf;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use vigil_config::Config;

// ── Helpers ─────────────────────────────────────────────────────────

fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(vigil_config::config_path)
}

/// Copy of `cfg` with plaintext tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some("****".into());
        }
    }
    cfg
}

fn to_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = resolve_path(global);

    match args.command {
        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = vigil_config::load_config_from(&path)?;
            let out = output::render_single(global.output, &redacted(&cfg), to_toml)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init { base_url, force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let cfg = Config::starter(base_url);
            // Fail early on a base URL that cannot produce webhook URLs.
            vigil_config::build_dashboard_config(
                cfg.profile(vigil_config::DEFAULT_PROFILE)?,
                &cfg.defaults,
                None,
                None,
            )?;
            vigil_config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = vigil_config::load_config_from(&path)?;
            let default = cfg.active_profile_name(None);
            let lines: Vec<String> = cfg
                .profiles
                .keys()
                .map(|name| {
                    if *name == default {
                        format!("{name} (default)")
                    } else {
                        name.clone()
                    }
                })
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken => {
            let cfg = vigil_config::load_config_from(&path)?;
            let profile = cfg.active_profile_name(global.profile.as_deref());

            let mut token = String::new();
            std::io::stdin().lock().read_line(&mut token)?;
            let token = token.trim();
            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "expected a token on stdin".into(),
                });
            }

            vigil_config::store_token(&profile, token)?;
            if !global.quiet {
                eprintln!("Token for profile '{profile}' stored in system keyring");
            }
            Ok(())
        }
    }
}
