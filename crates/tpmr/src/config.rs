//! CLI configuration: thin wrapper around `tpmr_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides (--host, --username,
//! --password, --timeout) on top of the stored profile.

use secrecy::SecretString;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use tpmr_config::{
    Config, Profile, ResolvedProfile, config_path, load_config, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build the connection settings for a device command.
///
/// Flags win over the stored profile. With no stored profile, `--host`
/// alone is enough; the password then comes from `--password`, the
/// environment or the keyring.
pub fn resolve(global: &GlobalOpts) -> Result<ResolvedProfile, CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profiles.get(&name), global.host.as_deref()) {
        (Some(stored), _) => stored.clone(),
        (None, Some(host)) => Profile::new(host),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name,
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };
    apply_overrides(&mut profile, global);

    let password = match global.password.as_deref() {
        Some(pw) => SecretString::from(pw.to_owned()),
        None => tpmr_config::resolve_password(&profile, &name)?,
    };

    Ok(tpmr_config::resolve_profile_with_password(
        &profile,
        &name,
        &cfg.defaults,
        password,
    )?)
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}
