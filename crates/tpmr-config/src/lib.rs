//! Shared configuration for tpmr.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to a [`ResolvedProfile`] ready to build a `RouterClient`
//! from. The CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use tpmr_api::TransportConfig;

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "tpmr";

/// Password fallback read when a profile names no variable of its own.
pub const PASSWORD_ENV: &str = "TPMR_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile name to use: an explicit choice, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    tpmr_api::transport::DEFAULT_TIMEOUT.as_secs()
}

/// A named router profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Router address: `192.168.1.1` or `http://192.168.1.1`.
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Plaintext password -- prefer the keyring or an env var.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override the default timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_username() -> String {
    "admin".into()
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: None,
            password_env: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tpmr", "tpmr").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tpmr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` with `TPMR_` env overrides.
///
/// A missing file yields the defaults; a file that fails to parse is an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TPMR_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve a profile's password from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |name| keyring_entry(name).ok()?.get_password().ok(),
    )
}

/// Credential chain with injectable lookups:
/// 1. the profile's `password_env` variable
/// 2. `TPMR_PASSWORD`
/// 3. system keyring
/// 4. plaintext in config
pub fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    stored: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    if let Some(val) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    if let Some(secret) = stored(profile_name) {
        return Ok(SecretString::from(secret));
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Resolved profile ────────────────────────────────────────────────

/// Everything needed to talk to one router.
#[derive(Debug)]
pub struct ResolvedProfile {
    pub name: String,
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub timeout: Duration,
}

impl ResolvedProfile {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }
}

/// Validate a profile's host and resolve its password.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ResolvedProfile, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    resolve_profile_with_password(profile, profile_name, defaults, password)
}

/// Validate a profile's host and pair it with an already-known password.
pub fn resolve_profile_with_password(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    password: SecretString,
) -> Result<ResolvedProfile, ConfigError> {
    let base_url =
        tpmr_api::parse_base_url(&profile.host).map_err(|e| ConfigError::Validation {
            field: "host".into(),
            reason: format!("{}: {e}", profile.host),
        })?;

    Ok(ResolvedProfile {
        name: profile_name.into(),
        base_url,
        username: profile.username.clone(),
        password,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn none(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_from(&dir.path().join("nope.toml")).expect("loads");
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 10);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[profiles.home\nhost = \"192.168.1.1\"\n").expect("write");

        let err = load_config_from(&path).expect_err("parse failure");
        assert!(matches!(err, ConfigError::Figment(_)), "{err:?}");
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sub").join("config.toml");

        let mut cfg = Config::default();
        let mut home = Profile::new("192.168.1.1");
        home.timeout = Some(5);
        cfg.profiles.insert("home".into(), home);
        cfg.default_profile = Some("home".into());
        save_config_to(&cfg, &path).expect("saves");

        let loaded = load_config_from(&path).expect("loads");
        assert_eq!(loaded.active_profile_name(None), "home");
        let home = loaded.profile("home").expect("present");
        assert_eq!(home.host, "192.168.1.1");
        assert_eq!(home.username, "admin");
        assert_eq!(home.timeout, Some(5));
        assert!(home.password.is_none());
    }

    #[test]
    fn hand_written_toml_is_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "default_profile = \"lte\"\n\
             [defaults]\noutput = \"json\"\n\
             [profiles.lte]\nhost = \"http://10.0.0.1\"\nusername = \"root\"\npassword_env = \"LTE_PW\"\n",
        )
        .expect("write");

        let cfg = load_config_from(&path).expect("loads");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");
        let lte = cfg.profile("lte").expect("present");
        assert_eq!(lte.username, "root");
        assert_eq!(lte.password_env.as_deref(), Some("LTE_PW"));
        assert!(matches!(
            cfg.profile("other"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn password_chain_order() {
        let mut profile = Profile::new("10.0.0.1");
        profile.password = Some("plain".into());
        profile.password_env = Some("LTE_PW".into());

        let env = |name: &str| match name {
            "LTE_PW" => Some("from-profile-env".to_owned()),
            PASSWORD_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        let stored = |_: &str| Some("from-keyring".to_owned());

        let pw = resolve_password_with(&profile, "home", env, stored).expect("resolves");
        assert_eq!(pw.expose_secret(), "from-profile-env");

        let global_only = |name: &str| (name == PASSWORD_ENV).then(|| "from-global-env".to_owned());
        let pw = resolve_password_with(&profile, "home", global_only, stored).expect("resolves");
        assert_eq!(pw.expose_secret(), "from-global-env");

        let pw = resolve_password_with(&profile, "home", none, stored).expect("resolves");
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile, "home", none, none).expect("resolves");
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn keyring_is_keyed_by_profile() {
        let profile = Profile::new("10.0.0.1");
        let stored = |name: &str| (name == "office").then(|| "pw".to_owned());
        assert!(resolve_password_with(&profile, "office", none, stored).is_ok());
        assert!(matches!(
            resolve_password_with(&profile, "home", none, stored),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn resolved_profile_normalizes_host_and_timeout() {
        let profile = Profile::new("10.0.0.1");
        let resolved = resolve_profile_with_password(
            &profile,
            "home",
            &Defaults::default(),
            SecretString::from("pw".to_owned()),
        )
        .expect("resolves");
        assert_eq!(resolved.base_url.as_str(), "http://10.0.0.1/");
        assert_eq!(resolved.timeout, Duration::from_secs(10));
        assert_eq!(resolved.transport().timeout, Duration::from_secs(10));
    }

    #[test]
    fn bad_host_is_validation_error() {
        let profile = Profile::new("http://bad host");
        let err = resolve_profile_with_password(
            &profile,
            "home",
            &Defaults::default(),
            SecretString::from("pw".to_owned()),
        )
        .expect_err("invalid host");
        assert!(matches!(err, ConfigError::Validation { .. }), "{err:?}");
    }
}
