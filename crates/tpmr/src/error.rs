//! CLI error types with miette diagnostics.
//!
//! Maps `tpmr_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text. Raw device replies never reach the message.

use miette::Diagnostic;
use thiserror::Error;

use tpmr_api::ErrorKind;
use tpmr_config::{ConfigError, ResolvedProfile};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to router at {url}")]
    #[diagnostic(
        code(tpmr::connection_failed),
        help(
            "Check that the router is powered on and reachable.\n\
             Run with -vv to see each request.\n\
             Try: tpmr check"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: tpmr_api::Error,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(tpmr::timeout),
        help("Increase the timeout with --timeout or check the router's responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Invalid authentication")]
    #[diagnostic(
        code(tpmr::auth_failed),
        help(
            "Verify the web-management username and password.\n\
             Run: tpmr config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(tpmr::no_credentials),
        help(
            "Store one with: tpmr config set-password --profile {profile}\n\
             Or set TPMR_PASSWORD, or pass --password."
        )
    )]
    NoCredentials { profile: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tpmr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tpmr::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: tpmr config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No router configured")]
    #[diagnostic(
        code(tpmr::no_config),
        help(
            "Create a profile with: tpmr config init\n\
             Or pass --host. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(tpmr::config), help("Fix or remove the config file"))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(tpmr::keyring),
        help("Set TPMR_PASSWORD or a profile password instead.")
    )]
    Keyring(String),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(tpmr::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON output: {0}")]
    #[diagnostic(code(tpmr::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML output: {0}")]
    #[diagnostic(code(tpmr::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::NoConfig { .. }
            | Self::Config(_)
            | Self::Keyring(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => exit_code::GENERAL,
        }
    }

    /// Fill in which router and profile an API failure was about.
    pub fn for_profile(mut self, resolved: &ResolvedProfile) -> Self {
        match &mut self {
            Self::ConnectionFailed { url, .. } => {
                *url = resolved.base_url.as_str().trim_end_matches('/').to_owned();
            }
            Self::AuthFailed { profile } => profile.clone_from(&resolved.name),
            _ => {}
        }
        self
    }
}

impl From<tpmr_api::Error> for CliError {
    fn from(err: tpmr_api::Error) -> Self {
        match err {
            tpmr_api::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            tpmr_api::Error::InvalidValue { field, reason } => Self::Validation { field, reason },
            err if err.kind() == ErrorKind::LoginFailed => Self::AuthFailed {
                profile: "default".into(),
            },
            err => Self::ConnectionFailed {
                url: "router".into(),
                source: err,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Serialization(e) => Self::Validation {
                field: "config".into(),
                reason: e.to_string(),
            },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Keyring(e) => Self::Keyring(e.to_string()),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn resolved() -> ResolvedProfile {
        ResolvedProfile {
            name: "home".into(),
            base_url: tpmr_api::parse_base_url("10.0.0.1").expect("valid"),
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn rejected_login_is_an_auth_failure() {
        let err = CliError::from(tpmr_api::Error::InvalidCredentials { code: 71233 })
            .for_profile(&resolved());
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(matches!(err, CliError::AuthFailed { ref profile } if profile == "home"));
    }

    #[test]
    fn device_failures_report_the_router_url() {
        let err = CliError::from(tpmr_api::Error::Device { code: 71017 }).for_profile(&resolved());
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
        assert_eq!(err.to_string(), "Cannot connect to router at http://10.0.0.1");
    }

    #[test]
    fn malformed_reply_body_stays_out_of_the_message() {
        let err = CliError::from(tpmr_api::Error::MalformedResponse {
            message: "no [error] line".into(),
            body: "secret page".into(),
        });
        assert!(!err.to_string().contains("secret page"));
    }

    #[test]
    fn timeout_keeps_its_own_exit_code() {
        let err = CliError::from(tpmr_api::Error::Timeout { timeout_secs: 3 });
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
        assert_eq!(err.to_string(), "Request timed out after 3s");
    }

    #[test]
    fn unencodable_value_is_a_usage_error() {
        let err = CliError::from(tpmr_api::Error::InvalidValue {
            field: "LTE_SMS_SENDNEWMSG.textContent".into(),
            reason: "line breaks cannot be sent to the device".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        assert!(err.to_string().contains("textContent"));
    }
}
