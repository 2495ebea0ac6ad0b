//! Command dispatch: routes parsed CLI commands to handlers.

pub mod check;
pub mod clients;
pub mod config_cmd;
pub mod info;
pub mod lte;
pub mod sms;
pub mod status;
pub mod system;
pub mod util;
pub mod wifi;

use tpmr_api::{LogoutOutcome, RouterClient};
use tracing::debug;

use crate::cli::{Command, GlobalOpts};
use crate::config::ResolvedProfile;
use crate::error::CliError;

/// Run one device command inside a login / logout pair.
///
/// Logout is attempted even when the command failed; its outcome never
/// changes the command's result.
pub async fn dispatch(
    cmd: Command,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if matches!(cmd, Command::Reboot) {
        let prompt = format!("Reboot the router at {}?", profile.base_url);
        if !util::confirm("reboot", &prompt, global.yes)? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let mut client = RouterClient::new(profile.base_url.as_str(), &profile.transport())
        .map_err(|e| CliError::from(e).for_profile(profile))?;

    if matches!(cmd, Command::Check) {
        return check::handle(&mut client, profile, global).await;
    }

    client
        .login(&profile.username, &profile.password)
        .await
        .map_err(|e| CliError::from(e).for_profile(profile))?;

    let result = run(cmd, &mut client, global).await;

    if let LogoutOutcome::Unconfirmed(err) = client.logout().await {
        debug!(error = %err, "logout not confirmed");
    }
    result.map_err(|e| e.for_profile(profile))
}

async fn run(cmd: Command, client: &mut RouterClient, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(client, global).await,
        Command::Info => info::handle(client, global).await,
        Command::Lte => lte::handle(client, global).await,
        Command::Clients(args) => clients::handle(client, &args, global).await,
        Command::Sms(args) => sms::handle(client, args, global).await,
        Command::Reboot => system::reboot(client, global).await,
        Command::Wifi(args) => wifi::handle(client, args, global).await,
        Command::Check | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
