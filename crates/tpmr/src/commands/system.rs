//! `tpmr reboot`.

use tpmr_api::RouterClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Confirmation happens in dispatch, before the login.
pub async fn reboot(client: &mut RouterClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.reboot().await?;
    if !global.quiet {
        eprintln!("✓ Reboot requested; the router will be unreachable for a minute or two");
    }
    Ok(())
}
