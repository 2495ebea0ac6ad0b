//! `tpmr check`: validate a profile before saving or scripting against it.
//!
//! Runs the same login / read / logout sequence a device command would and
//! reports each step, so a bad password and an unreachable router are told
//! apart.

use std::fmt::Write as _;

use serde::Serialize;
use tpmr_api::RouterClient;

use crate::cli::GlobalOpts;
use crate::config::ResolvedProfile;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct CheckReport {
    profile: String,
    url: String,
    model: String,
    firmware: String,
    logout_confirmed: bool,
}

pub async fn handle(
    client: &mut RouterClient,
    profile: &ResolvedProfile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fail = |e: tpmr_api::Error| CliError::from(e).for_profile(profile);

    client
        .login(&profile.username, &profile.password)
        .await
        .map_err(fail)?;

    let info = match client.get_device_info().await {
        Ok(info) => info,
        Err(e) => {
            let _ = client.logout().await;
            return Err(fail(e));
        }
    };
    let logout = client.logout().await;

    let report = CheckReport {
        profile: profile.name.clone(),
        url: client.base_url().as_str().trim_end_matches('/').to_owned(),
        model: info.model_name,
        firmware: info.software_version,
        logout_confirmed: logout.is_confirmed(),
    };
    let out = output::render_single(
        global.output,
        &report,
        |r| {
            let mut text = format!("✓ Connected to {} at {} ({})", r.model, r.url, r.profile);
            if !r.firmware.is_empty() {
                let _ = write!(text, "\n  Firmware: {}", r.firmware);
            }
            if !r.logout_confirmed {
                text.push_str("\n  Logout was not confirmed by the router");
            }
            text
        },
        |r| r.model.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
