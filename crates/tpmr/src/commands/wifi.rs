//! `tpmr wifi get|set`.

use serde::Serialize;
use tpmr_api::{RouterClient, WifiBand, WifiNetwork};

use crate::cli::{BandArg, GlobalOpts, Toggle, WifiArgs, WifiCommand, WifiTarget};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RadioState {
    band: WifiBand,
    network: WifiNetwork,
    enabled: bool,
}

fn band(arg: BandArg) -> WifiBand {
    match arg {
        BandArg::TwoPointFour => WifiBand::TwoPointFourGhz,
        BandArg::Five => WifiBand::FiveGhz,
    }
}

fn target(t: &WifiTarget) -> (WifiBand, WifiNetwork) {
    (band(t.band), WifiNetwork::from_guest(t.guest))
}

pub async fn handle(
    client: &mut RouterClient,
    args: WifiArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WifiCommand::Get { target: t } => {
            let (band, network) = target(&t);
            let enabled = client.get_wifi_state(band, network).await?;
            let state = RadioState {
                band,
                network,
                enabled,
            };
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &state,
                |s| format!("{} {} Wi-Fi: {}", s.band, s.network, output::on_off(s.enabled, color)),
                |s| output::on_off(s.enabled, false),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        WifiCommand::Set { target: t, state } => {
            let (band, network) = target(&t);
            let on = state == Toggle::On;
            client.set_wifi_state(band, on, network).await?;
            if !global.quiet {
                eprintln!(
                    "✓ {band} {network} Wi-Fi turned {}",
                    output::on_off(on, false)
                );
            }
            Ok(())
        }
    }
}
