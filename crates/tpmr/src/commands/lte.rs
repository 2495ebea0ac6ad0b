//! `tpmr lte`: link state, traffic counters and provider profile.

use serde::Serialize;
use tpmr_api::{LteInterface, LteLink, LteProfile, RouterClient, WanCommon};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct LteReport {
    links: Vec<LteLink>,
    interface: LteInterface,
    profile: LteProfile,
    wan: WanCommon,
}

fn detail(r: &LteReport, color: bool) -> String {
    let mut pairs = Vec::new();
    if r.links.is_empty() {
        pairs.push(("Link", "none reported".to_owned()));
    }
    for link in &r.links {
        pairs.extend([
            ("LTE", output::on_off(link.enabled, color)),
            ("Status", link.connect_status.clone()),
            ("Network", link.network_type_info().to_owned()),
            ("Signal", output::signal(link.signal_level, color)),
            ("SIM", link.sim_status_info().to_owned()),
            ("Roaming", output::on_off(link.roaming, color)),
        ]);
    }

    let i = &r.interface;
    pairs.extend([
        ("Download", output::rate(i.rx_rate)),
        ("Upload", output::rate(i.tx_rate)),
        ("Total traffic", output::bytes(i.total_bytes)),
        ("This session", output::bytes(i.session_bytes)),
    ]);
    if i.data_limit_enabled {
        pairs.push(("Data limit", i.data_limit.to_string()));
    }
    pairs.extend([
        ("Provider", r.profile.profile_name.clone()),
        ("Mobile data", output::on_off(r.profile.data_enabled, color)),
        ("Data roaming", output::on_off(r.profile.roaming_enabled, color)),
        ("Connection", r.wan.access_type.clone()),
    ]);
    output::detail_lines(&pairs)
}

pub async fn handle(client: &mut RouterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let report = LteReport {
        links: client.get_wan_lte_link_cfg().await?,
        interface: client.get_wan_lte_intf_cfg().await?,
        profile: client.get_lte_wan_cfg().await?,
        wan: client.get_wan_common_intf_cfg().await?,
    };
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| detail(r, color),
        |r| {
            r.links
                .first()
                .map(|l| l.signal_level.to_string())
                .unwrap_or_default()
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
