//! `tpmr status`: the full one-shot snapshot.

use tpmr_api::{RouterClient, RouterStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

fn detail(s: &RouterStatus, color: bool) -> String {
    output::detail_lines(&[
        ("Model", or_dash(&s.device.model_name).to_owned()),
        ("Firmware", or_dash(&s.device.software_version).to_owned()),
        ("Web UI", s.device_url.clone()),
        ("WAN IP", or_dash(&s.wan.external_ip).to_owned()),
        ("LTE", output::on_off(s.lte_enabled, color)),
        ("Network", s.lte_network_type.to_string()),
        ("Signal", output::signal(s.lte_signal_level, color)),
        ("SIM", s.lte_sim_status.to_string()),
        ("Provider", s.isp_name.clone()),
        ("Connection", s.connection_type.clone()),
        ("Download", output::rate(s.lte_rx_rate)),
        ("Upload", output::rate(s.lte_tx_rate)),
        ("Total traffic", output::bytes(s.lte_total_bytes)),
        ("Clients", s.total_clients.to_string()),
        ("Unread SMS", s.unread_sms.to_string()),
    ])
}

pub async fn handle(client: &mut RouterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let status = RouterStatus::fetch(client).await?;
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &status,
        |s| detail(s, color),
        |s| {
            format!(
                "signal={}\nnetwork={}\nclients={}\nunread_sms={}",
                s.lte_signal_level, s.lte_network_type, s.total_clients, s.unread_sms
            )
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
