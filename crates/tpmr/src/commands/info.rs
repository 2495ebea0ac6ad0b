//! `tpmr info`: device identity and WAN addressing.

use serde::Serialize;
use tpmr_api::{DeviceInfo, RouterClient, WanIpConnection};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

#[derive(Serialize)]
struct InfoReport {
    device: DeviceInfo,
    wan: WanIpConnection,
}

fn detail(r: &InfoReport) -> String {
    let d = &r.device;
    let w = &r.wan;
    output::detail_lines(&[
        ("Manufacturer", or_dash(&d.manufacturer).to_owned()),
        ("Model", or_dash(&d.model_name).to_owned()),
        ("Description", or_dash(&d.description).to_owned()),
        ("Hardware", or_dash(&d.hardware_version).to_owned()),
        ("Firmware", or_dash(&d.software_version).to_owned()),
        ("WAN", or_dash(&w.name).to_owned()),
        ("WAN status", or_dash(&w.connection_status).to_owned()),
        ("WAN MAC", or_dash(&w.mac_address).to_owned()),
        ("External IP", or_dash(&w.external_ip).to_owned()),
        ("Subnet mask", or_dash(&w.subnet_mask).to_owned()),
        ("Gateway", or_dash(&w.default_gateway).to_owned()),
        ("DNS", or_dash(&w.dns_servers).to_owned()),
    ])
}

pub async fn handle(client: &mut RouterClient, global: &GlobalOpts) -> Result<(), CliError> {
    let report = InfoReport {
        device: client.get_device_info().await?,
        wan: client.get_wan_ip_connection().await?,
    };
    let out = output::render_single(global.output, &report, detail, |r| {
        r.device.model_name.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
