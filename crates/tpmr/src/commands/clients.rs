//! `tpmr clients`: the router's host table.

use tabled::Tabled;
use tpmr_api::{ConnectedClient, RouterClient};

use crate::cli::{ClientsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Via")]
    via: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&ConnectedClient> for ClientRow {
    fn from(c: &ConnectedClient) -> Self {
        Self {
            host: c.host_name.clone(),
            ip: c.ip_address.clone(),
            mac: c.mac_address.clone(),
            via: c.connection_type.clone(),
            active: if c.active { "yes" } else { "no" }.into(),
        }
    }
}

pub async fn handle(
    client: &mut RouterClient,
    args: &ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut clients = client.get_clients().await?;
    if args.active {
        clients.retain(|c| c.active);
    }
    let out = output::render_list(global.output, &clients, |c| ClientRow::from(c), |c| {
        c.ip_address.clone()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
