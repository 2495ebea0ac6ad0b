// LAN host table.

use tracing::debug;

use crate::cgi::Act;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::ConnectedClient;

impl RouterClient {
    /// Hosts known to the LAN side. Includes inactive entries; filter on
    /// [`ConnectedClient::active`] if needed.
    ///
    /// GL `LAN_HOST_ENTRY`
    pub async fn get_clients(&mut self) -> Result<Vec<ConnectedClient>, Error> {
        debug!("listing LAN clients");
        let act = Act::get_list("LAN_HOST_ENTRY").fields(ConnectedClient::FIELDS);
        let objects = self.read_list(act).await?;
        Ok(objects.iter().map(ConnectedClient::from_object).collect())
    }
}
