// Wi-Fi radio on/off per band and SSID.

use tracing::debug;

use crate::cgi::Act;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::{WifiBand, WifiNetwork, flag};

impl RouterClient {
    /// Whether the main or guest network on `band` is enabled.
    pub async fn get_wifi_state(
        &mut self,
        band: WifiBand,
        network: WifiNetwork,
    ) -> Result<bool, Error> {
        debug!(%band, %network, "reading Wi-Fi state");
        let act = Act::get(network.object())
            .stack(network.stack(band))
            .fields(["enable"]);
        let object = self.read_object(act).await?;
        Ok(flag(&object, "enable"))
    }

    /// Turn the main or guest network on `band` on or off.
    pub async fn set_wifi_state(
        &mut self,
        band: WifiBand,
        on: bool,
        network: WifiNetwork,
    ) -> Result<(), Error> {
        debug!(%band, %network, on, "setting Wi-Fi state");
        let act = Act::set(network.object())
            .stack(network.stack(band))
            .assign("enable", u8::from(on));
        self.call(&[act]).await?;
        Ok(())
    }
}
