// Device identity, WAN IP connection and reboot.

use tracing::debug;

use crate::cgi::Act;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::{DeviceInfo, WanIpConnection};

impl RouterClient {
    /// Manufacturer, model and firmware strings.
    ///
    /// GET `IGD_DEV_INFO`
    pub async fn get_device_info(&mut self) -> Result<DeviceInfo, Error> {
        debug!("fetching device info");
        let act = Act::get("IGD_DEV_INFO").fields(DeviceInfo::FIELDS);
        let object = self.read_object(act).await?;
        Ok(DeviceInfo::from_object(&object))
    }

    /// The first WAN IP connection. An empty table yields an all-default
    /// record, as on a device with no LTE attach yet.
    ///
    /// GL `WAN_IP_CONN`
    pub async fn get_wan_ip_connection(&mut self) -> Result<WanIpConnection, Error> {
        debug!("fetching WAN IP connection");
        let act = Act::get_list("WAN_IP_CONN").fields(WanIpConnection::FIELDS);
        let objects = self.read_list(act).await?;
        Ok(objects
            .first()
            .map(WanIpConnection::from_object)
            .unwrap_or_default())
    }

    /// Restart the device. The token dies with the reboot, so a following
    /// `logout` is usually unconfirmed.
    ///
    /// Success means the device acknowledged the request. Some firmware
    /// restarts before replying; that surfaces as a transport error or
    /// [`Error::Timeout`] even though the reboot may be under way.
    ///
    /// OP `ACT_REBOOT`
    pub async fn reboot(&mut self) -> Result<(), Error> {
        debug!("rebooting device");
        self.call(&[Act::operation("ACT_REBOOT")]).await?;
        Ok(())
    }
}
