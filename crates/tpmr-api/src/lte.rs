// LTE link, interface counters, carrier profile and WAN access type.

use tracing::debug;

use crate::cgi::Act;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::{LteInterface, LteLink, LteProfile, WanCommon};

/// The LTE interface lives at this stack on every MR model seen so far.
const LTE_INTF_STACK: &str = "2,0,0,0,0,0";
const LTE_PROFILE_STACK: &str = "2,1,0,0,0,0";

impl RouterClient {
    /// Every LTE link, with signal, network type and SIM status decoded.
    ///
    /// GL `WAN_LTE_LINK_CFG`
    pub async fn get_wan_lte_link_cfg(&mut self) -> Result<Vec<LteLink>, Error> {
        debug!("fetching LTE link config");
        let act = Act::get_list("WAN_LTE_LINK_CFG").fields(LteLink::FIELDS);
        let objects = self.read_list(act).await?;
        Ok(objects.iter().map(LteLink::from_object).collect())
    }

    /// Current RX/TX rates and byte counters.
    ///
    /// GET `WAN_LTE_INTF_CFG`
    pub async fn get_wan_lte_intf_cfg(&mut self) -> Result<LteInterface, Error> {
        debug!("fetching LTE interface counters");
        let act = Act::get("WAN_LTE_INTF_CFG")
            .stack(LTE_INTF_STACK)
            .fields(LteInterface::FIELDS);
        let object = self.read_object(act).await?;
        Ok(LteInterface::from_object(&object))
    }

    /// Active carrier profile.
    ///
    /// GET `LTE_WAN_CFG`
    pub async fn get_lte_wan_cfg(&mut self) -> Result<LteProfile, Error> {
        debug!("fetching LTE WAN profile");
        let act = Act::get("LTE_WAN_CFG")
            .stack(LTE_PROFILE_STACK)
            .fields(LteProfile::FIELDS);
        let object = self.read_object(act).await?;
        Ok(LteProfile::from_object(&object))
    }

    /// WAN access type label.
    ///
    /// GET `WAN_COMMON_INTF_CFG`
    pub async fn get_wan_common_intf_cfg(&mut self) -> Result<WanCommon, Error> {
        debug!("fetching WAN common config");
        let act = Act::get("WAN_COMMON_INTF_CFG")
            .stack(LTE_INTF_STACK)
            .fields(WanCommon::FIELDS);
        let object = self.read_object(act).await?;
        Ok(WanCommon::from_object(&object))
    }
}
