// One-shot router status snapshot
//
// Reads every status object on an authenticated client and folds them into a
// single record with the derived counters a dashboard wants. Scheduling is
// the caller's business.

use serde::Serialize;
use tracing::debug;

use crate::cgi::ParamObject;
use crate::client::RouterClient;
use crate::error::Error;
use crate::models::{
    ConnectedClient, DeviceInfo, LteInterface, LteLink, LteProfile, NetworkType, SimStatus,
    SmsMessage, WanCommon, WanIpConnection,
};

/// Everything the status read returns, before derivation.
struct Readings {
    device: DeviceInfo,
    wan: WanIpConnection,
    links: Vec<LteLink>,
    interface: LteInterface,
    profile: LteProfile,
    common: WanCommon,
    clients: Vec<ConnectedClient>,
    sms: Vec<SmsMessage>,
}

/// Snapshot of device identity, LTE state, traffic and counters.
///
/// LTE fields come from the first link; with no link they hold the same
/// defaults a link with no fields would.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterStatus {
    pub device: DeviceInfo,
    /// Web UI address, e.g. `http://10.0.0.1`.
    pub device_url: String,
    pub wan: WanIpConnection,
    pub lte_enabled: bool,
    pub lte_signal_level: u8,
    pub lte_network_type: NetworkType,
    pub lte_sim_status: SimStatus,
    pub lte_connect_status: String,
    pub lte_rx_rate: u64,
    pub lte_tx_rate: u64,
    pub lte_total_bytes: f64,
    pub isp_name: String,
    pub connection_type: String,
    pub total_clients: usize,
    pub unread_sms: usize,
    pub clients: Vec<ConnectedClient>,
    pub sms: Vec<SmsMessage>,
}

impl RouterStatus {
    /// Read every status object. The client must be logged in; the first
    /// failing read aborts the snapshot.
    pub async fn fetch(client: &mut RouterClient) -> Result<Self, Error> {
        debug!("collecting router status");
        let readings = Readings {
            device: client.get_device_info().await?,
            wan: client.get_wan_ip_connection().await?,
            links: client.get_wan_lte_link_cfg().await?,
            interface: client.get_wan_lte_intf_cfg().await?,
            profile: client.get_lte_wan_cfg().await?,
            common: client.get_wan_common_intf_cfg().await?,
            clients: client.get_clients().await?,
            sms: client.get_sms().await?,
        };
        let device_url = client.base_url().as_str().trim_end_matches('/').to_owned();
        Ok(Self::from_readings(device_url, readings))
    }

    fn from_readings(device_url: String, readings: Readings) -> Self {
        let Readings {
            device,
            wan,
            links,
            interface,
            profile,
            common,
            clients,
            sms,
        } = readings;

        let link = links
            .into_iter()
            .next()
            .unwrap_or_else(|| LteLink::from_object(&ParamObject::default()));

        Self {
            device,
            device_url,
            wan,
            lte_enabled: link.enabled,
            lte_signal_level: link.signal_level,
            lte_network_type: link.network_type,
            lte_sim_status: link.sim_status,
            lte_connect_status: link.connect_status,
            lte_rx_rate: interface.rx_rate,
            lte_tx_rate: interface.tx_rate,
            lte_total_bytes: interface.total_bytes,
            isp_name: profile.profile_name,
            connection_type: common.access_type,
            total_clients: clients.len(),
            unread_sms: sms.iter().filter(|m| m.unread).count(),
            clients,
            sms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms(index: u32, unread: bool) -> SmsMessage {
        SmsMessage {
            index,
            from: "+15550100".into(),
            content: "hi".into(),
            received_at: None,
            unread,
        }
    }

    fn readings() -> Readings {
        Readings {
            device: DeviceInfo::default(),
            wan: WanIpConnection::default(),
            links: vec![LteLink::from_object(&ParamObject::from_pairs(
                "1,0,0,0,0,0",
                [
                    ("enable", "1"),
                    ("signalStrength", "4"),
                    ("networkType", "7"),
                    ("simStatus", "3"),
                    ("connectStatus", "4"),
                ],
            ))],
            interface: LteInterface {
                rx_rate: 1000,
                tx_rate: 200,
                total_bytes: 5e9,
                ..LteInterface::default()
            },
            profile: LteProfile::from_object(&ParamObject::from_pairs("", [("profileName", "Carrier")])),
            common: WanCommon::from_object(&ParamObject::default()),
            clients: vec![ConnectedClient::default(), ConnectedClient::default()],
            sms: vec![sms(1, true), sms(2, false), sms(3, true)],
        }
    }

    #[test]
    fn derives_counts_and_lte_fields() {
        let status = RouterStatus::from_readings("http://10.0.0.1".into(), readings());
        assert_eq!(status.total_clients, 2);
        assert_eq!(status.unread_sms, 2);
        assert_eq!(status.lte_signal_level, 100);
        assert_eq!(status.lte_network_type.label(), "4G+ LTE");
        assert_eq!(status.lte_sim_status.label(), "SIM card prepared.");
        assert_eq!(status.lte_rx_rate, 1000);
        assert_eq!(status.isp_name, "Carrier");
        assert_eq!(status.connection_type, "Unknown");
        assert_eq!(status.device_url, "http://10.0.0.1");
    }

    #[test]
    fn no_lte_link_falls_back_to_defaults() {
        let mut r = readings();
        r.links.clear();
        let status = RouterStatus::from_readings("http://10.0.0.1".into(), r);
        assert!(!status.lte_enabled);
        assert_eq!(status.lte_signal_level, 0);
        assert_eq!(status.lte_network_type, NetworkType::Unknown);
    }
}
