// Typed device records
//
// The wire format is string-typed. Every string→typed conversion the client
// performs lives here: flags are "1"/"0", numbers may be absent or garbage,
// and code tables grow with firmware. Reads never fail on a bad field; they
// fall back to zero, empty, or "Unknown". Raw codes are kept next to labels.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use strum::{Display, EnumString, IntoStaticStr};

use crate::cgi::ParamObject;

/// Label used whenever a code or name is missing or unrecognized.
pub const UNKNOWN: &str = "Unknown";

// ── Coercion ─────────────────────────────────────────────────────────

/// Raw string value, or empty.
pub(crate) fn text(object: &ParamObject, name: &str) -> String {
    object.get(name).unwrap_or_default().to_owned()
}

/// Raw string value, or [`UNKNOWN`] when missing or blank.
pub(crate) fn text_or_unknown(object: &ParamObject, name: &str) -> String {
    match object.get(name).map(str::trim) {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => UNKNOWN.to_owned(),
    }
}

/// `"1"` is true; anything else, including absence, is false.
pub(crate) fn flag(object: &ParamObject, name: &str) -> bool {
    object.get(name).map(str::trim) == Some("1")
}

/// Parsed number, or zero.
pub(crate) fn number<T: FromStr + Default>(object: &ParamObject, name: &str) -> T {
    object
        .get(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or_default()
}

/// Signal bars `"0"`..`"4"` as a percentage.
pub fn signal_level(code: &str) -> u8 {
    match code.trim() {
        "1" => 25,
        "2" => 50,
        "3" => 75,
        "4" => 100,
        _ => 0,
    }
}

/// SMS timestamps come as `2024-01-31 08:15:00`, some firmware uses a `T`.
pub fn parse_received_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

fn serialize_label<S: Serializer>(label: &'static str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(label)
}

// ── Code tables ──────────────────────────────────────────────────────

/// Radio access technology reported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum NetworkType {
    #[strum(serialize = "No Service")]
    NoService,
    #[strum(serialize = "GSM")]
    Gsm,
    #[strum(serialize = "WCDMA")]
    Wcdma,
    #[strum(serialize = "4G LTE")]
    Lte,
    #[strum(serialize = "TD-SCDMA")]
    TdScdma,
    #[strum(serialize = "CDMA 1x")]
    Cdma1x,
    #[strum(serialize = "CDMA 1x Ev-Do")]
    Cdma1xEvDo,
    #[strum(serialize = "4G+ LTE")]
    LteAdvanced,
    Unknown,
}

impl NetworkType {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::NoService,
            "1" => Self::Gsm,
            "2" => Self::Wcdma,
            "3" => Self::Lte,
            "4" => Self::TdScdma,
            "5" => Self::Cdma1x,
            "6" => Self::Cdma1xEvDo,
            "7" => Self::LteAdvanced,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

impl Serialize for NetworkType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_label(self.label(), serializer)
    }
}

/// SIM card state as reported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum SimStatus {
    #[strum(serialize = "No SIM card detected or SIM card error.")]
    NotDetectedOrError,
    #[strum(serialize = "No SIM card detected.")]
    NotDetected,
    #[strum(serialize = "SIM card error.")]
    Error,
    #[strum(serialize = "SIM card prepared.")]
    Prepared,
    #[strum(serialize = "SIM locked.")]
    Locked,
    #[strum(serialize = "SIM unlocked. Authentication succeeded.")]
    Unlocked,
    #[strum(serialize = "PIN locked.")]
    PinLocked,
    #[strum(serialize = "SIM card is locked permanently.")]
    LockedPermanently,
    #[strum(serialize = "suspension of transmission")]
    Suspended,
    #[strum(serialize = "Unopened")]
    Unopened,
    Unknown,
}

impl SimStatus {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => Self::NotDetectedOrError,
            "1" => Self::NotDetected,
            "2" => Self::Error,
            "3" => Self::Prepared,
            "4" => Self::Locked,
            "5" => Self::Unlocked,
            "6" => Self::PinLocked,
            "7" => Self::LockedPermanently,
            "8" => Self::Suspended,
            "9" => Self::Unopened,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        self.into()
    }
}

impl Serialize for SimStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_label(self.label(), serializer)
    }
}

/// Wi-Fi radio band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum WifiBand {
    #[strum(to_string = "2.4 GHz", serialize = "2.4", serialize = "2.4ghz", serialize = "2g")]
    #[serde(rename = "2.4GHz")]
    TwoPointFourGhz,
    #[strum(to_string = "5 GHz", serialize = "5", serialize = "5ghz", serialize = "5g")]
    #[serde(rename = "5GHz")]
    FiveGhz,
}

impl WifiBand {
    /// Position of the band in the WLAN object stack.
    pub fn stack_code(self) -> u8 {
        match self {
            Self::TwoPointFourGhz => 1,
            Self::FiveGhz => 2,
        }
    }
}

/// Which SSID on a band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiNetwork {
    #[default]
    #[strum(serialize = "main")]
    Main,
    #[strum(serialize = "guest")]
    Guest,
}

impl WifiNetwork {
    pub fn from_guest(guest: bool) -> Self {
        if guest { Self::Guest } else { Self::Main }
    }

    pub(crate) fn object(self) -> &'static str {
        match self {
            Self::Main => "LAN_WLAN",
            Self::Guest => "LAN_WLAN_MSSIDENTRY",
        }
    }

    pub(crate) fn stack_code(self) -> u8 {
        match self {
            Self::Main => 0,
            Self::Guest => 1,
        }
    }

    /// Stack addressing this network on `band`, e.g. `1,2,0,0,0,0`.
    pub(crate) fn stack(self, band: WifiBand) -> String {
        format!("1,{},{},0,0,0", band.stack_code(), self.stack_code())
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// Device identity from `IGD_DEV_INFO`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model_name: String,
    pub description: String,
    pub hardware_version: String,
    pub software_version: String,
    pub product_version: String,
}

impl DeviceInfo {
    pub(crate) const FIELDS: [&'static str; 6] = [
        "manufacturer",
        "modelName",
        "description",
        "hardwareVersion",
        "softwareVersion",
        "X_TP_ProductVersion",
    ];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            manufacturer: text(object, "manufacturer"),
            model_name: text(object, "modelName"),
            description: text(object, "description"),
            hardware_version: text(object, "hardwareVersion"),
            software_version: text(object, "softwareVersion"),
            product_version: text(object, "X_TP_ProductVersion"),
        }
    }
}

/// First WAN IP connection from `WAN_IP_CONN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WanIpConnection {
    pub enabled: bool,
    pub name: String,
    pub connection_status: String,
    pub mac_address: String,
    pub external_ip: String,
    pub subnet_mask: String,
    pub default_gateway: String,
    pub dns_servers: String,
}

impl WanIpConnection {
    pub(crate) const FIELDS: [&'static str; 8] = [
        "enable",
        "name",
        "connectionStatus",
        "MACAddress",
        "externalIPAddress",
        "subnetMask",
        "defaultGateway",
        "DNSServers",
    ];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            enabled: flag(object, "enable"),
            name: text(object, "name"),
            connection_status: text(object, "connectionStatus"),
            mac_address: text(object, "MACAddress"),
            external_ip: text(object, "externalIPAddress"),
            subnet_mask: text(object, "subnetMask"),
            default_gateway: text(object, "defaultGateway"),
            dns_servers: text(object, "DNSServers"),
        }
    }
}

/// One LTE link from `WAN_LTE_LINK_CFG`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LteLink {
    pub enabled: bool,
    /// Raw connect-status code.
    pub connect_status: String,
    pub network_type_code: String,
    pub network_type: NetworkType,
    pub roaming: bool,
    pub sim_status_code: String,
    pub sim_status: SimStatus,
    pub signal_strength_code: String,
    /// 0, 25, 50, 75 or 100.
    pub signal_level: u8,
}

impl LteLink {
    pub(crate) const FIELDS: [&'static str; 6] = [
        "enable",
        "connectStatus",
        "networkType",
        "roamingStatus",
        "simStatus",
        "signalStrength",
    ];

    pub fn from_object(object: &ParamObject) -> Self {
        let network_type_code = text(object, "networkType");
        let sim_status_code = text(object, "simStatus");
        let signal_strength_code = text(object, "signalStrength");
        Self {
            enabled: flag(object, "enable"),
            connect_status: text(object, "connectStatus"),
            network_type: NetworkType::from_code(&network_type_code),
            network_type_code,
            roaming: flag(object, "roamingStatus"),
            sim_status: SimStatus::from_code(&sim_status_code),
            sim_status_code,
            signal_level: signal_level(&signal_strength_code),
            signal_strength_code,
        }
    }

    pub fn network_type_info(&self) -> &'static str {
        self.network_type.label()
    }

    pub fn sim_status_info(&self) -> &'static str {
        self.sim_status.label()
    }
}

/// Traffic counters from `WAN_LTE_INTF_CFG`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LteInterface {
    /// Bytes per second.
    pub rx_rate: u64,
    pub tx_rate: u64,
    /// Bytes since the counters were last reset.
    pub total_bytes: f64,
    /// Bytes in the current connection.
    pub session_bytes: f64,
    pub data_limit: u64,
    pub data_limit_enabled: bool,
}

impl LteInterface {
    pub(crate) const FIELDS: [&'static str; 6] = [
        "curRxSpeed",
        "curTxSpeed",
        "totalStatistics",
        "curStatistics",
        "dataLimit",
        "enableDataLimit",
    ];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            rx_rate: number(object, "curRxSpeed"),
            tx_rate: number(object, "curTxSpeed"),
            total_bytes: number(object, "totalStatistics"),
            session_bytes: number(object, "curStatistics"),
            data_limit: number(object, "dataLimit"),
            data_limit_enabled: flag(object, "enableDataLimit"),
        }
    }
}

/// Carrier profile from `LTE_WAN_CFG`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LteProfile {
    pub profile_name: String,
    pub data_enabled: bool,
    pub roaming_enabled: bool,
}

impl LteProfile {
    pub(crate) const FIELDS: [&'static str; 3] = ["profileName", "dataSwitch", "roamSwitch"];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            profile_name: text_or_unknown(object, "profileName"),
            data_enabled: flag(object, "dataSwitch"),
            roaming_enabled: flag(object, "roamSwitch"),
        }
    }
}

/// WAN access type from `WAN_COMMON_INTF_CFG`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WanCommon {
    pub access_type: String,
}

impl WanCommon {
    pub(crate) const FIELDS: [&'static str; 1] = ["WANAccessType"];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            access_type: text_or_unknown(object, "WANAccessType"),
        }
    }
}

/// A LAN host from `LAN_HOST_ENTRY`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectedClient {
    pub ip_address: String,
    pub mac_address: String,
    pub host_name: String,
    /// Raw connection type (wired, 2.4G, 5G...) as reported.
    pub connection_type: String,
    pub active: bool,
}

impl ConnectedClient {
    pub(crate) const FIELDS: [&'static str; 5] =
        ["IPAddress", "MACAddress", "hostName", "X_TP_ConnType", "active"];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            ip_address: text(object, "IPAddress"),
            mac_address: text(object, "MACAddress"),
            host_name: text(object, "hostName"),
            connection_type: text(object, "X_TP_ConnType"),
            active: flag(object, "active"),
        }
    }
}

/// One inbox message from `LTE_SMS_RECVMSGENTRY`.
///
/// The reply format is one `name=value` per line with no escaping, so
/// `content` holds only the first line of a multi-line message. A later
/// line that itself looks like `name=value` is read as a field of the
/// same entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmsMessage {
    pub index: u32,
    pub from: String,
    pub content: String,
    pub received_at: Option<NaiveDateTime>,
    pub unread: bool,
}

impl SmsMessage {
    pub(crate) const FIELDS: [&'static str; 5] =
        ["index", "from", "content", "receivedTime", "unread"];

    pub fn from_object(object: &ParamObject) -> Self {
        Self {
            index: number(object, "index"),
            from: text(object, "from"),
            content: text(object, "content"),
            received_at: object.get("receivedTime").and_then(parse_received_time),
            unread: flag(object, "unread"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn object(pairs: &[(&str, &str)]) -> ParamObject {
        ParamObject::from_pairs("0,0,0,0,0,0", pairs.iter().copied())
    }

    #[test]
    fn signal_codes_map_to_percentages() {
        let levels: Vec<u8> = ["0", "1", "2", "3", "4", "5", "", "x"]
            .into_iter()
            .map(signal_level)
            .collect();
        assert_eq!(levels, [0, 25, 50, 75, 100, 0, 0, 0]);
    }

    #[test]
    fn network_type_labels() {
        assert_eq!(NetworkType::from_code("3").label(), "4G LTE");
        assert_eq!(NetworkType::from_code("7").to_string(), "4G+ LTE");
        assert_eq!(NetworkType::from_code("0").label(), "No Service");
        assert_eq!(NetworkType::from_code("42").label(), "Unknown");
        assert_eq!(NetworkType::from_code("").label(), "Unknown");
    }

    #[test]
    fn sim_status_labels() {
        assert_eq!(
            SimStatus::from_code("5").label(),
            "SIM unlocked. Authentication succeeded."
        );
        assert_eq!(SimStatus::from_code("8").label(), "suspension of transmission");
        assert_eq!(SimStatus::from_code("10").label(), "Unknown");
    }

    #[test]
    fn lte_link_keeps_codes_and_labels() {
        let link = LteLink::from_object(&object(&[
            ("enable", "1"),
            ("connectStatus", "4"),
            ("networkType", "3"),
            ("roamingStatus", "0"),
            ("simStatus", "3"),
            ("signalStrength", "3"),
        ]));
        assert!(link.enabled);
        assert!(!link.roaming);
        assert_eq!(link.signal_level, 75);
        assert_eq!(link.network_type_info(), "4G LTE");
        assert_eq!(link.network_type_code, "3");
        assert_eq!(link.sim_status_info(), "SIM card prepared.");
        assert_eq!(link.connect_status, "4");
    }

    #[test]
    fn missing_fields_default_instead_of_failing() {
        let empty = object(&[]);
        let link = LteLink::from_object(&empty);
        assert_eq!(link.signal_level, 0);
        assert_eq!(link.network_type, NetworkType::Unknown);
        assert_eq!(link.sim_status, SimStatus::Unknown);

        assert_eq!(LteInterface::from_object(&empty), LteInterface::default());
        assert_eq!(LteProfile::from_object(&empty).profile_name, UNKNOWN);
        assert_eq!(WanCommon::from_object(&empty).access_type, UNKNOWN);
    }

    #[test]
    fn non_numeric_counters_are_zero() {
        let intf = LteInterface::from_object(&object(&[
            ("curRxSpeed", "1200"),
            ("curTxSpeed", "n/a"),
            ("totalStatistics", "12345.5"),
            ("curStatistics", ""),
        ]));
        assert_eq!(intf.rx_rate, 1200);
        assert_eq!(intf.tx_rate, 0);
        assert!((intf.total_bytes - 12345.5).abs() < f64::EPSILON);
        assert!(intf.session_bytes.abs() < f64::EPSILON);
    }

    #[test]
    fn sms_time_is_parsed_leniently() {
        let sms = SmsMessage::from_object(&object(&[
            ("index", "2"),
            ("from", "+15550100"),
            ("content", "hello"),
            ("receivedTime", "2024-01-31 08:15:00"),
            ("unread", "1"),
        ]));
        assert_eq!(sms.index, 2);
        assert!(sms.unread);
        assert_eq!(
            sms.received_at.map(|t| t.to_string()),
            Some("2024-01-31 08:15:00".to_owned())
        );

        assert!(parse_received_time("2024-01-31T08:15:00").is_some());
        assert!(parse_received_time("yesterday").is_none());
    }

    #[test]
    fn wifi_band_parsing_and_stack() {
        assert_eq!("2.4".parse::<WifiBand>().ok(), Some(WifiBand::TwoPointFourGhz));
        assert_eq!("5GHz".parse::<WifiBand>().ok(), Some(WifiBand::FiveGhz));
        assert!("6".parse::<WifiBand>().is_err());
        assert_eq!(WifiNetwork::Guest.stack(WifiBand::FiveGhz), "1,2,1,0,0,0");
        assert_eq!(WifiNetwork::Main.stack(WifiBand::TwoPointFourGhz), "1,1,0,0,0,0");
        assert_eq!(WifiBand::FiveGhz.to_string(), "5 GHz");
    }

    #[test]
    fn labels_serialize_as_text() {
        assert_eq!(
            serde_json::to_string(&NetworkType::Lte).ok().as_deref(),
            Some("\"4G LTE\"")
        );
    }
}
