// tpmr-api: Async Rust client for the TP-Link MR web-management protocol

pub mod cgi;
pub mod client;
pub mod crypto;
pub mod error;
pub mod models;
pub mod status;
pub mod transport;

mod auth;
mod clients;
mod lte;
mod sms;
mod system;
mod wifi;

pub use auth::LogoutOutcome;
pub use cgi::{Act, ActKind, ParamObject, Reply};
pub use client::{RouterClient, Session, parse_base_url};
pub use error::{Error, ErrorKind};
pub use models::{
    ConnectedClient, DeviceInfo, LteInterface, LteLink, LteProfile, NetworkType, SimStatus,
    SmsMessage, WanCommon, WanIpConnection, WifiBand, WifiNetwork,
};
pub use status::RouterStatus;
pub use transport::TransportConfig;
