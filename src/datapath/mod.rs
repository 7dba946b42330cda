//! Krypton - Datapath addressing
//!
//! - [`DatapathAddressSelector`]: ordered, retry-bounded candidate addresses
//! - [`Endpoint`]: a parsed datapath address
//! - [`NetworkInfo`]: the active network's capabilities

mod address_selector;
mod endpoint;
mod network;

pub use address_selector::DatapathAddressSelector;
pub use endpoint::{split_host_port, Endpoint, IpProtocol};
pub use network::{AddressFamily, NetworkInfo, NetworkType};
