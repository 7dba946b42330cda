//! Datapath address selection.
//!
//! Takes the egress addresses handed out by the backend and doles them out
//! one at a time, in the order they should be attempted.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use super::endpoint::{Endpoint, IpProtocol};
use super::network::NetworkInfo;
use crate::core::constants::MAX_ATTEMPTS_PER_ADDRESS;
use crate::core::{DatapathProtocol, KryptonConfig, KryptonError, KryptonResult};

/// The ordered attempt plan and how much of it has been consumed.
#[derive(Debug, Default)]
struct SelectorState {
    /// Interleaved addresses, repeated once per allowed attempt.
    plan: Vec<String>,
    /// Number of entries of `plan` already handed out.
    attempts: usize,
}

/// Hands out datapath addresses in retry order.
///
/// After a [`reset`](Self::reset) the plan is fixed: IPv4 and IPv6 addresses
/// alternate (IPv6 first for the bridge datapath, IPv4 first otherwise) and
/// the whole sequence is tried [`MAX_ATTEMPTS_PER_ADDRESS`] times.
#[derive(Debug)]
pub struct DatapathAddressSelector {
    config: KryptonConfig,
    state: Mutex<SelectorState>,
}

impl DatapathAddressSelector {
    /// Create an empty selector.
    pub fn new(config: KryptonConfig) -> Self {
        Self {
            config,
            state: Mutex::new(SelectorState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild the plan from a new set of addresses.
    ///
    /// Call whenever the datapath is about to reconnect, e.g. after a network
    /// switch or a new auth response.
    pub fn reset<S: AsRef<str>>(&self, addresses: &[S], network_info: Option<&NetworkInfo>) {
        if network_info.is_none() {
            warn!("Resetting datapath address selector with no network available.");
        }

        let ipv6_enabled = self.config.ipv6_enabled;
        let mut ipv4 = Vec::new();
        let mut ipv6 = Vec::new();
        for address in addresses.iter().map(AsRef::as_ref) {
            match classify(address) {
                Some(IpProtocol::V6) => {
                    if ipv6_enabled && network_info.is_none_or(|n| n.address_family.supports_v6()) {
                        ipv6.push(address);
                    }
                }
                Some(IpProtocol::V4) => {
                    if !ipv6_enabled || network_info.is_none_or(|n| n.address_family.supports_v4())
                    {
                        ipv4.push(address);
                    }
                }
                None => error!("Datapath address is neither IPv4 nor IPv6: {}", address),
            }
        }

        // The bridge datapath performs better over IPv6. IPsec prefers IPv4
        // since many networks do not offload ESP over IPv6 to hardware.
        let prefer_ipv4 = self.config.datapath_protocol != DatapathProtocol::Bridge;
        if !prefer_ipv4 {
            info!("Preferring IPv6.");
        }
        let interleaved = if prefer_ipv4 {
            interleave(&ipv4, &ipv6)
        } else {
            interleave(&ipv6, &ipv4)
        };

        let plan: Vec<String> = std::iter::repeat_n(interleaved, MAX_ATTEMPTS_PER_ADDRESS)
            .flatten()
            .map(str::to_string)
            .collect();

        let mut state = self.lock();
        state.plan = plan;
        state.attempts = 0;
        info!(
            "DatapathAddressSelector reset with {} addresses.",
            state.plan.len()
        );
    }

    /// Hand out the next address to attempt.
    ///
    /// Fails with [`KryptonError::FailedPrecondition`] when no address
    /// survived the last reset and with [`KryptonError::ResourceExhausted`]
    /// once every planned attempt has been handed out.
    pub fn select_datapath_address(&self) -> KryptonResult<Endpoint> {
        let mut state = self.lock();

        if state.plan.is_empty() {
            return Err(KryptonError::FailedPrecondition(
                "No Egress node socket address found".into(),
            ));
        }
        if state.attempts >= state.plan.len() {
            return Err(KryptonError::ResourceExhausted(
                "Max reattempts have been reached on both IPv4 and IPv6".into(),
            ));
        }

        let index = state.attempts;
        state.attempts += 1;
        let address = &state.plan[index];
        info!(
            "Attempting datapath {} on attempt {}",
            address, state.attempts
        );
        Endpoint::from_host_port(address)
    }

    /// Whether another address can be handed out.
    pub fn has_more_addresses(&self) -> bool {
        let state = self.lock();
        state.attempts < state.plan.len()
    }

    /// Number of attempts left before the plan is exhausted.
    pub fn remaining_attempts(&self) -> usize {
        let state = self.lock();
        state.plan.len() - state.attempts
    }
}

/// Classify an address by the syntax of its host part.
fn classify(address: &str) -> Option<IpProtocol> {
    Endpoint::from_host_port(address)
        .ok()
        .map(|endpoint| endpoint.ip_protocol())
}

/// Alternate `first` and `second`, then append the rest of the longer list.
fn interleave<'a>(first: &[&'a str], second: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    let paired = first.len().min(second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        out.push(*a);
        out.push(*b);
    }
    out.extend_from_slice(&first[paired..]);
    out.extend_from_slice(&second[paired..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::datapath::AddressFamily;

    const ADDRESSES: [&str; 4] = ["1.1.1.1", "2.2.2.2", "::1", "::2"];

    fn selector(ipv6_enabled: bool, protocol: DatapathProtocol) -> DatapathAddressSelector {
        let config = KryptonConfig::builder()
            .ipv6_enabled(ipv6_enabled)
            .datapath_protocol(protocol)
            .build()
            .unwrap();
        DatapathAddressSelector::new(config)
    }

    fn drain(selector: &DatapathAddressSelector) -> Vec<String> {
        let mut out = Vec::new();
        while selector.has_more_addresses() {
            out.push(selector.select_datapath_address().unwrap().host_port().to_string());
        }
        out
    }

    #[test]
    fn test_ipsec_prefers_ipv4() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        selector.reset(&ADDRESSES, None);

        assert_eq!(
            drain(&selector),
            ["1.1.1.1", "::1", "2.2.2.2", "::2", "1.1.1.1", "::1", "2.2.2.2", "::2"]
        );
    }

    #[test]
    fn test_bridge_prefers_ipv6() {
        let selector = selector(true, DatapathProtocol::Bridge);
        selector.reset(&ADDRESSES, None);

        assert_eq!(
            drain(&selector),
            ["::1", "1.1.1.1", "::2", "2.2.2.2", "::1", "1.1.1.1", "::2", "2.2.2.2"]
        );
    }

    #[test]
    fn test_exhaustion() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        selector.reset(&ADDRESSES, None);
        assert_eq!(selector.remaining_attempts(), 8);

        for _ in 0..8 {
            assert!(selector.select_datapath_address().is_ok());
        }
        assert!(!selector.has_more_addresses());

        let err = selector.select_datapath_address().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
        // Stays exhausted.
        assert!(selector.select_datapath_address().unwrap_err().is_exhausted());
    }

    #[test]
    fn test_empty_plan_is_failed_precondition() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        let err = selector.select_datapath_address().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);

        selector.reset(&["not-an-address"], None);
        assert!(!selector.has_more_addresses());
        let err = selector.select_datapath_address().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    }

    #[test]
    fn test_ipv6_disabled_drops_ipv6() {
        let selector = selector(false, DatapathProtocol::Bridge);
        // IPv6 disabled keeps IPv4 even on a v6-only network.
        selector.reset(&ADDRESSES, Some(&NetworkInfo::with_family(AddressFamily::V6)));

        assert_eq!(drain(&selector), ["1.1.1.1", "2.2.2.2", "1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_network_family_filter() {
        let selector = selector(true, DatapathProtocol::Ipsec);

        selector.reset(&ADDRESSES, Some(&NetworkInfo::with_family(AddressFamily::V4)));
        assert_eq!(drain(&selector), ["1.1.1.1", "2.2.2.2", "1.1.1.1", "2.2.2.2"]);

        selector.reset(&ADDRESSES, Some(&NetworkInfo::with_family(AddressFamily::V6)));
        assert_eq!(drain(&selector), ["::1", "::2", "::1", "::2"]);

        selector.reset(&ADDRESSES, Some(&NetworkInfo::with_family(AddressFamily::V4V6)));
        assert_eq!(drain(&selector).len(), 8);
    }

    #[test]
    fn test_uneven_families_append_remainder() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        selector.reset(
            &["1.1.1.1:2153", "[2001:db8::1]:2153", "3.3.3.3:2153", "4.4.4.4:2153"],
            None,
        );

        assert_eq!(
            drain(&selector),
            [
                "1.1.1.1:2153",
                "[2001:db8::1]:2153",
                "3.3.3.3:2153",
                "4.4.4.4:2153",
                "1.1.1.1:2153",
                "[2001:db8::1]:2153",
                "3.3.3.3:2153",
                "4.4.4.4:2153",
            ]
        );
    }

    #[test]
    fn test_malformed_addresses_dropped() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        selector.reset(&["garbage", "1.1.1.1", "1.1.1.1:notaport"], None);
        assert_eq!(drain(&selector), ["1.1.1.1", "1.1.1.1"]);
    }

    #[test]
    fn test_reset_restarts_cursor() {
        let selector = selector(true, DatapathProtocol::Ipsec);
        selector.reset(&["1.1.1.1"], None);
        selector.select_datapath_address().unwrap();
        selector.select_datapath_address().unwrap();
        assert!(!selector.has_more_addresses());

        selector.reset(&["2.2.2.2"], None);
        assert_eq!(selector.remaining_attempts(), 2);
        let endpoint = selector.select_datapath_address().unwrap();
        assert_eq!(endpoint.host_port(), "2.2.2.2");
    }
}
