//! Explicitly owned session context.

use std::sync::Arc;

use tracing::info;

use crate::auth::{
    AuthAndSignRequest, AuthAndSignResponse, HttpResponse, PublicKeyRequest, PublicKeyResponse,
};
use crate::core::{KryptonConfig, KryptonResult, TimerInterface};
use crate::datapath::DatapathAddressSelector;
use crate::timer::TimerManager;

/// One Krypton session: its configuration, timers and datapath selector.
///
/// There is no process-wide instance. Create one per session and hand it
/// (usually behind an [`Arc`]) to whatever drives the session; dropping it
/// discards all pending timers.
#[derive(Debug)]
pub struct Krypton {
    config: KryptonConfig,
    timer_manager: TimerManager,
    address_selector: DatapathAddressSelector,
}

impl Krypton {
    /// Create a context driven by `timer_interface`.
    pub fn new(config: KryptonConfig, timer_interface: Arc<dyn TimerInterface>) -> KryptonResult<Self> {
        config.validate()?;
        info!(
            "Creating Krypton session (ipv6: {}, datapath: {:?})",
            config.ipv6_enabled, config.datapath_protocol
        );

        Ok(Self {
            timer_manager: TimerManager::new(timer_interface),
            address_selector: DatapathAddressSelector::new(config.clone()),
            config,
        })
    }

    /// Create a context whose timers run on the current tokio runtime.
    #[cfg(feature = "runtime")]
    #[cfg_attr(docsrs, doc(cfg(feature = "runtime")))]
    pub fn with_tokio(config: KryptonConfig) -> KryptonResult<Self> {
        let timer = crate::timer::TokioTimer::new()?;
        Self::new(config, Arc::new(timer))
    }

    /// Session configuration.
    pub fn config(&self) -> &KryptonConfig {
        &self.config
    }

    /// Session timers.
    pub fn timer_manager(&self) -> &TimerManager {
        &self.timer_manager
    }

    /// Datapath address selector.
    pub fn address_selector(&self) -> &DatapathAddressSelector {
        &self.address_selector
    }

    /// Auth-and-sign request honoring the configured token placement.
    pub fn auth_and_sign_request(
        &self,
        auth_token: &str,
        service_type: &str,
        selected_session_manager_ip: &str,
    ) -> AuthAndSignRequest {
        AuthAndSignRequest::new(auth_token, service_type, selected_session_manager_ip)
            .attach_oauth_as_header(self.config.attach_oauth_token_as_header)
    }

    /// Public key request carrying the configured API key.
    pub fn public_key_request(&self, request_nonce: bool) -> PublicKeyRequest {
        PublicKeyRequest::new(request_nonce, self.config.api_key.clone())
    }

    /// Decode an auth-and-sign response with the configured suffix enforcement.
    pub fn decode_auth_response(&self, response: &HttpResponse) -> KryptonResult<AuthAndSignResponse> {
        let mut decoded = AuthAndSignResponse::new();
        decoded.decode(response, &self.config, self.config.enforce_copper_suffix)?;
        Ok(decoded)
    }

    /// Decode a public key response.
    pub fn decode_public_key_response(
        &self,
        response: &HttpResponse,
    ) -> KryptonResult<PublicKeyResponse> {
        let mut decoded = PublicKeyResponse::new();
        decoded.decode(response)?;
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, ExpiryCallback, KryptonError, TimerError, TimerId};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Timer primitive that only fires when told to.
    #[derive(Default)]
    struct ManualTimer {
        callback: Mutex<Option<ExpiryCallback>>,
    }

    impl ManualTimer {
        fn fire(&self, id: TimerId) {
            if let Some(callback) = self.callback.lock().unwrap().as_ref() {
                callback(id);
            }
        }
    }

    impl TimerInterface for ManualTimer {
        fn register_callback(&self, callback: ExpiryCallback) {
            *self.callback.lock().unwrap() = Some(callback);
        }

        fn start_timer(&self, _id: TimerId, _duration: Duration) -> Result<(), TimerError> {
            Ok(())
        }

        fn cancel_timer(&self, _id: TimerId) {}
    }

    fn config() -> KryptonConfig {
        KryptonConfig::builder()
            .copper_hostname_suffixes(["example.com"])
            .api_key("key")
            .attach_oauth_token_as_header(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = KryptonConfig {
            copper_hostname_suffix: vec![String::new()],
            ..KryptonConfig::default()
        };
        let err = Krypton::new(config, Arc::new(ManualTimer::default())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_reattempt_on_timer_expiry() {
        let timer = Arc::new(ManualTimer::default());
        let krypton = Arc::new(Krypton::new(config(), timer.clone()).unwrap());
        krypton.address_selector().reset(&["1.1.1.1", "::1"], None);
        let first = krypton.address_selector().select_datapath_address().unwrap();
        assert_eq!(first.host_port(), "1.1.1.1");

        let selected = Arc::new(Mutex::new(None));
        let (weak, s) = (Arc::downgrade(&krypton), selected.clone());
        let id = krypton
            .timer_manager()
            .start_timer(
                Duration::from_millis(500),
                move || {
                    if let Some(k) = weak.upgrade() {
                        let next = k.address_selector().select_datapath_address();
                        *s.lock().unwrap() = Some(next);
                    }
                },
                "datapath reattempt",
            )
            .unwrap();

        timer.fire(id);
        let next = selected.lock().unwrap().take().unwrap().unwrap();
        assert_eq!(next.host_port(), "::1");
        assert_eq!(krypton.timer_manager().num_active_timers(), 0);
    }

    #[test]
    fn test_pending_timer_does_not_keep_session_alive() {
        let timer = Arc::new(ManualTimer::default());
        let krypton = Arc::new(Krypton::new(config(), timer.clone()).unwrap());

        let weak = Arc::downgrade(&krypton);
        let id = krypton
            .timer_manager()
            .start_timer(
                Duration::from_secs(1),
                move || {
                    if let Some(k) = weak.upgrade() {
                        let _ = k.address_selector().select_datapath_address();
                    }
                },
                "datapath reattempt",
            )
            .unwrap();

        let weak = Arc::downgrade(&krypton);
        drop(krypton);
        assert!(weak.upgrade().is_none());
        // Expiry after the session is gone is dropped.
        timer.fire(id);
    }

    #[test]
    fn test_requests_follow_config() {
        let krypton = Krypton::new(config(), Arc::new(ManualTimer::default())).unwrap();

        let request = krypton.auth_and_sign_request("abc", "123", "aaaa").encode();
        assert_eq!(request.header("Authorization"), Some("Bearer abc"));

        let request = krypton.public_key_request(false).encode();
        assert_eq!(request.header("X-Goog-Api-Key"), Some("key"));
    }

    #[test]
    fn test_decode_auth_response_enforces_suffix() {
        let krypton = Krypton::new(config(), Arc::new(ManualTimer::default())).unwrap();

        let ok = krypton
            .decode_auth_response(&HttpResponse::json(
                r#"{"copper_controller_hostname": "a.example.com"}"#,
            ))
            .unwrap();
        assert_eq!(ok.copper_controller_hostname(), Some("a.example.com"));

        let err = krypton
            .decode_auth_response(&HttpResponse::json(
                r#"{"copper_controller_hostname": "a.other.com"}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, KryptonError::InvalidArgument(_)));

        let key = krypton
            .decode_public_key_response(&HttpResponse::json(r#"{"pem": "k"}"#))
            .unwrap();
        assert_eq!(key.pem(), "k");
    }

    #[cfg(feature = "runtime")]
    #[tokio::test]
    async fn test_tokio_timer_drives_reattempt() {
        let krypton = Arc::new(Krypton::with_tokio(config()).unwrap());
        krypton.address_selector().reset(&["1.1.1.1", "::1"], None);
        krypton.address_selector().select_datapath_address().unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel();
        let weak = Arc::downgrade(&krypton);
        krypton
            .timer_manager()
            .start_timer(
                Duration::from_millis(10),
                move || {
                    if let Some(k) = weak.upgrade() {
                        let _ = tx.send(k.address_selector().select_datapath_address());
                    }
                },
                "datapath reattempt",
            )
            .unwrap();

        let next = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(next.host_port(), "::1");
    }
}
