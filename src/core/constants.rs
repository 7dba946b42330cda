//! Constants shared by the Krypton session core.
//!
//! Wire keys and closed-set values are fixed by the backend protocol and
//! MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// TIMERS
// =============================================================================

/// Step between consecutively issued timer ids.
pub const TIMER_ID_INCREMENT: u64 = 1;

/// Maximum number of latency samples kept per latency type.
pub const LATENCY_COLLECTION_LIMIT: usize = 5;

// =============================================================================
// DATAPATH ADDRESS SELECTION
// =============================================================================

/// How many times each interleaved address is attempted before giving up.
pub const MAX_ATTEMPTS_PER_ADDRESS: usize = 2;

// =============================================================================
// APN TYPES
// =============================================================================

/// APN type instructing the client to use the IPsec (PPN) datapath.
pub const APN_TYPE_PPN: &str = "ppn";

/// APN type instructing the client to use the bridge datapath.
pub const APN_TYPE_BRIDGE: &str = "bridge";

/// Default accepted copper controller hostname suffix.
pub const DEFAULT_COPPER_HOSTNAME_SUFFIX: &str = "g-tun.com";

// =============================================================================
// JSON KEYS
// =============================================================================

/// JSON key names used in handshake request and response bodies.
pub mod json_keys {
    /// OAuth token carried in the auth-and-sign request.
    pub const AUTH_TOKEN: &str = "oauth_token";
    /// Service type of the auth-and-sign request.
    pub const SERVICE_TYPE: &str = "service_type";
    /// Blinded tokens (array) of the auth-and-sign request.
    pub const BLINDED_TOKENS: &str = "blinded_token";
    /// Hash of the public key the tokens were blinded with.
    pub const PUBLIC_KEY_HASH: &str = "public_key_hash";
    /// Public key request flag.
    pub const GET_PUBLIC_KEY: &str = "get_public_key";
    /// Ask the server to attach an attestation nonce to the public key.
    pub const REQUEST_NONCE: &str = "request_nonce";

    /// Unsupported JWT authentication mode.
    pub const JWT: &str = "jwt";
    /// Blinded token signatures (array of strings).
    pub const BLINDED_TOKEN_SIGNATURE: &str = "blinded_token_signature";
    /// Region token and signature.
    pub const REGION_TOKEN_AND_SIGNATURE: &str = "region_token_and_signature";
    /// APN type.
    pub const APN_TYPE: &str = "apn_type";
    /// Copper (relay) controller hostname.
    pub const COPPER_CONTROLLER_HOSTNAME: &str = "copper_controller_hostname";
    /// PEM encoded public key.
    pub const PEM: &str = "pem";
    /// Attestation nonce returned with the public key.
    pub const ATTESTATION_NONCE: &str = "attestation_nonce";
}

// =============================================================================
// HTTP HEADERS
// =============================================================================

/// Authorization header name.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// API key header name.
pub const API_KEY_HEADER: &str = "X-Goog-Api-Key";

// =============================================================================
// PROTOBUF WELL-KNOWN TYPE LIMITS
// =============================================================================

/// Largest magnitude of `google.protobuf.Duration.seconds` (about 10,000 years).
pub const MAX_PROTO_DURATION_SECONDS: i64 = 315_576_000_000;

/// Largest magnitude of `google.protobuf.Duration.nanos`.
pub const MAX_PROTO_NANOS: i32 = 999_999_999;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Rounding granularity of public metadata expiration timestamps.
pub const EXPIRATION_INCREMENT: Duration = Duration::from_secs(15 * 60);
