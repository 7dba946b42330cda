//! Handshake messages exchanged with the auth and initial-data endpoints.

use prost_types::Timestamp;

/// Body of a successful auth-and-sign exchange.
#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthAndSignResponse {
    /// Signatures over the blinded tokens, in request order.
    #[prost(string, repeated, tag = "4")]
    pub blinded_token_signature: Vec<String>,
    /// Relay controller the client should connect to. Empty for the default.
    #[prost(string, tag = "5")]
    pub copper_controller_hostname: String,
    /// Region token and its signature.
    #[prost(string, tag = "6")]
    pub region_token_and_signature: String,
    /// Access point type.
    #[prost(string, tag = "7")]
    pub apn_type: String,
}

/// Granularity of the exit location in the public metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LocationGranularity {
    /// Not specified.
    Unknown = 0,
    /// Country only.
    Country = 1,
    /// Country and city.
    CityGeos = 2,
}

/// Request for the blind-signing key and public metadata.
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInitialDataRequest {
    /// Whether the client will attest.
    #[prost(bool, tag = "1")]
    pub use_attestation: bool,
    /// Service the tokens are for.
    #[prost(string, tag = "2")]
    pub service_type: String,
    /// Requested exit location granularity.
    #[prost(enumeration = "LocationGranularity", tag = "3")]
    pub location_granularity: i32,
    /// Public metadata validation version.
    #[prost(int64, tag = "4")]
    pub validation_version: i64,
}

/// RSA public key used for blind signing.
#[derive(Clone, PartialEq, prost::Message)]
pub struct RsaBlindSignaturePublicKey {
    /// Use case the key is bound to.
    #[prost(string, tag = "1")]
    pub use_case: String,
    /// Key version.
    #[prost(int32, tag = "2")]
    pub key_version: i32,
    /// DER or PEM encoded key.
    #[prost(bytes = "vec", tag = "3")]
    pub serialized_public_key: Vec<u8>,
    /// When the key stops being valid.
    #[prost(message, optional, tag = "4")]
    pub expiration_time: Option<Timestamp>,
    /// When the key starts being valid.
    #[prost(message, optional, tag = "5")]
    pub key_validity_start_time: Option<Timestamp>,
    /// Modulus size in bits.
    #[prost(int64, tag = "9")]
    pub key_size: i64,
}

/// Where traffic exits.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Location {
    /// Two-letter country code.
    #[prost(string, tag = "1")]
    pub country: String,
    /// City geo identifier.
    #[prost(string, tag = "2")]
    pub city_geo_id: String,
}

/// Debug mode carried in the public metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum DebugMode {
    /// No debugging.
    Unspecified = 0,
    /// Debug everything.
    DebugAll = 1,
}

/// Metadata bound to every signed token.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PublicMetadata {
    /// Exit location.
    #[prost(message, optional, tag = "1")]
    pub exit_location: Option<Location>,
    /// Service the token is for.
    #[prost(string, tag = "2")]
    pub service_type: String,
    /// Token expiration, rounded.
    #[prost(message, optional, tag = "3")]
    pub expiration: Option<Timestamp>,
    /// Debug mode.
    #[prost(enumeration = "DebugMode", tag = "4")]
    pub debug_mode: i32,
}

/// Public metadata plus the version it validates against.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PublicMetadataInfo {
    /// The metadata.
    #[prost(message, optional, tag = "1")]
    pub public_metadata: Option<PublicMetadata>,
    /// Validation version.
    #[prost(int32, tag = "2")]
    pub validation_version: i32,
}

/// Data the client needs before attesting.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PrepareAttestationData {
    /// Nonce to bind into the attestation.
    #[prost(bytes = "vec", tag = "2")]
    pub attestation_nonce: Vec<u8>,
}

/// Answer to [`GetInitialDataRequest`].
#[derive(Clone, PartialEq, prost::Message)]
pub struct GetInitialDataResponse {
    /// Key the tokens will be signed with.
    #[prost(message, optional, tag = "1")]
    pub at_public_metadata_public_key: Option<RsaBlindSignaturePublicKey>,
    /// Metadata to bind into the tokens.
    #[prost(message, optional, tag = "2")]
    pub public_metadata_info: Option<PublicMetadataInfo>,
    /// Attestation parameters.
    #[prost(message, optional, tag = "3")]
    pub attestation: Option<PrepareAttestationData>,
}
