//! Krypton - Protobuf messages
//!
//! The handshake messages, declared with `prost` derives. Decoders skip
//! unknown fields and groups.

pub mod messages;

pub use messages::{
    AuthAndSignResponse, DebugMode, GetInitialDataRequest, GetInitialDataResponse, Location,
    LocationGranularity, PrepareAttestationData, PublicMetadata, PublicMetadataInfo,
    RsaBlindSignaturePublicKey,
};
pub use prost::{DecodeError, Message};
pub use prost_types::{Duration as ProtoDuration, Timestamp as ProtoTimestamp};

use crate::core::KryptonError;

impl From<DecodeError> for KryptonError {
    fn from(err: DecodeError) -> Self {
        KryptonError::InvalidArgument(format!("malformed proto: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;

    #[test]
    fn test_decode_error_is_invalid_argument() {
        let err: KryptonError = AuthAndSignResponse::decode([0x22, 0x05, b'a'].as_slice())
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("malformed proto"), "{err}");
    }
}
