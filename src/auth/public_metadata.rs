//! Flattened public metadata bound into blind-signed tokens.

use crate::proto::{DebugMode, PublicMetadata};

/// Current layout version of [`BinaryPublicMetadata`]. Bump on any field change.
pub const BINARY_PUBLIC_METADATA_VERSION: u32 = 1;

/// Public metadata in the form the token signer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinaryPublicMetadata {
    /// Layout version.
    pub version: u32,
    /// Service type.
    pub service_type: Option<String>,
    /// Two-letter country code (RFC 8805 section 2.1.1.2).
    pub country: Option<String>,
    /// Region, e.g. `US-CA` (RFC 8805 section 2.1.1.3).
    pub region: Option<String>,
    /// City name (RFC 8805 section 2.1.1.4).
    pub city: Option<String>,
    /// Expiration in seconds since the epoch, rounded to 15 minutes.
    pub expiration_epoch_seconds: Option<u64>,
    /// 0 is unspecified, 1 is debug-all.
    pub debug_mode: u32,
}

impl BinaryPublicMetadata {
    /// Flatten the protobuf form.
    pub fn from_public_metadata(metadata: &PublicMetadata) -> Self {
        let mut out = Self {
            version: BINARY_PUBLIC_METADATA_VERSION,
            ..Self::default()
        };

        if !metadata.service_type.is_empty() {
            out.service_type = Some(metadata.service_type.clone());
        }

        if let Some(location) = &metadata.exit_location {
            if location.country.chars().count() == 2 {
                out.country = Some(location.country.clone());
            }
            if !location.city_geo_id.is_empty() {
                out.region = Some(location.city_geo_id.clone());
            }
        }

        // Pre-epoch expirations cannot be represented and are dropped.
        out.expiration_epoch_seconds = metadata
            .expiration
            .as_ref()
            .and_then(|ts| u64::try_from(ts.seconds).ok());

        if metadata.debug_mode() == DebugMode::DebugAll {
            out.debug_mode = 1;
        }
        out
    }
}

impl From<&PublicMetadata> for BinaryPublicMetadata {
    fn from(metadata: &PublicMetadata) -> Self {
        Self::from_public_metadata(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{Location, ProtoTimestamp};

    fn timestamp(seconds: i64) -> ProtoTimestamp {
        ProtoTimestamp { seconds, nanos: 0 }
    }

    #[test]
    fn test_full_metadata() {
        let metadata = PublicMetadata {
            exit_location: Some(Location {
                country: "US".into(),
                city_geo_id: "us_ca_san_diego".into(),
            }),
            service_type: "chromeipblinding".into(),
            expiration: Some(timestamp(1_675_232_100)),
            debug_mode: DebugMode::DebugAll as i32,
        };

        let binary = BinaryPublicMetadata::from_public_metadata(&metadata);
        assert_eq!(
            binary,
            BinaryPublicMetadata {
                version: 1,
                service_type: Some("chromeipblinding".into()),
                country: Some("US".into()),
                region: Some("us_ca_san_diego".into()),
                city: None,
                expiration_epoch_seconds: Some(1_675_232_100),
                debug_mode: 1,
            }
        );
    }

    #[test]
    fn test_empty_metadata() {
        let binary = BinaryPublicMetadata::from(&PublicMetadata::default());
        assert_eq!(binary.version, 1);
        assert_eq!(binary.service_type, None);
        assert_eq!(binary.country, None);
        assert_eq!(binary.region, None);
        assert_eq!(binary.expiration_epoch_seconds, None);
        assert_eq!(binary.debug_mode, 0);
    }

    #[test]
    fn test_country_must_be_two_letters() {
        for country in ["USA", "U", ""] {
            let metadata = PublicMetadata {
                exit_location: Some(Location {
                    country: country.into(),
                    city_geo_id: String::new(),
                }),
                ..Default::default()
            };
            let binary = BinaryPublicMetadata::from_public_metadata(&metadata);
            assert_eq!(binary.country, None);
            assert_eq!(binary.region, None);
        }
    }

    #[test]
    fn test_pre_epoch_expiration_dropped() {
        let metadata = PublicMetadata {
            expiration: Some(timestamp(-1)),
            ..Default::default()
        };
        assert_eq!(
            BinaryPublicMetadata::from_public_metadata(&metadata).expiration_epoch_seconds,
            None
        );
    }
}
