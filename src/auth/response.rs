//! Inbound handshake responses.
//!
//! Every response object is decoded once. On failure none of the decoded
//! fields are applied and the cached status carries the error.

use serde_json::{Map, Value};
use tracing::{debug, error};

use super::http::{HttpResponse, ResponseBody};
use crate::core::constants::{json_keys, APN_TYPE_BRIDGE, APN_TYPE_PPN};
use crate::core::{KryptonConfig, KryptonError, KryptonResult};
use crate::proto::{self, GetInitialDataResponse, Message};

/// Decoded `GetInitialDataResponse`.
pub type InitialDataResponse = GetInitialDataResponse;

/// Access point type assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ApnType {
    /// Not specified by the server.
    #[default]
    Unspecified,
    /// IPsec datapath.
    Ppn,
    /// Bridge datapath.
    Bridge,
}

impl ApnType {
    /// Parse a wire value. Only `""`, `"ppn"` and `"bridge"` are accepted.
    pub fn parse(value: &str) -> KryptonResult<Self> {
        match value {
            "" => Ok(Self::Unspecified),
            APN_TYPE_PPN => Ok(Self::Ppn),
            APN_TYPE_BRIDGE => Ok(Self::Bridge),
            other => Err(KryptonError::invalid_argument(format!(
                "unexpected apn_type: {other}"
            ))),
        }
    }

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Ppn => APN_TYPE_PPN,
            Self::Bridge => APN_TYPE_BRIDGE,
        }
    }
}

fn not_decoded() -> KryptonError {
    KryptonError::FailedPrecondition("response has not been decoded".into())
}

fn already_decoded() -> KryptonError {
    KryptonError::FailedPrecondition("response has already been decoded".into())
}

/// Parse the JSON body of `response` into an object.
fn json_object(response: &HttpResponse) -> KryptonResult<Map<String, Value>> {
    let text = match &response.body {
        ResponseBody::Json(text) if !text.is_empty() => text,
        _ => return Err(KryptonError::invalid_argument("missing json body")),
    };
    let value: Value = serde_json::from_str(text)
        .map_err(|e| KryptonError::invalid_argument(format!("error parsing json body: {e}")))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(KryptonError::invalid_argument(
            "JSON body is not of type JSON object",
        )),
    }
}

/// Read an optional string-valued key. Present with another type is an error.
fn optional_string<'a>(object: &'a Map<String, Value>, key: &str) -> KryptonResult<Option<&'a str>> {
    match object.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(KryptonError::invalid_argument(format!(
            "{key} is not a string"
        ))),
    }
}

/// Response to an [`AuthAndSignRequest`](super::AuthAndSignRequest).
#[derive(Debug, Clone, Default)]
pub struct AuthAndSignResponse {
    blinded_token_signatures: Vec<String>,
    region_token_and_signatures: Option<String>,
    apn_type: ApnType,
    copper_controller_hostname: Option<String>,
    parsing_status: Option<KryptonResult<()>>,
}

impl AuthAndSignResponse {
    /// Create an undecoded response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `response`.
    ///
    /// A protobuf body takes precedence; otherwise the JSON body is used.
    /// With `enforce_copper_suffix` set, a non-empty copper hostname must end
    /// with one of the configured suffixes. May only be called once.
    pub fn decode(
        &mut self,
        response: &HttpResponse,
        config: &KryptonConfig,
        enforce_copper_suffix: bool,
    ) -> KryptonResult<()> {
        if self.parsing_status.is_some() {
            return Err(already_decoded());
        }

        let decoded = match &response.body {
            ResponseBody::Proto(bytes) => {
                Self::decode_proto_body(bytes, config, enforce_copper_suffix)
            }
            _ => json_object(response)
                .and_then(|object| Self::decode_json_body(&object, config, enforce_copper_suffix)),
        };

        let status = match decoded {
            Ok(fields) => {
                *self = fields;
                debug!(
                    "Decoded auth response with {} signatures",
                    self.blinded_token_signatures.len()
                );
                Ok(())
            }
            Err(e) => {
                error!("Unable to decode auth response: {}", e);
                Err(e)
            }
        };
        self.parsing_status = Some(status.clone());
        status
    }

    fn decode_proto_body(
        bytes: &[u8],
        config: &KryptonConfig,
        enforce_copper_suffix: bool,
    ) -> KryptonResult<Self> {
        let message = proto::AuthAndSignResponse::decode(bytes)?;

        let mut out = Self {
            blinded_token_signatures: message.blinded_token_signature,
            region_token_and_signatures: Some(message.region_token_and_signature)
                .filter(|s| !s.is_empty()),
            apn_type: ApnType::parse(&message.apn_type)?,
            ..Self::default()
        };
        out.set_copper_hostname(&message.copper_controller_hostname, config, enforce_copper_suffix)?;
        Ok(out)
    }

    fn decode_json_body(
        object: &Map<String, Value>,
        config: &KryptonConfig,
        enforce_copper_suffix: bool,
    ) -> KryptonResult<Self> {
        if object.contains_key(json_keys::JWT) {
            return Err(KryptonError::invalid_argument(
                "jwt response is not supported",
            ));
        }

        let mut out = Self::default();

        if let Some(signatures) = object.get(json_keys::BLINDED_TOKEN_SIGNATURE) {
            let Value::Array(signatures) = signatures else {
                return Err(KryptonError::invalid_argument(
                    "blinded_token_signature is not an array",
                ));
            };
            for signature in signatures {
                let Value::String(signature) = signature else {
                    return Err(KryptonError::invalid_argument(
                        "blinded_token_signature value is not a string",
                    ));
                };
                out.blinded_token_signatures.push(signature.clone());
            }
        }

        out.region_token_and_signatures =
            optional_string(object, json_keys::REGION_TOKEN_AND_SIGNATURE)?.map(str::to_string);

        if let Some(apn_type) = optional_string(object, json_keys::APN_TYPE)? {
            out.apn_type = ApnType::parse(apn_type)?;
        }

        if let Some(hostname) = optional_string(object, json_keys::COPPER_CONTROLLER_HOSTNAME)? {
            out.set_copper_hostname(hostname, config, enforce_copper_suffix)?;
        }

        Ok(out)
    }

    /// Validate and store the copper controller hostname.
    ///
    /// An empty hostname means no override and is always accepted.
    pub fn set_copper_hostname(
        &mut self,
        hostname: &str,
        config: &KryptonConfig,
        enforce_copper_suffix: bool,
    ) -> KryptonResult<()> {
        if hostname.is_empty() {
            return Ok(());
        }
        // The config rejects empty suffixes, so none of these match everything.
        if enforce_copper_suffix
            && !config
                .copper_hostname_suffix
                .iter()
                .any(|suffix| hostname.ends_with(suffix.as_str()))
        {
            return Err(KryptonError::invalid_argument(format!(
                "copper_controller_hostname doesn't have allowed suffix: {hostname}"
            )));
        }
        self.copper_controller_hostname = Some(hostname.to_string());
        Ok(())
    }

    /// Result of the last [`decode`](Self::decode).
    pub fn parsing_status(&self) -> KryptonResult<()> {
        self.parsing_status.clone().unwrap_or_else(|| Err(not_decoded()))
    }

    /// Signatures over the blinded tokens, in server order.
    pub fn blinded_token_signatures(&self) -> &[String] {
        &self.blinded_token_signatures
    }

    /// Region token and signature.
    pub fn region_token_and_signatures(&self) -> Option<&str> {
        self.region_token_and_signatures.as_deref()
    }

    /// Assigned access point type.
    pub fn apn_type(&self) -> ApnType {
        self.apn_type
    }

    /// Validated copper controller hostname.
    pub fn copper_controller_hostname(&self) -> Option<&str> {
        self.copper_controller_hostname.as_deref()
    }
}

/// Response to a [`PublicKeyRequest`](super::PublicKeyRequest).
#[derive(Debug, Clone, Default)]
pub struct PublicKeyResponse {
    pem: String,
    nonce: Option<String>,
    parsing_status: Option<KryptonResult<()>>,
}

impl PublicKeyResponse {
    /// Create an undecoded response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the JSON body of `response`. May only be called once.
    pub fn decode(&mut self, response: &HttpResponse) -> KryptonResult<()> {
        if self.parsing_status.is_some() {
            return Err(already_decoded());
        }

        let status = json_object(response)
            .and_then(|object| Self::decode_json_body(&object))
            .map(|(pem, nonce)| {
                self.pem = pem;
                self.nonce = nonce;
            });
        if let Err(e) = &status {
            error!("Unable to decode public key response: {}", e);
        }
        self.parsing_status = Some(status.clone());
        status
    }

    fn decode_json_body(object: &Map<String, Value>) -> KryptonResult<(String, Option<String>)> {
        let pem = optional_string(object, json_keys::PEM)?
            .ok_or_else(|| KryptonError::invalid_argument("missing pem"))?;
        let nonce = optional_string(object, json_keys::ATTESTATION_NONCE)?;
        Ok((pem.to_string(), nonce.map(str::to_string)))
    }

    /// Result of the last [`decode`](Self::decode).
    pub fn parsing_status(&self) -> KryptonResult<()> {
        self.parsing_status.clone().unwrap_or_else(|| Err(not_decoded()))
    }

    /// PEM encoded public key.
    pub fn pem(&self) -> &str {
        &self.pem
    }

    /// Attestation nonce, when one was requested.
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }
}

/// Decode the protobuf body of an initial-data response.
///
/// A JSON body is an error even when protobuf bytes would be acceptable.
pub fn decode_initial_data_response(response: &HttpResponse) -> KryptonResult<InitialDataResponse> {
    match &response.body {
        ResponseBody::Json(_) => Err(KryptonError::invalid_argument(
            "unable to process json body of initial data response",
        )),
        ResponseBody::Empty => Err(KryptonError::invalid_argument(
            "initial data response is missing proto body",
        )),
        ResponseBody::Proto(bytes) => {
            GetInitialDataResponse::decode(bytes.as_slice()).map_err(|e| {
                error!("Error parsing initial data proto body: {}", e);
                KryptonError::from(e)
            })
        }
    }
}
