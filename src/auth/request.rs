//! Outbound handshake requests.

use serde_json::{Map, Value};

use super::http::{HttpRequest, RequestBody};
use crate::core::constants::{json_keys, API_KEY_HEADER, AUTHORIZATION_HEADER};
use crate::proto::{GetInitialDataRequest, LocationGranularity, Message};

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Request that authenticates the user and asks for blinded tokens to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAndSignRequest {
    auth_token: String,
    service_type: String,
    selected_session_manager_ip: String,
    blinded_token: Option<String>,
    public_key_hash: Option<String>,
    attach_oauth_as_header: bool,
}

impl AuthAndSignRequest {
    /// Create a request with no blinded token.
    pub fn new(
        auth_token: impl Into<String>,
        service_type: impl Into<String>,
        selected_session_manager_ip: impl Into<String>,
    ) -> Self {
        Self {
            auth_token: auth_token.into(),
            service_type: service_type.into(),
            selected_session_manager_ip: selected_session_manager_ip.into(),
            blinded_token: None,
            public_key_hash: None,
            attach_oauth_as_header: false,
        }
    }

    /// Attach a blinded token to be signed.
    pub fn with_blinded_token(mut self, blinded_token: impl Into<String>) -> Self {
        self.blinded_token = Some(blinded_token.into());
        self
    }

    /// Attach the hash of the key the token was blinded with.
    pub fn with_public_key_hash(mut self, public_key_hash: impl Into<String>) -> Self {
        self.public_key_hash = Some(public_key_hash.into());
        self
    }

    /// Send the OAuth token as a bearer header instead of in the body.
    pub fn attach_oauth_as_header(mut self, enabled: bool) -> Self {
        self.attach_oauth_as_header = enabled;
        self
    }

    /// Session manager address the request is routed to.
    pub fn selected_session_manager_ip(&self) -> &str {
        &self.selected_session_manager_ip
    }

    /// Build the JSON body.
    pub fn build_body_json(&self) -> Value {
        let mut body = Map::new();
        if !self.attach_oauth_as_header {
            body.insert(json_keys::AUTH_TOKEN.into(), Value::from(self.auth_token.as_str()));
        }
        body.insert(
            json_keys::SERVICE_TYPE.into(),
            Value::from(self.service_type.as_str()),
        );
        // The wire format allows several blinded tokens; only one is ever sent.
        if let Some(token) = &self.blinded_token {
            body.insert(
                json_keys::BLINDED_TOKENS.into(),
                Value::Array(vec![Value::from(token.as_str())]),
            );
        }
        if let Some(hash) = &self.public_key_hash {
            body.insert(json_keys::PUBLIC_KEY_HASH.into(), Value::from(hash.as_str()));
        }
        Value::Object(body)
    }

    /// Encode into an HTTP request.
    pub fn encode(&self) -> HttpRequest {
        let mut request = HttpRequest {
            body: RequestBody::Json(self.build_body_json().to_string()),
            ..HttpRequest::default()
        };
        if self.attach_oauth_as_header {
            request
                .headers
                .insert(AUTHORIZATION_HEADER.into(), bearer(&self.auth_token));
        }
        request
    }
}

/// Request for the server's blind-signing public key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublicKeyRequest {
    request_nonce: bool,
    api_key: Option<String>,
}

impl PublicKeyRequest {
    /// Create a request, optionally asking for an attestation nonce.
    pub fn new(request_nonce: bool, api_key: Option<String>) -> Self {
        Self {
            request_nonce,
            api_key,
        }
    }

    /// Build the JSON body.
    pub fn build_body_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(json_keys::GET_PUBLIC_KEY.into(), Value::Bool(true));
        if self.request_nonce {
            body.insert(json_keys::REQUEST_NONCE.into(), Value::Bool(true));
        }
        Value::Object(body)
    }

    /// Encode into an HTTP request.
    pub fn encode(&self) -> HttpRequest {
        let mut request = HttpRequest {
            body: RequestBody::Json(self.build_body_json().to_string()),
            ..HttpRequest::default()
        };
        if let Some(key) = &self.api_key {
            request.headers.insert(API_KEY_HEADER.into(), key.clone());
        }
        request
    }
}

/// Request for the signing key and public metadata, sent as protobuf.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialDataRequest {
    message: GetInitialDataRequest,
    auth_token: String,
}

impl InitialDataRequest {
    /// Create a request.
    pub fn new(
        use_attestation: bool,
        service_type: impl Into<String>,
        location_granularity: LocationGranularity,
        validation_version: i64,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            message: GetInitialDataRequest {
                use_attestation,
                service_type: service_type.into(),
                location_granularity: location_granularity.into(),
                validation_version,
            },
            auth_token: auth_token.into(),
        }
    }

    /// The protobuf message that forms the body.
    pub fn message(&self) -> &GetInitialDataRequest {
        &self.message
    }

    /// Encode into an HTTP request.
    pub fn encode(&self) -> HttpRequest {
        let mut request = HttpRequest {
            body: RequestBody::Proto(self.message.encode_to_vec()),
            ..HttpRequest::default()
        };
        request
            .headers
            .insert(AUTHORIZATION_HEADER.into(), bearer(&self.auth_token));
        request
    }
}
