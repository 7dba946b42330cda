//! HTTP envelopes handed to and received from the platform's HTTP fetcher.

use std::collections::BTreeMap;

/// Outbound request body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Serialized JSON text.
    Json(String),
    /// Encoded protobuf message.
    Proto(Vec<u8>),
}

/// Outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpRequest {
    /// Target URL. Filled in by the caller that knows the endpoint.
    pub url: String,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Look up a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// JSON body text, if the body is JSON.
    pub fn json_body(&self) -> Option<&str> {
        match &self.body {
            RequestBody::Json(text) => Some(text),
            _ => None,
        }
    }

    /// Protobuf body bytes, if the body is protobuf.
    pub fn proto_body(&self) -> Option<&[u8]> {
        match &self.body {
            RequestBody::Proto(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Status line of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    /// Status code.
    pub code: u16,
    /// Reason phrase.
    pub message: String,
}

impl Default for HttpStatus {
    fn default() -> Self {
        Self {
            code: 200,
            message: "OK".to_string(),
        }
    }
}

/// Inbound response body. Exactly one encoding is ever present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseBody {
    /// No body.
    #[default]
    Empty,
    /// Encoded protobuf message.
    Proto(Vec<u8>),
    /// JSON text.
    Json(String),
}

/// Inbound HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    /// Status line.
    pub status: HttpStatus,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body.
    pub body: ResponseBody,
}

impl HttpResponse {
    /// A 200 response carrying JSON text.
    pub fn json(text: impl Into<String>) -> Self {
        Self {
            body: ResponseBody::Json(text.into()),
            ..Self::default()
        }
    }

    /// A 200 response carrying protobuf bytes.
    pub fn proto(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            body: ResponseBody::Proto(bytes.into()),
            ..Self::default()
        }
    }

    /// Whether the body is protobuf.
    pub fn has_proto_body(&self) -> bool {
        matches!(self.body, ResponseBody::Proto(_))
    }

    /// Whether the body is JSON.
    pub fn has_json_body(&self) -> bool {
        matches!(self.body, ResponseBody::Json(_))
    }

    /// Protobuf body bytes, if any.
    pub fn proto_body(&self) -> Option<&[u8]> {
        match &self.body {
            ResponseBody::Proto(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// JSON body text, if any.
    pub fn json_body(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Json(text) => Some(text),
            _ => None,
        }
    }
}
