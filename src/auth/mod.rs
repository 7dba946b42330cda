//! Krypton - Auth handshake codec
//!
//! Builds the auth-and-sign, public key and initial-data requests and
//! validates their responses before any field reaches the session layer.
//!
//! ```text
//! AuthAndSignRequest ──encode──▶ HttpRequest ──▶ platform fetcher
//!                                                    │
//! AuthAndSignResponse ◀──decode── HttpResponse ◀─────┘
//!   (proto body wins, else JSON; copper hostname checked against allowlist)
//! ```

mod http;
mod public_metadata;
mod request;
mod response;

pub use http::{HttpRequest, HttpResponse, HttpStatus, RequestBody, ResponseBody};
pub use public_metadata::{BinaryPublicMetadata, BINARY_PUBLIC_METADATA_VERSION};
pub use request::{AuthAndSignRequest, InitialDataRequest, PublicKeyRequest};
pub use response::{
    decode_initial_data_response, ApnType, AuthAndSignResponse, InitialDataResponse,
    PublicKeyResponse,
};
