//! Error types for quest-engine

use crate::api::types::RequestId;
use thiserror::Error;

/// Engine error type
#[derive(Error, Debug)]
pub enum Error {
    /// Reply body was not the JSON envelope we expected.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Server answered with a non-success HTTP status.
    #[error("http status {status}")]
    Http { status: u16 },

    /// The request never produced a reply (network down, CORS, abort).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The `data-game_infos` attribute of a level box could not be read.
    #[error("malformed game info: {0}")]
    MalformedGameInfo(String),

    /// A required field was empty; nothing was sent.
    #[error("field `{0}` is empty")]
    EmptyField(&'static str),

    /// A reply arrived for a request that is not outstanding.
    #[error("no outstanding request {0:?}")]
    UnknownRequest(RequestId),

    /// The page manifest handed over by the host could not be parsed.
    #[error("invalid page manifest: {0}")]
    Manifest(serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
