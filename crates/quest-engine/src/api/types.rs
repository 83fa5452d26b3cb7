use serde::{Deserialize, Serialize};

/// Identifier for an HTTP request handed to the host.
/// The host echoes it back with the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u32);

/// Identifies a scheduled wake-up on the timeline.
/// The numeric value is page-defined; the engine never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct WakeKind(pub u32);

