use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two media legs a message or negotiation belongs to.
///
/// `Outbound` carries the device microphone up to the mixer, `Inbound`
/// carries the mixed room audio back down. Every answer and ICE message
/// on the wire is scoped to exactly one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamDirection {
    Outbound,
    Inbound,
}

impl fmt::Display for StreamDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamDirection::Outbound => write!(f, "outbound"),
            StreamDirection::Inbound => write!(f, "inbound"),
        }
    }
}

/// A trickled ICE candidate, forwarded verbatim between the peer
/// connection and the wire.
///
/// The wire calls the candidate string `sdp`; `sdpMid` and
/// `sdpMLineIndex` keep their names in both relay directions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    #[serde(rename = "sdp")]
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}
