use crate::model::ice::{IceCandidate, StreamDirection};
use crate::model::user::{Participant, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not valid JSON, carries an unknown kind tag, or lacks
    /// a required field for its kind. Such frames are dropped, never fatal.
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A decoded inbound signaling message.
///
/// The wire shape is `{"id": "<KIND>", "data": {...}}` with a closed set
/// of kinds. Decoding anything outside the set fails with
/// [`CodecError::Malformed`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "id", content = "data")]
pub enum Envelope {
    #[serde(rename = "WEBRTC_ROOM_USERS")]
    RoomUsers { users: Vec<Participant> },
    #[serde(rename = "WEBRTC_ROOM_USER_ADDED")]
    UserAdded { user: Participant },
    #[serde(rename = "WEBRTC_ROOM_USER_LEFT")]
    UserLeft { user: Participant },
    #[serde(rename = "WEBRTC_USER_ANSWER")]
    OutboundAnswer { sdp: String },
    #[serde(rename = "WEBRTC_MIXER_ANSWER")]
    InboundAnswer { sdp: String },
    #[serde(rename = "WEBRTC_USER_ICE_CANDIDATE")]
    OutboundCandidate(IceCandidate),
    #[serde(rename = "WEBRTC_MIXER_ICE_CANDIDATE")]
    InboundCandidate(IceCandidate),
}

impl Envelope {
    pub fn decode(frame: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(frame)?)
    }

    /// The wire tag, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::RoomUsers { .. } => "WEBRTC_ROOM_USERS",
            Envelope::UserAdded { .. } => "WEBRTC_ROOM_USER_ADDED",
            Envelope::UserLeft { .. } => "WEBRTC_ROOM_USER_LEFT",
            Envelope::OutboundAnswer { .. } => "WEBRTC_USER_ANSWER",
            Envelope::InboundAnswer { .. } => "WEBRTC_MIXER_ANSWER",
            Envelope::OutboundCandidate(_) => "WEBRTC_USER_ICE_CANDIDATE",
            Envelope::InboundCandidate(_) => "WEBRTC_MIXER_ICE_CANDIDATE",
        }
    }
}

/// Outbound destination tags. Disjoint from the inbound kind set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    UserJoin,
    UserLeave,
    UserOffer,
    UserIceCandidate,
    MixerOffer,
    MixerIceCandidate,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::UserJoin => "user/join",
            Destination::UserLeave => "user/leave",
            Destination::UserOffer => "user/offer",
            Destination::UserIceCandidate => "user/ice-candidate",
            Destination::MixerOffer => "mixer/offer",
            Destination::MixerIceCandidate => "mixer/ice-candidate",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound signaling request, addressed by [`Destination`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    Join { user_id: UserId },
    Leave,
    Offer { direction: StreamDirection, sdp: String },
    Candidate { direction: StreamDirection, candidate: IceCandidate },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinPayload {
    user_id: UserId,
}

#[derive(Serialize)]
struct OfferPayload<'a> {
    sdp: &'a str,
}

#[derive(Serialize)]
struct EmptyPayload {}

impl ClientRequest {
    pub fn destination(&self) -> Destination {
        match self {
            ClientRequest::Join { .. } => Destination::UserJoin,
            ClientRequest::Leave => Destination::UserLeave,
            ClientRequest::Offer { direction, .. } => match direction {
                StreamDirection::Outbound => Destination::UserOffer,
                StreamDirection::Inbound => Destination::MixerOffer,
            },
            ClientRequest::Candidate { direction, .. } => match direction {
                StreamDirection::Outbound => Destination::UserIceCandidate,
                StreamDirection::Inbound => Destination::MixerIceCandidate,
            },
        }
    }

    /// Serialize to the wire: destination tag plus JSON body.
    pub fn encode(&self) -> Result<(Destination, String), CodecError> {
        let body = match self {
            ClientRequest::Join { user_id } => {
                serde_json::to_string(&JoinPayload { user_id: *user_id })?
            }
            ClientRequest::Leave => serde_json::to_string(&EmptyPayload {})?,
            ClientRequest::Offer { sdp, .. } => serde_json::to_string(&OfferPayload { sdp })?,
            ClientRequest::Candidate { candidate, .. } => serde_json::to_string(candidate)?,
        };
        Ok((self.destination(), body))
    }
}
