mod envelope;
mod ice;
mod user;

pub use envelope::{ClientRequest, CodecError, Destination, Envelope};
pub use ice::{IceCandidate, StreamDirection};
pub use user::{Identity, Participant, UserId};
