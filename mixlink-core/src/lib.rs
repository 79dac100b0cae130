pub mod model;

pub use model::{
    ClientRequest, CodecError, Destination, Envelope, IceCandidate, Identity, Participant,
    StreamDirection, UserId,
};
