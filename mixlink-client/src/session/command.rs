use crate::error::SessionError;
use crate::session::SessionSnapshot;
use mixlink_core::Identity;
use tokio::sync::oneshot;

/// Commands driving the session loop from the caller's side.
#[derive(Debug)]
pub enum SessionCommand {
    /// Establish an identity and open the inbound subscription.
    Login {
        name: String,
        reply: oneshot::Sender<Result<Identity, SessionError>>,
    },

    /// Request room entry. Fire-and-forget; anything but LoggedIn is a
    /// logged no-op.
    Join,

    /// Dispose both media legs and leave the room. The reply fires once
    /// disposal has completed.
    Leave { reply: oneshot::Sender<()> },

    /// Observe the current lifecycle state, roster and leg states.
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },

    /// Stop the event loop.
    Shutdown,
}
