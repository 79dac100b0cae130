mod command;
mod controller;
mod handle;

pub use command::SessionCommand;
pub use controller::{LinkStates, SessionController, SessionSnapshot, SessionState};
pub use handle::SessionHandle;
