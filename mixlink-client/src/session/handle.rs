use crate::auth::AuthService;
use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::peer::PeerConnector;
use crate::session::command::SessionCommand;
use crate::session::controller::{SessionController, SessionSnapshot};
use crate::transport::SignalingTransport;
use mixlink_core::Identity;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Caller-side handle to a running session loop.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Spawn the controller task and hand back its command channel.
    pub fn spawn(
        auth: Arc<dyn AuthService>,
        transport: Arc<dyn SignalingTransport>,
        connector: Arc<dyn PeerConnector>,
        config: ClientConfig,
    ) -> Self {
        let (commands, command_rx) = mpsc::channel(64);
        let controller = SessionController::new(auth, transport, connector, config, command_rx);
        tokio::spawn(controller.run());
        Self { commands }
    }

    pub async fn login(&self, name: &str) -> Result<Identity, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Login {
                name: name.to_owned(),
                reply,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)?
    }

    pub async fn join(&self) -> Result<(), SessionError> {
        self.commands
            .send(SessionCommand::Join)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// Resolves once both media legs have been disposed.
    pub async fn leave(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Leave { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(SessionCommand::Snapshot { reply })
            .await
            .map_err(|_| SessionError::Closed)?;
        rx.await.map_err(|_| SessionError::Closed)
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown).await;
    }
}
