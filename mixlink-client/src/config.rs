use std::time::Duration;

/// Client tuning knobs.
#[derive(Clone)]
pub struct ClientConfig {
    /// STUN/TURN servers handed to the peer-connection backend.
    pub ice_servers: Vec<String>,
    /// Bound on the login and subscribe calls.
    pub request_timeout: Duration,
    /// Deadline for a media leg to reach Established after the units are
    /// created. Expired legs fail; the session survives.
    pub negotiation_timeout: Duration,
    /// Remote candidates buffered per leg while the local offer is still
    /// in flight.
    pub candidate_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
            request_timeout: Duration::from_secs(10),
            negotiation_timeout: Duration::from_secs(30),
            candidate_buffer: 32,
        }
    }
}
