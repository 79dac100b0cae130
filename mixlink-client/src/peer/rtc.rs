use crate::config::ClientConfig;
use crate::peer::backend::{PeerBackend, PeerConnector, PeerEvent};
use anyhow::Result;
use async_trait::async_trait;
use mixlink_core::{IceCandidate, StreamDirection};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// Production peer-connection factory over webrtc-rs.
///
/// Each leg is an audio-only `RTCPeerConnection`: sendonly for the
/// outbound leg, recvonly for the inbound one. The client is always the
/// offering side; the mixer answers.
pub struct RtcPeerConnector {
    config: ClientConfig,
}

impl RtcPeerConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PeerConnector for RtcPeerConnector {
    async fn connect(
        &self,
        direction: StreamDirection,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerBackend>> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: vec![RTCIceServer {
                urls: self.config.ice_servers.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                info!("Peer connection state on {} leg: {:?}", direction, s);
                match s {
                    RTCPeerConnectionState::Connected => {
                        let _ = tx.send(PeerEvent::Connected { direction }).await;
                    }
                    RTCPeerConnectionState::Failed => {
                        let _ = tx
                            .send(PeerEvent::Failed {
                                direction,
                                cause: "peer connection failed".to_owned(),
                            })
                            .await;
                    }
                    _ => {}
                }
            })
        }));

        let ice_tx = events.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        error!("Candidate serialization failed on {} leg: {}", direction, e);
                        return;
                    }
                };
                let _ = tx
                    .send(PeerEvent::LocalCandidate {
                        direction,
                        candidate: IceCandidate {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                        },
                    })
                    .await;
            })
        }));

        let transceiver_direction = match direction {
            StreamDirection::Outbound => RTCRtpTransceiverDirection::Sendonly,
            StreamDirection::Inbound => RTCRtpTransceiverDirection::Recvonly,
        };
        pc.add_transceiver_from_kind(
            RTPCodecType::Audio,
            Some(RTCRtpTransceiverInit {
                direction: transceiver_direction,
                send_encodings: vec![],
            }),
        )
        .await?;

        // Offer generation runs detached so the two legs never block each
        // other. The OfferReady event is sent before the local description
        // is installed: gathering starts on set_local_description, which
        // keeps every candidate behind the offer in the channel.
        let offer_pc = pc.clone();
        tokio::spawn(async move {
            let offer = match offer_pc.create_offer(None).await {
                Ok(offer) => offer,
                Err(e) => {
                    let _ = events
                        .send(PeerEvent::Failed {
                            direction,
                            cause: format!("create_offer: {e}"),
                        })
                        .await;
                    return;
                }
            };
            let _ = events
                .send(PeerEvent::OfferReady {
                    direction,
                    sdp: offer.sdp.clone(),
                })
                .await;
            if let Err(e) = offer_pc.set_local_description(offer).await {
                let _ = events
                    .send(PeerEvent::Failed {
                        direction,
                        cause: format!("set_local_description: {e}"),
                    })
                    .await;
            }
        });

        Ok(Box::new(RtcPeer { pc }))
    }
}

struct RtcPeer {
    pc: Arc<RTCPeerConnection>,
}

#[async_trait]
impl PeerBackend for RtcPeer {
    async fn process_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    async fn dispose(&self) {
        if let Err(e) = self.pc.close().await {
            debug!("Peer connection close reported: {}", e);
        }
    }
}
