//! Engine task.
//!
//! One task owns the [`Session`]; every mutation arrives over the bounded
//! command channel and is applied in arrival order, so board updates are
//! serialized without a lock.

use tokio::sync::mpsc;

use crate::engine::{apply_command, Command, LevelConfig, PlaceError, Session};
use crate::protocol::{
    build_observation, create_ack, create_rejection, AckMessage, ErrorMessage, ObservationMessage,
    OutcomeSnapshot, WelcomeMessage,
};

/// Command delivered to the engine task.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// Send the current observation to this client only
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    Place(Command),
    /// Reload the level the server was started with
    Reset,
}

/// Message queued for a single client's writer.
#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClient { client_id: usize, msg: ClientOutbound },
    /// Sent to every client that asked for observation streaming
    Broadcast { obs: ObservationMessage },
}

/// Apply one client command to the session
pub fn apply_client_command(
    session: &mut Session,
    level: &LevelConfig,
    command: ClientCommand,
) -> Result<OutcomeSnapshot, (&'static str, String)> {
    match command {
        ClientCommand::Place(command) => apply_command(session, command)
            .map(OutcomeSnapshot::from)
            .map_err(|e: PlaceError| (e.code(), e.to_string())),
        ClientCommand::Reset => session
            .load_level(level)
            .map(|()| OutcomeSnapshot::Reset)
            .map_err(|e| ("invalid_level", e.to_string())),
    }
}

/// Run the engine until every command sender is dropped
pub async fn run_engine(
    mut session: Session,
    level: LevelConfig,
    mut command_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    let mut obs_seq = 0u64;

    while let Some(inbound) = command_rx.recv().await {
        match inbound.payload {
            InboundPayload::SnapshotRequest => {
                obs_seq += 1;
                let obs = build_observation(&session, obs_seq);
                let _ = out_tx.send(OutboundMessage::ToClient {
                    client_id: inbound.client_id,
                    msg: ClientOutbound::Observation(obs),
                });
            }
            InboundPayload::Command(command) => {
                let ack = match apply_client_command(&mut session, &level, command) {
                    Ok(outcome) => {
                        log::debug!("engine: seq {} applied: {:?}", inbound.seq, outcome);
                        create_ack(inbound.seq, Some(outcome))
                    }
                    Err((code, message)) => {
                        log::debug!("engine: seq {} rejected: {}", inbound.seq, message);
                        create_rejection(inbound.seq, code, &message)
                    }
                };

                if let Err(violation) = session.audit() {
                    log::error!("engine: board out of sync after seq {}: {}", inbound.seq, violation);
                }

                let _ = out_tx.send(OutboundMessage::ToClient {
                    client_id: inbound.client_id,
                    msg: ClientOutbound::Ack(ack),
                });

                obs_seq += 1;
                let obs = build_observation(&session, obs_seq);
                let _ = out_tx.send(OutboundMessage::Broadcast { obs });
            }
        }
    }

    log::info!("engine: command channel closed, stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, PieceId};

    fn demo() -> (Session, LevelConfig) {
        let level = LevelConfig::demo();
        (Session::from_level(&level).unwrap(), level)
    }

    #[test]
    fn test_apply_client_command_reports_codes() {
        let (mut session, level) = demo();
        let blocked = ClientCommand::Place(Command::Move {
            piece: PieceId(0),
            to: Coord::new(3, 0),
        });
        let (code, _) = apply_client_command(&mut session, &level, blocked).unwrap_err();
        assert_eq!(code, "invalid_place");

        let unknown = ClientCommand::Place(Command::Drag { piece: PieceId(99) });
        let (code, _) = apply_client_command(&mut session, &level, unknown).unwrap_err();
        assert_eq!(code, "unknown_target");
    }

    #[test]
    fn test_reset_restores_level() {
        let (mut session, level) = demo();
        let fresh = session.clone();
        let shift = ClientCommand::Place(Command::Shift {
            piece: PieceId(0),
            dx: 0,
            dy: 1,
        });
        assert_eq!(
            apply_client_command(&mut session, &level, shift),
            Ok(OutcomeSnapshot::Moved { x: 0, y: 1 })
        );
        assert_ne!(session, fresh);

        assert_eq!(
            apply_client_command(&mut session, &level, ClientCommand::Reset),
            Ok(OutcomeSnapshot::Reset)
        );
        assert_eq!(session, fresh);
    }

    #[tokio::test]
    async fn test_engine_acks_then_broadcasts() {
        let (session, level) = demo();
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let engine = tokio::spawn(run_engine(session, level, cmd_rx, out_tx));

        cmd_tx
            .send(InboundCommand {
                client_id: 1,
                seq: 5,
                payload: InboundPayload::Command(ClientCommand::Place(Command::Rotate {
                    piece: PieceId(3),
                    clockwise: true,
                })),
            })
            .await
            .unwrap();
        drop(cmd_tx);

        match out_rx.recv().await.unwrap() {
            OutboundMessage::ToClient {
                client_id: 1,
                msg: ClientOutbound::Ack(ack),
            } => {
                assert_eq!(ack.seq, 5);
                assert_eq!(ack.outcome, Some(OutcomeSnapshot::Rotated { rotation: 90 }));
            }
            other => panic!("expected ack, got {other:?}"),
        }
        assert!(matches!(
            out_rx.recv().await.unwrap(),
            OutboundMessage::Broadcast { .. }
        ));
        engine.await.unwrap();
    }
}
