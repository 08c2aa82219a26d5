//! TCP server for the remote adapter
//!
//! Accepts connections, enforces the handshake / sequencing / controller
//! rules, and forwards commands to the engine task.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::engine::{Command, LevelConfig, Session};
use crate::protocol::*;
use crate::runtime::{
    run_engine, ClientCommand, ClientOutbound, InboundCommand, InboundPayload, OutboundMessage,
};
use crate::types::{Coord, PieceId};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 16,
        }
    }
}

impl ServerConfig {
    /// Create from `BLOCKGATE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = lookup("BLOCKGATE_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = lookup("BLOCKGATE_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = lookup("BLOCKGATE_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("BLOCKGATE_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

/// Shared server state
#[derive(Default)]
pub struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .is_some_and(|c| c.handshaken)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the last one seen
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, obs: ObservationMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.stream_observations) {
            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
        }
    }

    /// Remove a client, promoting the lowest remaining id if it was controller
    async fn remove_client(&self, client_id: usize) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;

        clients.retain(|c| c.id != client_id);
        if *controller == Some(client_id) {
            hand_off_control(&mut controller, &clients, client_id);
        }
    }
}

/// Give control to the lowest-id handshaken client other than `previous`
fn hand_off_control(controller: &mut Option<usize>, clients: &[ClientHandle], previous: usize) {
    *controller = clients
        .iter()
        .filter(|c| c.handshaken && c.id != previous)
        .map(|c| c.id)
        .min();
    match *controller {
        Some(id) => log::info!("adapter: client {} promoted to controller", id),
        None => log::info!("adapter: controller {} released, no client to promote", previous),
    }
}

/// Start the TCP server and the engine task for `level`.
///
/// `ready_tx` receives the bound address once the listener is up.
pub async fn run_server(
    config: ServerConfig,
    level: LevelConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let session = Session::from_level(&level).context("failed to load level")?;

    let listener = TcpListener::bind(config.socket_addr()?)
        .await
        .context("failed to bind adapter socket")?;
    let bound = listener.local_addr()?;
    log::info!("adapter: listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let (command_tx, command_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands.max(1));
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    tokio::spawn(run_engine(session, level, command_rx, out_tx));

    let state = Arc::new(ServerState::default());

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClient { client_id, msg } => state.send_to(client_id, msg).await,
                    OutboundMessage::Broadcast { obs } => state.broadcast(obs).await,
                }
            }
        });
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("adapter: client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, Arc::clone(&state), command_tx).await {
                log::warn!("adapter: client {} error: {:#}", client_id, e);
            }
            state.remove_client(client_id).await;
            log::info!("adapter: client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, hello.seq).await
                {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                if !hello.protocol_version.starts_with(PROTOCOL_MAJOR_PREFIX) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    let becomes_controller = controller.is_none();
                    if becomes_controller {
                        *controller = Some(client_id);
                        log::info!("adapter: client {} is now controller", client_id);
                    }
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, (*controller).map(|id| id as u64))
                };

                let welcome = create_welcome(hello.seq, client_id as u64, role, controller_id);
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // Ack is sent by the engine task after the command is applied.
                let sent = command_tx.try_send(InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(mapped),
                });
                match sent {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        reply_error(cmd.seq, ErrorCode::Unavailable, "engine has stopped");
                    }
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                let clients = state.clients.read().await;
                let holds_control = *controller == Some(client_id);
                match ctrl.action {
                    ControlAction::Claim if controller.is_none() || holds_control => {
                        if !holds_control {
                            log::info!("adapter: client {} claimed control", client_id);
                        }
                        *controller = Some(client_id);
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, None)));
                    }
                    ControlAction::Claim => {
                        reply_error(ctrl.seq, ErrorCode::ControllerActive, "controller already assigned");
                    }
                    ControlAction::Release if holds_control => {
                        hand_off_control(&mut controller, &clients, client_id);
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, None)));
                    }
                    ControlAction::Release => {
                        reply_error(ctrl.seq, ErrorCode::NotController, "only the controller may release");
                    }
                }
            }

            Ok(ParsedMessage::Unknown(msg)) => {
                log::warn!(
                    "adapter: client {} sent unknown message type {:?} (seq {}), ignoring",
                    client_id,
                    msg.msg_type.as_deref().unwrap_or(""),
                    msg.seq
                );
            }

            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {}", e));
            }
        }
    }

    // Our own handle still holds a sender; drop it so the writer drains and stops.
    state.clients.write().await.retain(|c| c.id != client_id);
    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into an engine command
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    let piece = || {
        cmd.piece
            .map(PieceId)
            .ok_or_else(|| format!("{:?} requires a piece id", cmd.op))
    };
    let target = || match (cmd.x, cmd.y) {
        (Some(x), Some(y)) => Ok(Coord::new(x, y)),
        _ => Err(format!("{:?} requires x and y", cmd.op)),
    };

    let command = match cmd.op {
        CommandOp::Move => Command::Move {
            piece: piece()?,
            to: target()?,
        },
        CommandOp::Rotate => Command::Rotate {
            piece: piece()?,
            clockwise: cmd.clockwise.unwrap_or(true),
        },
        CommandOp::Drag => Command::Drag { piece: piece()? },
        CommandOp::Drop => Command::Drop {
            piece: piece()?,
            at: target()?,
        },
        CommandOp::Exit => Command::Exit {
            piece: piece()?,
            gate: cmd.gate,
        },
        CommandOp::Reset => return Ok(ClientCommand::Reset),
    };
    Ok(ClientCommand::Place(command))
}
