//! Protocol module - JSON message types for the remote adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender sequence
//! number) and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{Piece, SnapOutcome};
use crate::engine::{CommandOutcome, Session};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const PROTOCOL_MAJOR_PREFIX: &str = "1.";
pub const GAME_ID: &str = "block-gate";

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[serde(rename = "control")]
    #[default]
    Control,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandOp {
    Move,
    Rotate,
    Drag,
    Drop,
    Exit,
    Reset,
}

impl CommandOp {
    pub const ALL: [CommandOp; 6] = [
        CommandOp::Move,
        CommandOp::Rotate,
        CommandOp::Drag,
        CommandOp::Drop,
        CommandOp::Exit,
        CommandOp::Reset,
    ];
}

/// Command message (controller only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub op: CommandOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clockwise: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

/// Control message (claim or release the controller role)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
}

/// What an applied command did, as reported in an ack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeSnapshot {
    Moved { x: i32, y: i32 },
    Rotated { rotation: i32 },
    Lifted { x: i32, y: i32 },
    Snapped { x: i32, y: i32 },
    Reverted { x: i32, y: i32 },
    Unplaced,
    Exited { gate: usize },
    Reset,
}

impl From<CommandOutcome> for OutcomeSnapshot {
    fn from(value: CommandOutcome) -> Self {
        match value {
            CommandOutcome::Moved(c) => Self::Moved { x: c.x, y: c.y },
            CommandOutcome::Rotated(o) => Self::Rotated {
                rotation: o.degrees(),
            },
            CommandOutcome::Lifted(c) => Self::Lifted { x: c.x, y: c.y },
            CommandOutcome::Dropped(SnapOutcome::Snapped(c)) => Self::Snapped { x: c.x, y: c.y },
            CommandOutcome::Dropped(SnapOutcome::Reverted(c)) => Self::Reverted { x: c.x, y: c.y },
            CommandOutcome::Dropped(SnapOutcome::Unplaced) => Self::Unplaced,
            CommandOutcome::Exited { gate } => Self::Exited { gate },
        }
    }
}

/// Acknowledgment for an applied (or rejected) command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeSnapshot>,
}

/// Protocol error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Board snapshot; `cells` lists rows top first, `null` for empty cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u16,
    pub height: u16,
    pub cells: Vec<Vec<Option<u32>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSnapshot {
    pub id: u32,
    pub color: String,
    pub status: String,
    pub pivot: [i32; 2],
    pub rotation: i32,
    pub cells: Vec<[i32; 2]>,
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        let pivot = piece.pivot();
        Self {
            id: piece.id().0,
            color: piece.color().as_str().to_string(),
            status: piece.status().as_str().to_string(),
            pivot: [pivot.x, pivot.y],
            rotation: piece.orientation().degrees(),
            cells: piece.cells().map(|c| [c.x, c.y]).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub color: String,
    pub position: [i32; 2],
}

/// Full session observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub board: BoardSnapshot,
    pub pieces: Vec<PieceSnapshot>,
    pub gates: Vec<GateSnapshot>,
    pub complete: bool,
    pub state_hash: StateHash,
}

/// Deterministic state hash serialized as 16 lowercase hex digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

// ============== Parsing and Construction ==============

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone)]
pub struct UnknownMessage {
    pub msg_type: Option<String>,
    pub seq: u64,
}

/// Parse one inbound line.
///
/// A well-formed object with an unrecognized `type` is `Unknown`, not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Envelope<'a> {
                #[serde(rename = "type", borrow)]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let envelope = serde_json::from_str::<Envelope>(json)?;
            match envelope.msg_type {
                Some("hello" | "command" | "control") => Err(e),
                other => Ok(ParsedMessage::Unknown(UnknownMessage {
                    msg_type: other.map(str::to_string),
                    seq: envelope.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Best-effort `seq` extraction from a line that failed to parse
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

pub fn create_welcome(
    seq: u64,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
    }
}

pub fn create_ack(seq: u64, outcome: Option<OutcomeSnapshot>) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        code: None,
        message: None,
        outcome,
    }
}

pub fn create_rejection(seq: u64, code: &str, message: &str) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Rejected,
        code: Some(code.to_string()),
        message: Some(message.to_string()),
        outcome: None,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation of `session`
pub fn build_observation(session: &Session, seq: u64) -> ObservationMessage {
    let board = session.board();
    let cells = board
        .to_rows()
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.map(|id| id.0)).collect())
        .collect();

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        board: BoardSnapshot {
            width: board.width(),
            height: board.height(),
            cells,
        },
        pieces: session.pieces().iter().map(PieceSnapshot::from).collect(),
        gates: session
            .gates()
            .iter()
            .map(|g| GateSnapshot {
                color: g.required_color().as_str().to_string(),
                position: [g.position().x, g.position().y],
            })
            .collect(),
        complete: session.is_complete(),
        state_hash: state_hash(session),
    }
}

/// Stable 64-bit FNV-1a hasher.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

pub fn state_hash(session: &Session) -> StateHash {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    session.board().width().hash(&mut hasher);
    session.board().height().hash(&mut hasher);
    session.board().cells().hash(&mut hasher);
    session.pieces().hash(&mut hasher);
    session.gates().hash(&mut hasher);
    StateHash(hasher.finish())
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
