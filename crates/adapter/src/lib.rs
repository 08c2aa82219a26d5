//! Adapter crate - remote control via TCP socket with a JSON protocol
//!
//! Lets an external client (a renderer, a bot, a test harness) drive a puzzle
//! session over a plain TCP connection.
//!
//! # Protocol Overview
//!
//! The adapter speaks a **line-delimited JSON protocol**:
//!
//! 1. **Connection**: client connects (default: 127.0.0.1:7878)
//! 2. **Handshake**: client sends `hello`, server answers `welcome`
//! 3. **Controller Assignment**: the first client to hello becomes the controller
//! 4. **Commanding**: the controller sends `command` messages (`move`, `rotate`,
//!    `drag`, `drop`, `exit`, `reset`); each is answered by an `ack` whose
//!    `status` is `ok` or `rejected`
//! 5. **Observation Streaming**: after every applied command, clients that asked
//!    for it receive a full `observation`
//!
//! Protocol-level failures (no handshake, stale `seq`, not the controller, full
//! queue) are reported as `error` messages instead of acks.
//!
//! # Environment Variables
//!
//! - `BLOCKGATE_HOST`: bind address (default: "127.0.0.1")
//! - `BLOCKGATE_PORT`: port number (default: 7878)
//! - `BLOCKGATE_MAX_PENDING`: command queue depth (default: 16)
//! - `BLOCKGATE_DISABLED`: set to "1" or "true" to skip starting the server
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":0,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"game_id":"block-gate"}
//! Server -> Client: {"type":"observation","seq":1,"ts":0,"board":{...},"pieces":[...],"gates":[...],"complete":false,"state_hash":"..."}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"op":"move","piece":0,"x":0,"y":1}
//! Server -> Client: {"type":"ack","seq":2,"ts":0,"status":"ok","outcome":{"kind":"moved","x":0,"y":1}}
//! ```
//!
//! # Implementation
//!
//! - Uses **tokio** for async networking
//! - A single engine task owns the session (see [`runtime`]); client tasks
//!   only parse, validate and enqueue
//! - See [`protocol`] for message definitions and [`server`] for the listener

pub mod protocol;
pub mod runtime;
pub mod server;

pub use block_gate_core as core;
pub use block_gate_engine as engine;
pub use block_gate_types as types;

pub use protocol::*;
pub use runtime::{ClientCommand, ClientOutbound, InboundCommand, InboundPayload, OutboundMessage};
pub use server::*;
