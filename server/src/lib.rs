//! # Emoji World Server Library
//!
//! This library provides the authoritative server for a shared 2D survival
//! world. Players connect over WebSocket, roam a bounded map, mine trees and
//! stones, craft tools, build and tear down blocks, fight each other and
//! compete on a live leaderboard.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Every rule decision is made here. Clients mirror the rules locally to
//! decide what to ask for, but only the server mutates the world, and a
//! request that fails a precondition simply produces no broadcast.
//!
//! ### Session Management
//! Handles the complete lifecycle of a connection:
//! - Handshake and player id assignment
//! - Decoding of inbound intents, with malformed frames logged and dropped
//! - Registry cleanup and departure broadcast on disconnect
//!
//! ### State Broadcasting
//! Every mutation is reported as full snapshots of what changed (a player,
//! an inventory, the world or the leaderboard) so clients never need to
//! reconcile partial deltas.
//!
//! ## Architecture Design
//!
//! ### Single Coordinator
//! One task owns the [`game::GameState`] and the [`broadcast::BroadcastBus`].
//! Connection tasks and timers feed it through a channel, so each action
//! runs to completion before the next one starts and no action ever sees a
//! half-applied mutation.
//!
//! ### Rules Return Events
//! The action resolver and tick scheduler never touch sockets. They return
//! lists of [`broadcast::Outbound`] events, which makes every rule testable
//! as a plain function over the state.
//!
//! ## Module Organization
//!
//! ### World (`world`)
//! Resource nodes and player-built blocks, generation and respawn, proximity
//! lookup and block collision.
//!
//! ### Registry (`registry`)
//! Connected players in join order with a capacity limit.
//!
//! ### Actions (`actions`)
//! Validates and applies every client intent: movement, identity, mining,
//! combat, building, eating, crafting and chat.
//!
//! ### Tick (`tick`)
//! Vitals decay and cooldowns every second, resource respawn every thirty.
//!
//! ### Network (`network`)
//! The axum router serving `/ws` and `/api/stats` on one port, per-session
//! reader and writer tasks, and the coordinator loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         port: 8080,
//!         max_players: 32,
//!         ..Default::default()
//!     };
//!
//!     // Binds the port and generates 50 trees and 30 stones
//!     let server = Server::bind(config).await?;
//!
//!     // Runs until a shutdown is requested through a ServerHandle
//!     if let Err(e) = server.run().await {
//!         eprintln!("server stopped: {}", e);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Known Limitations
//!
//! Clients report their own health and hunger on every move. The server
//! clamps them into range but otherwise trusts them.

pub mod actions;
pub mod broadcast;
pub mod config;
pub mod game;
pub mod ids;
pub mod leaderboard;
pub mod network;
pub mod registry;
pub mod status;
pub mod tick;
pub mod utils;
pub mod world;
