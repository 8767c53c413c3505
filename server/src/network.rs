//! Session gateway and simulation coordinator
//!
//! The gateway is an axum router on the game port. `GET /ws` upgrades to a
//! WebSocket session, `GET /api/stats` answers with a JSON snapshot. Every
//! session mints a player id, decodes inbound frames and forwards them as
//! [`ServerMessage`]s to the single coordinator loop in [`Server::run`],
//! which owns the game state and the broadcast bus. Outbound text flows
//! back through a per-session queue drained by a dedicated writer task.

use crate::actions;
use crate::broadcast::{BroadcastBus, SessionSender};
use crate::config::ServerConfig;
use crate::game::GameState;
use crate::ids::IdGenerator;
use crate::status::{self, STATS_PATH};
use crate::tick;
use crate::utils::get_timestamp;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientMessage, ServerStats};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const WS_PATH: &str = "/ws";

/// Failures local to a single connection or request. None of these reach
/// the coordinator or affect other sessions.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] axum::Error),
    #[error("simulation is no longer running")]
    CoordinatorClosed,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, self.to_string()).into_response()
    }
}

/// Messages sent from connection tasks to the coordinator
#[derive(Debug)]
pub enum ServerMessage {
    Join {
        player_id: String,
        outbound: SessionSender,
    },
    Message {
        player_id: String,
        message: ClientMessage,
    },
    Leave {
        player_id: String,
    },
    Stats {
        reply: oneshot::Sender<ServerStats>,
    },
    Shutdown,
}

/// Shared by every request handler
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub(crate) server_tx: mpsc::UnboundedSender<ServerMessage>,
    ids: Arc<IdGenerator>,
}

impl GatewayState {
    pub fn new(server_tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            server_tx,
            ids: Arc::new(IdGenerator::new()),
        }
    }
}

/// Cloneable handle for talking to a running server from outside
#[derive(Debug, Clone)]
pub struct ServerHandle {
    server_tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ServerHandle {
    /// Asks the coordinator to stop. Returns false if it already has.
    pub fn shutdown(&self) -> bool {
        self.server_tx.send(ServerMessage::Shutdown).is_ok()
    }

    pub async fn stats(&self) -> Option<ServerStats> {
        request_stats(&self.server_tx).await.ok()
    }
}

/// Builds the HTTP surface of the game port
pub fn router(gateway: GatewayState) -> Router {
    Router::new()
        .route(STATS_PATH, get(status::stats_handler))
        .route(WS_PATH, get(ws_handler))
        .with_state(gateway)
}

/// Owns the simulation and applies messages one at a time
pub struct Coordinator {
    config: ServerConfig,
    game_state: GameState,
    bus: BroadcastBus,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Coordinator {
    /// Applies one message to the game state. Returns false on shutdown.
    fn handle_server_message(&mut self, message: ServerMessage) -> bool {
        match message {
            ServerMessage::Join {
                player_id,
                outbound,
            } => match actions::join(&mut self.game_state, &player_id) {
                Some(events) => {
                    self.bus.register(player_id, outbound);
                    self.bus.dispatch(events);
                }
                None => {
                    warn!(
                        "Server full ({} players), rejecting {}",
                        self.game_state.players.max_players(),
                        player_id
                    );
                }
            },
            ServerMessage::Message { player_id, message } => {
                let events = actions::handle_message(
                    &mut self.game_state,
                    &player_id,
                    message,
                    get_timestamp(),
                );
                self.bus.dispatch(events);
            }
            ServerMessage::Leave { player_id } => {
                self.bus.unregister(&player_id);
                let events = actions::leave(&mut self.game_state, &player_id);
                self.bus.dispatch(events);
            }
            ServerMessage::Stats { reply } => {
                if reply.send(self.game_state.stats()).is_err() {
                    debug!("Stats requester went away");
                }
            }
            ServerMessage::Shutdown => return false,
        }
        true
    }

    /// Runs until shutdown or until every sender is gone
    async fn run(mut self) {
        let vitals_period = self.config.vitals_interval();
        let respawn_period = self.config.respawn_interval();
        let mut vitals_interval = interval_at(Instant::now() + vitals_period, vitals_period);
        vitals_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut respawn_interval = interval_at(Instant::now() + respawn_period, respawn_period);
        respawn_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => {
                            if !self.handle_server_message(message) {
                                info!("Shutdown requested");
                                break;
                            }
                        }
                        None => break,
                    }
                }

                _ = vitals_interval.tick() => {
                    let events = tick::vitals_tick(&mut self.game_state);
                    self.bus.dispatch(events);
                }

                _ = respawn_interval.tick() => {
                    let events = tick::respawn_tick(&mut self.game_state);
                    self.bus.dispatch(events);
                }
            }
        }

        info!("Server stopped after {} vitals ticks", self.game_state.tick);
    }
}

/// Main server coordinating sessions and game simulation
pub struct Server {
    listener: TcpListener,
    addr: SocketAddr,
    gateway: GatewayState,
    coordinator: Coordinator,
}

impl Server {
    /// Binds the listening socket and generates the world
    pub async fn bind(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        info!("Server listening on {}", addr);

        let game_state = GameState::generated(config.max_players, config.seed);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            addr,
            gateway: GatewayState::new(server_tx),
            coordinator: Coordinator {
                config,
                game_state,
                bus: BroadcastBus::new(),
                server_rx,
            },
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            server_tx: self.gateway.server_tx.clone(),
        }
    }

    /// Spawns the HTTP and WebSocket gateway on the bound listener
    fn spawn_gateway(listener: TcpListener, gateway: GatewayState) -> JoinHandle<()> {
        let app = router(gateway);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Gateway stopped: {}", e);
            }
        })
    }

    /// Main server loop coordinating all operations
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Server {
            listener,
            gateway,
            coordinator,
            ..
        } = self;

        let gateway_task = Self::spawn_gateway(listener, gateway);
        info!("Server started successfully");

        coordinator.run().await;

        gateway_task.abort();
        Ok(())
    }
}

pub(crate) async fn request_stats(
    server_tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<ServerStats, GatewayError> {
    let (reply, response) = oneshot::channel();
    server_tx
        .send(ServerMessage::Stats { reply })
        .map_err(|_| GatewayError::CoordinatorClosed)?;
    response.await.map_err(|_| GatewayError::CoordinatorClosed)
}

async fn ws_handler(State(gateway): State<GatewayState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = run_session(socket, gateway).await {
            debug!("Session ended: {}", e);
        }
    })
}

/// Drives one player's WebSocket from upgrade to disconnect
async fn run_session(socket: WebSocket, gateway: GatewayState) -> Result<(), GatewayError> {
    let GatewayState { server_tx, ids } = gateway;
    let player_id = ids.next("p");
    info!("Session {} opened", player_id);

    let (mut sink, mut source) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    server_tx
        .send(ServerMessage::Join {
            player_id: player_id.clone(),
            outbound,
        })
        .map_err(|_| GatewayError::CoordinatorClosed)?;

    // Ends when the coordinator drops this session's queue
    let writer = {
        let player_id = player_id.clone();
        tokio::spawn(async move {
            while let Some(text) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(text)).await {
                    debug!("Write to {} failed: {}", player_id, e);
                    break;
                }
            }
            if let Err(e) = sink.close().await {
                debug!("Close of {} failed: {}", player_id, e);
            }
        })
    };

    while let Some(frame) = source.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    let forwarded = server_tx.send(ServerMessage::Message {
                        player_id: player_id.clone(),
                        message,
                    });
                    if forwarded.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Dropping malformed message from {}: {}", player_id, e);
                }
            },
            Ok(Message::Binary(_)) => {
                warn!("Dropping binary frame from {}", player_id);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read from {} failed: {}", player_id, e);
                break;
            }
        }
    }

    info!("Session {} closed", player_id);
    let leave = ServerMessage::Leave {
        player_id: player_id.clone(),
    };
    if server_tx.send(leave).is_err() {
        debug!("Coordinator gone before {} left", player_id);
    }
    drop(writer);
    Ok(())
}
