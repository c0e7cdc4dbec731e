//! WebSocket multiplayer client.
//!
//! One background task per `connect` owns the socket and survives drops by
//! reconnecting with backoff. Inbound messages are decoded and handed to a
//! `MultiplayerHandler`; outbound messages are encoded on the caller's side
//! and queued to the task, fire-and-forget.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::game::engine::GameEngine;
use crate::game::state::Worm;
use crate::net::connection::{room_url, ConnectionState, ReconnectPolicy, UpdateThrottle};
use crate::net::protocol::{decode, encode, ClientMessage, EncodeError, RemotePlayerState, ServerMessage};
use crate::util::vec2::Vec2;

/// Outbound messages buffered per connection before new ones are dropped
const OUTBOUND_QUEUE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("Not connected")]
    NotConnected,
    #[error("No tokio runtime available")]
    NoRuntime,
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Receives connection lifecycle and room events. Called from the client's
/// background task, so implementations must not block for long.
pub trait MultiplayerHandler: Send + Sync + 'static {
    fn on_connected(&self) {}
    fn on_disconnected(&self) {}
    fn on_error(&self, _error: &NetError) {}
    fn on_welcome(&self, _player_id: &str, _players: &[RemotePlayerState]) {}
    fn on_player_joined(&self, _player_id: &str) {}
    fn on_player_left(&self, _player_id: &str) {}
    fn on_game_state(&self, _players: &[RemotePlayerState]) {}
    fn on_player_died(&self, _player_id: &str, _segments: &[Vec2], _color: &str) {}
}

/// Everything a `MultiplayerHandler` can be told, as an owned value
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    Connected,
    Disconnected,
    Error(String),
    Welcome {
        player_id: String,
        players: Vec<RemotePlayerState>,
    },
    PlayerJoined(String),
    PlayerLeft(String),
    GameState(Vec<RemotePlayerState>),
    PlayerDied {
        player_id: String,
        segments: Vec<Vec2>,
        color: String,
    },
}

impl NetEvent {
    /// Feed the roster side of this event into the engine. Lifecycle events
    /// and joins are left to the caller.
    pub fn apply(&self, engine: &mut GameEngine) {
        match self {
            NetEvent::Welcome { players, .. } | NetEvent::GameState(players) => {
                engine.update_remote_players(players);
            }
            NetEvent::PlayerLeft(player_id) => engine.remove_remote_player(player_id),
            NetEvent::PlayerDied {
                player_id,
                segments,
                color,
            } => engine.drop_remote_remains(player_id, segments, color),
            NetEvent::Connected
            | NetEvent::Disconnected
            | NetEvent::Error(_)
            | NetEvent::PlayerJoined(_) => {}
        }
    }
}

/// Handler that forwards every callback as a `NetEvent` so a tick loop on
/// another thread can drain them between updates
pub struct ChannelHandler {
    tx: Sender<NetEvent>,
}

impl ChannelHandler {
    pub fn new() -> (Self, Receiver<NetEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }

    fn forward(&self, event: NetEvent) {
        // Receiver gone means nobody is listening any more
        let _ = self.tx.send(event);
    }
}

impl MultiplayerHandler for ChannelHandler {
    fn on_connected(&self) {
        self.forward(NetEvent::Connected);
    }

    fn on_disconnected(&self) {
        self.forward(NetEvent::Disconnected);
    }

    fn on_error(&self, error: &NetError) {
        self.forward(NetEvent::Error(error.to_string()));
    }

    fn on_welcome(&self, player_id: &str, players: &[RemotePlayerState]) {
        self.forward(NetEvent::Welcome {
            player_id: player_id.to_string(),
            players: players.to_vec(),
        });
    }

    fn on_player_joined(&self, player_id: &str) {
        self.forward(NetEvent::PlayerJoined(player_id.to_string()));
    }

    fn on_player_left(&self, player_id: &str) {
        self.forward(NetEvent::PlayerLeft(player_id.to_string()));
    }

    fn on_game_state(&self, players: &[RemotePlayerState]) {
        self.forward(NetEvent::GameState(players.to_vec()));
    }

    fn on_player_died(&self, player_id: &str, segments: &[Vec2], color: &str) {
        self.forward(NetEvent::PlayerDied {
            player_id: player_id.to_string(),
            segments: segments.to_vec(),
            color: color.to_string(),
        });
    }
}

/// Bookkeeping shared between the client and its connection task
#[derive(Debug)]
struct Shared {
    state: ConnectionState,
    player_id: Option<String>,
    /// Bumped by every `connect` and `disconnect`. A task holding an older
    /// generation may no longer write here.
    generation: u64,
}

/// A connection task's write access to `Shared`, valid for one generation
#[derive(Clone)]
struct SharedLink {
    shared: Arc<Mutex<Shared>>,
    generation: u64,
}

impl SharedLink {
    /// Store `state` unless the client has moved on. `false` means the
    /// task is stale and must stop.
    fn set_state(&self, state: ConnectionState) -> bool {
        let mut shared = self.shared.lock();
        if shared.generation != self.generation {
            return false;
        }
        shared.state = state;
        true
    }

    fn set_player_id(&self, player_id: &str) -> bool {
        let mut shared = self.shared.lock();
        if shared.generation != self.generation {
            return false;
        }
        shared.player_id = Some(player_id.to_string());
        true
    }
}

/// Live connection task and the handles that steer it
struct ConnectionTask {
    outbound: mpsc::Sender<String>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct MultiplayerClient {
    endpoint: String,
    policy: ReconnectPolicy,
    handler: Arc<dyn MultiplayerHandler>,
    shared: Arc<Mutex<Shared>>,
    throttle: UpdateThrottle,
    task: Option<ConnectionTask>,
}

impl MultiplayerClient {
    /// Client for an http(s) or ws(s) base endpoint
    pub fn new(endpoint: impl Into<String>, handler: Arc<dyn MultiplayerHandler>) -> Self {
        Self {
            endpoint: endpoint.into(),
            policy: ReconnectPolicy::default(),
            handler,
            shared: Arc::new(Mutex::new(Shared {
                state: ConnectionState::Idle,
                player_id: None,
                generation: 0,
            })),
            throttle: UpdateThrottle::default(),
            task: None,
        }
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open a connection to `room`, replacing any existing one. Must be
    /// called from within a tokio runtime.
    pub fn connect(&mut self, room: &str) -> Result<(), NetError> {
        let url = room_url(&self.endpoint, room)
            .ok_or_else(|| NetError::InvalidEndpoint(format!("{} (room '{}')", self.endpoint, room)))?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| NetError::NoRuntime)?;

        self.disconnect();
        self.throttle = UpdateThrottle::default();

        let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let link = {
            let mut shared = self.shared.lock();
            shared.generation += 1;
            shared.state = ConnectionState::Connecting;
            SharedLink {
                shared: self.shared.clone(),
                generation: shared.generation,
            }
        };
        info!("Connecting to {}", url);

        let handle = runtime.spawn(run_connection(
            url,
            self.policy,
            self.handler.clone(),
            link,
            outbound_rx,
            shutdown_rx,
        ));
        self.task = Some(ConnectionTask {
            outbound,
            shutdown,
            handle,
        });
        Ok(())
    }

    /// Close the connection and cancel any pending reconnect
    pub fn disconnect(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = task.shutdown.send(true);
        // The task closes the socket itself; it is detached here
        drop(task.handle);
        let mut shared = self.shared.lock();
        shared.generation += 1;
        shared.state = ConnectionState::Idle;
        shared.player_id = None;
        info!("Disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.shared.lock().state == ConnectionState::Connected
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    /// Id assigned by the server's last `welcome`
    pub fn player_id(&self) -> Option<String> {
        self.shared.lock().player_id.clone()
    }

    pub fn send_join(&self, worm: &Worm) -> Result<(), NetError> {
        self.send(&ClientMessage::join(worm))
    }

    /// Sends on every third call only; skipped calls succeed silently
    pub fn send_update(&mut self, worm: &Worm) -> Result<(), NetError> {
        if !self.throttle.should_send() {
            return Ok(());
        }
        self.send(&ClientMessage::update(worm))
    }

    pub fn send_died(&self) -> Result<(), NetError> {
        self.send(&ClientMessage::Died)
    }

    pub fn send_respawn(&self, worm: &Worm) -> Result<(), NetError> {
        self.send(&ClientMessage::respawn(worm))
    }

    fn send(&self, message: &ClientMessage) -> Result<(), NetError> {
        if !self.is_connected() {
            return Err(NetError::NotConnected);
        }
        let Some(task) = &self.task else {
            return Err(NetError::NotConnected);
        };
        let text = encode(message)?;
        match task.outbound.try_send(text) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Outbound queue full, dropping message");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::NotConnected),
        }
    }
}

impl Drop for MultiplayerClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.shutdown.send(true);
        }
    }
}

/// How a live session ended
enum SessionEnd {
    /// `disconnect` or the client went away
    Shutdown,
    /// Socket closed or failed under us
    Dropped,
}

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn run_connection(
    url: String,
    policy: ReconnectPolicy,
    handler: Arc<dyn MultiplayerHandler>,
    link: SharedLink,
    mut outbound: mpsc::Receiver<String>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut attempt = 0u32;
    loop {
        let connected = tokio::select! {
            result = connect_async(url.as_str()) => result,
            _ = shutdown.changed() => return,
        };

        match connected {
            Ok((socket, _)) => {
                if *shutdown.borrow() || !link.set_state(ConnectionState::Connected) {
                    return;
                }
                attempt = 0;
                info!("Connected to {}", url);
                handler.on_connected();

                // Anything queued while we were down is stale
                while outbound.try_recv().is_ok() {}

                let end = run_session(socket, &handler, &link, &mut outbound, &mut shutdown).await;
                if matches!(end, SessionEnd::Shutdown) || *shutdown.borrow() {
                    return;
                }
                if !link.set_state(ConnectionState::Connecting) {
                    return;
                }
                warn!("Connection to {} lost", url);
                handler.on_disconnected();
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", url, e);
                handler.on_error(&NetError::WebSocket(e));
            }
        }

        attempt += 1;
        let Some(delay) = policy.delay_for(attempt) else {
            warn!("Giving up on {} after {} reconnect attempts", url, policy.max_attempts);
            link.set_state(ConnectionState::GaveUp);
            return;
        };
        // The client may have disconnected while the handler ran
        if !link.set_state(ConnectionState::Reconnecting { attempt }) {
            return;
        }
        info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay, attempt, policy.max_attempts
        );
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown.changed() => return,
        }
        if *shutdown.borrow() || !link.set_state(ConnectionState::Connecting) {
            return;
        }
    }
}

async fn run_session(
    socket: Socket,
    handler: &Arc<dyn MultiplayerHandler>,
    link: &SharedLink,
    outbound: &mut mpsc::Receiver<String>,
    shutdown: &mut watch::Receiver<bool>,
) -> SessionEnd {
    let (mut write, mut read) = socket.split();
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
            }
            queued = outbound.recv() => {
                let Some(text) = queued else {
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                };
                if let Err(e) = write.send(Message::Text(text)).await {
                    warn!("Send failed: {}", e);
                    handler.on_error(&NetError::WebSocket(e));
                    return SessionEnd::Dropped;
                }
            }
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => dispatch(&text, handler.as_ref(), link),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Server closed the connection: {:?}", frame);
                    return SessionEnd::Dropped;
                }
                // Ping/pong are answered by tungstenite; binary frames are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Receive failed: {}", e);
                    handler.on_error(&NetError::WebSocket(e));
                    return SessionEnd::Dropped;
                }
                None => return SessionEnd::Dropped,
            },
        }
    }
}

/// Decode one text frame and route it to the handler. Bad frames are
/// logged and dropped; the connection stays up.
fn dispatch(text: &str, handler: &dyn MultiplayerHandler, link: &SharedLink) {
    let message = match decode::<ServerMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            warn!("Dropping malformed message: {}", e);
            return;
        }
    };

    match message {
        ServerMessage::Welcome { player_id, players } => {
            info!("Welcome as {} ({} players in room)", player_id, players.len());
            if !link.set_player_id(&player_id) {
                return;
            }
            handler.on_welcome(&player_id, &players);
        }
        ServerMessage::PlayerJoined { player_id } => {
            debug!("Player {} joined", player_id);
            handler.on_player_joined(&player_id);
        }
        ServerMessage::PlayerLeft { player_id } => {
            debug!("Player {} left", player_id);
            handler.on_player_left(&player_id);
        }
        ServerMessage::GameState { players } => handler.on_game_state(&players),
        ServerMessage::PlayerDied {
            player_id,
            segments,
            color,
        } => {
            debug!("Player {} died", player_id);
            handler.on_player_died(&player_id, &segments, &color);
        }
        ServerMessage::Unknown => debug!("Ignoring message with unknown type"),
    }
}
