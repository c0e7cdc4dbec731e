use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use worm_arena::config::{GameConfig, NetConfig};
use worm_arena::game::GameEngine;
use worm_arena::net::client::{ChannelHandler, MultiplayerClient, NetEvent};
use worm_arena::net::connection::ReconnectPolicy;

/// Wait after a crash before starting over
const RESPAWN_DELAY: Duration = Duration::from_secs(3);

/// Interval between status lines
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Server link plus the channels the tick loop drains
struct Online {
    client: MultiplayerClient,
    events: Receiver<NetEvent>,
    deaths: Receiver<()>,
}

impl Online {
    fn start(config: &NetConfig) -> anyhow::Result<Option<Self>> {
        let Some(url) = &config.server_url else {
            return Ok(None);
        };
        let (handler, events) = ChannelHandler::new();
        let mut client = MultiplayerClient::new(url.clone(), Arc::new(handler))
            .with_policy(ReconnectPolicy::with_max_attempts(config.max_reconnect_attempts));
        client.connect(&config.room)?;
        // Only the sender half is needed until the first welcome
        let (_, deaths) = crossbeam_channel::unbounded();
        Ok(Some(Self {
            client,
            events,
            deaths,
        }))
    }

    /// Feed queued server events into the engine
    fn drain_events(&mut self, engine: &mut GameEngine) {
        while let Ok(event) = self.events.try_recv() {
            match &event {
                NetEvent::Welcome { player_id, .. } => {
                    if engine.local_id() != Some(player_id.as_str()) {
                        let (tx, rx) = crossbeam_channel::unbounded();
                        self.deaths = rx;
                        engine.enable_multiplayer(
                            player_id.clone(),
                            Box::new(move || {
                                let _ = tx.send(());
                            }),
                        );
                    }
                    event.apply(engine);
                    if let Some(player) = engine.player() {
                        if let Err(e) = self.client.send_join(player) {
                            warn!("Failed to send join: {}", e);
                        }
                    }
                }
                NetEvent::Connected => info!("Connected to server"),
                NetEvent::Disconnected => warn!("Lost connection to server"),
                NetEvent::Error(e) => debug!("Network error: {}", e),
                NetEvent::PlayerJoined(id) => info!("Player {} joined", id),
                _ => event.apply(engine),
            }
        }
    }

    fn after_tick(&mut self, engine: &GameEngine) {
        if self.deaths.try_recv().is_ok() {
            if let Err(e) = self.client.send_died() {
                debug!("Failed to send death: {}", e);
            }
        }
        if engine.is_game_over() {
            return;
        }
        if let Some(player) = engine.player() {
            if let Err(e) = self.client.send_update(player) {
                debug!("Skipped update: {}", e);
            }
        }
    }

    fn after_reset(&self, engine: &GameEngine) {
        if let Some(player) = engine.player() {
            if let Err(e) = self.client.send_respawn(player) {
                debug!("Failed to send respawn: {}", e);
            }
        }
    }
}

/// Point at the nearest candy, in screen space
fn autopilot(engine: &mut GameEngine) {
    let state = engine.state();
    let Some(head) = engine.player().and_then(|p| p.head()) else {
        return;
    };
    let target = state
        .candies
        .iter()
        .map(|c| c.position)
        .min_by(|a, b| a.distance_sq_to(head).total_cmp(&b.distance_sq_to(head)));
    if let Some(target) = target {
        let screen = target - state.camera;
        engine.set_mouse_position(screen.x, screen.y);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Worm Arena v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = GameConfig::load_or_default();
    config.validate().map_err(anyhow::Error::msg)?;
    let net_config = NetConfig::load_or_default();
    net_config.validate().map_err(anyhow::Error::msg)?;
    info!(
        "Configuration loaded: map={}, worms={}, candies={}, tick_rate={}",
        config.map_size, config.worm_count, config.candy_count, config.tick_rate
    );

    let tick_rate = config.tick_rate;
    let mut engine = GameEngine::new(config);
    if let Some(name) = &net_config.player_name {
        engine.set_player_name(name);
    }

    let mut online = Online::start(&net_config)?;
    match &net_config.server_url {
        Some(url) => info!("Joining room '{}' on {}", net_config.room, url),
        None => info!("Playing offline"),
    }

    let mut ticker = interval(Duration::from_secs_f64(1.0 / tick_rate as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_status = Instant::now();
    let mut respawn_at: Option<Instant> = None;

    // Shutdown signal handler
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutdown signal received");
                break;
            }
        }

        if let Some(online) = online.as_mut() {
            online.drain_events(&mut engine);
        }

        autopilot(&mut engine);
        engine.update();

        if let Some(online) = online.as_mut() {
            online.after_tick(&engine);
        }

        if engine.is_game_over() {
            let due = *respawn_at.get_or_insert_with(|| Instant::now() + RESPAWN_DELAY);
            if Instant::now() >= due {
                respawn_at = None;
                engine.reset();
                if let Some(online) = online.as_ref() {
                    online.after_reset(&engine);
                }
            }
        }

        if last_status.elapsed() >= STATUS_INTERVAL {
            last_status = Instant::now();
            if let Some(player) = engine.player() {
                info!(
                    "Tick {}: length {}, score {}, rank {}",
                    engine.tick(),
                    player.len(),
                    player.score,
                    engine.player_rank()
                );
            }
        }
    }

    if let Some(mut online) = online.take() {
        online.client.disconnect();
    }
    info!("Stopped");

    Ok(())
}
