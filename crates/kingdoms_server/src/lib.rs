//! # Kingdoms Dedicated Server
//!
//! Headless authoritative server for the Kingdoms strategy game.
//!
//! Runs the simulation at a fixed tick rate and handles the WebSocket
//! boundary: inbound commands are queued and drained once per tick, the
//! full state snapshot is broadcast after each tick, and targeted notices
//! go to single players.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod network;
pub mod protocol;

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use kingdoms_core::config::GameConfig;
use kingdoms_core::game::{Game, Notification};

use crate::network::{broadcast, send_to, Clients, InboundEvent};
use crate::protocol::{ClientMessage, ServerMessage, ServerStats};

/// Server configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Seconds between keep-alive pings.
    pub ping_interval: u64,
    /// Simulation configuration.
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7777,
            ping_interval: 30,
            game: GameConfig::default(),
        }
    }
}

/// Errors that can take the server down.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener or socket failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file failure.
    #[error("Failed to read config '{path}': {message}")]
    Config {
        /// Path to the offending file.
        path: String,
        /// What went wrong.
        message: String,
    },
}

/// Run the server until the process is killed.
///
/// # Errors
///
/// Returns an error if the listener cannot bind.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Listening");

    let clients: Clients = Clients::default();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    tokio::spawn(network::accept_loop(
        listener,
        clients.clone(),
        inbound_tx,
    ));
    tokio::spawn(network::ping_loop(clients.clone(), config.ping_interval));

    let game = Game::new(config.game.clone());
    tick_loop(game, clients, inbound_rx).await;
    Ok(())
}

/// The fixed-rate tick loop.
///
/// Each iteration: drain the inbound queue (the single serialization
/// point for commands), advance the simulation, deliver targeted notices,
/// then broadcast the post-tick snapshot so no client ever sees a partial
/// tick.
async fn tick_loop(
    mut game: Game,
    clients: Clients,
    mut inbound: mpsc::UnboundedReceiver<InboundEvent>,
) {
    let tick_rate = game.config().tick_rate;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(tick_rate)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_tick = Instant::now();
    loop {
        interval.tick().await;
        let now = Instant::now();
        let delta_time = (now - last_tick).as_secs_f32();
        last_tick = now;

        while let Ok(event) = inbound.try_recv() {
            handle_event(&mut game, &clients, event).await;
        }

        let notifications = game.update(delta_time);
        deliver(&clients, notifications).await;

        broadcast(&clients, &ServerMessage::GameUpdate(game.state())).await;
    }
}

async fn handle_event(game: &mut Game, clients: &Clients, event: InboundEvent) {
    match event {
        InboundEvent::Connected(client_id) => {
            send_to(
                clients,
                client_id,
                &ServerMessage::Connection {
                    client_id,
                    stats: stats_of(game),
                },
            )
            .await;
        }
        InboundEvent::Message(client_id, ClientMessage::JoinGame { player_name, kingdom_name }) => {
            game.add_player(client_id, player_name, kingdom_name.as_deref());

            send_to(clients, client_id, &ServerMessage::GameState(game.state())).await;

            if let Some(player) = game.player_view(client_id) {
                let stats = stats_of(game);
                broadcast(
                    clients,
                    &ServerMessage::PlayerJoined {
                        player,
                        online_players: stats.online_players,
                        kingdoms: stats.kingdoms,
                    },
                )
                .await;
            }
        }
        InboundEvent::Message(client_id, ClientMessage::Command(command)) => {
            let notifications = game.handle_command(client_id, command);
            deliver(clients, notifications).await;
        }
        InboundEvent::Disconnected(client_id) => {
            game.remove_player(client_id);
        }
    }
}

async fn deliver(clients: &Clients, notifications: Vec<Notification>) {
    for notification in notifications {
        send_to(clients, notification.player, &notification.notice).await;
    }
}

fn stats_of(game: &Game) -> ServerStats {
    ServerStats {
        online_players: game.online_players(),
        kingdoms: game.kingdom_count(),
    }
}
