//! WebSocket plumbing.
//!
//! One task per client connection. Inbound messages from every client are
//! funneled into a single unbounded channel that the tick loop drains once
//! per tick - the single serialization point between the network and the
//! simulation. Outbound traffic goes through one unbounded sender per
//! client so the tick loop never blocks on a slow socket.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use uuid::Uuid;

use kingdoms_core::player::PlayerId;

use crate::protocol::ClientMessage;

/// Shared registry of connected clients and their outbound senders.
pub type Clients = Arc<Mutex<HashMap<PlayerId, mpsc::UnboundedSender<Message>>>>;

/// An inbound event for the tick loop.
#[derive(Debug)]
pub enum InboundEvent {
    /// A socket connected and was assigned a session id.
    Connected(PlayerId),
    /// A parsed message from a client.
    Message(PlayerId, ClientMessage),
    /// A socket closed.
    Disconnected(PlayerId),
}

/// Accept connections forever, spawning one handler task per client.
pub async fn accept_loop(
    listener: TcpListener,
    clients: Clients,
    inbound: mpsc::UnboundedSender<InboundEvent>,
) {
    while let Ok((stream, addr)) = listener.accept().await {
        tracing::debug!(%addr, "New connection");
        tokio::spawn(handle_client(stream, clients.clone(), inbound.clone()));
    }
}

/// Drive one client connection until it closes.
async fn handle_client(
    stream: TcpStream,
    clients: Clients,
    inbound: mpsc::UnboundedSender<InboundEvent>,
) {
    let websocket = match accept_async(stream).await {
        Ok(websocket) => websocket,
        Err(error) => {
            tracing::warn!(%error, "WebSocket handshake failed");
            return;
        }
    };

    let client_id = Uuid::new_v4();
    let (mut sink, mut source) = websocket.split();
    let (sender, mut outbound) = mpsc::unbounded_channel::<Message>();

    clients.lock().await.insert(client_id, sender);
    let _ = inbound.send(InboundEvent::Connected(client_id));
    tracing::info!(%client_id, "Client connected");

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = source.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(parsed) => {
                    let _ = inbound.send(InboundEvent::Message(client_id, parsed));
                }
                Err(error) => {
                    tracing::warn!(%client_id, %error, "Malformed client message");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(%client_id, %error, "Socket error");
                break;
            }
        }
    }

    clients.lock().await.remove(&client_id);
    let _ = inbound.send(InboundEvent::Disconnected(client_id));
    writer.abort();
    tracing::info!(%client_id, "Client disconnected");
}

/// Send a payload to one client, serialized as JSON.
pub async fn send_to(clients: &Clients, player: PlayerId, payload: &impl Serialize) {
    let Ok(text) = serde_json::to_string(payload) else {
        return;
    };
    if let Some(sender) = clients.lock().await.get(&player) {
        let _ = sender.send(Message::Text(text));
    }
}

/// Send a payload to every connected client, serialized once.
pub async fn broadcast(clients: &Clients, payload: &impl Serialize) {
    let Ok(text) = serde_json::to_string(payload) else {
        return;
    };
    let clients = clients.lock().await;
    for sender in clients.values() {
        let _ = sender.send(Message::Text(text.clone()));
    }
}

/// Keep connections alive with periodic pings.
pub async fn ping_loop(clients: Clients, interval_secs: u64) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        let clients = clients.lock().await;
        for sender in clients.values() {
            let _ = sender.send(Message::Ping(Vec::new()));
        }
    }
}
