//! WebSocket delivery of progress events to subscribed UI clients.
//!
//! The stream is server-push: clients connect, optionally send a subscribe
//! marker, and receive pipeline availability changes, pipeline job progress,
//! and palette change notifications.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    color::ratio::RatioMode,
    dto::ws::{ClientInboundMessage, ProgressEvent},
    state::{ClientConnection, SharedState},
};

/// Handle the full lifecycle of a UI progress WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let client_id = Uuid::new_v4();
    state.clients().insert(
        client_id,
        ClientConnection {
            id: client_id,
            tx: outbound_tx.clone(),
        },
    );

    info!(id = %client_id, "progress client connected");

    // Tell the new client where the pipeline link stands right away.
    let initial = ProgressEvent::PipelineAvailability {
        degraded: state.is_degraded().await,
    };
    if send_event_to_client(&outbound_tx, &initial).is_err() {
        state.clients().remove(&client_id);
        finalize(writer_task, outbound_tx).await;
        return;
    }

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientInboundMessage>(&text) {
                Ok(ClientInboundMessage::Subscribe) => {
                    debug!(id = %client_id, "client subscribed");
                }
                Ok(ClientInboundMessage::Unknown) => {
                    debug!(id = %client_id, "ignoring unknown client message");
                }
                Err(err) => {
                    warn!(id = %client_id, error = %err, "failed to parse client message");
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(id = %client_id, "client closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(id = %client_id, error = %err, "websocket error");
                break;
            }
        }
    }

    state.clients().remove(&client_id);
    info!(id = %client_id, "progress client disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Broadcast a progress event to every connected client, pruning connections
/// whose writer task has gone away.
pub fn broadcast(state: &SharedState, event: &ProgressEvent) {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize progress event");
            return;
        }
    };

    let mut stale = Vec::new();
    for entry in state.clients().iter() {
        if entry
            .tx
            .send(Message::Text(payload.clone().into()))
            .is_err()
        {
            stale.push(entry.id);
        }
    }

    for id in stale {
        state.clients().remove(&id);
        info!(id = %id, "removed stale progress client");
    }
}

/// Notify clients that the palette changed and a snapshot refetch is due.
pub fn broadcast_palette_updated(state: &SharedState, color_count: usize, mode: RatioMode) {
    broadcast(state, &ProgressEvent::PaletteUpdated { color_count, mode });
}

/// Spawn a task that mirrors degraded flag changes onto the progress stream.
pub fn spawn_availability_forwarder(state: SharedState) -> JoinHandle<()> {
    let mut watcher = state.degraded_watcher();
    tokio::spawn(async move {
        while watcher.changed().await.is_ok() {
            let degraded = *watcher.borrow_and_update();
            info!(degraded, "pipeline availability changed");
            broadcast(&state, &ProgressEvent::PipelineAvailability { degraded });
        }
    })
}

/// Serialize an event and push it onto a single client's writer channel.
fn send_event_to_client(
    tx: &mpsc::UnboundedSender<Message>,
    event: &ProgressEvent,
) -> Result<(), ()> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize progress event");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into())).map_err(|_| ())
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn register(state: &SharedState) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        state.clients().insert(id, ClientConnection { id, tx });
        (id, rx)
    }

    #[tokio::test]
    async fn broadcast_prunes_disconnected_clients() {
        let state = AppState::new(AppConfig::default());
        let (alive_id, mut alive_rx) = register(&state);
        let (dead_id, dead_rx) = register(&state);
        drop(dead_rx);

        broadcast(&state, &ProgressEvent::PipelineAvailability { degraded: true });

        assert!(state.clients().contains_key(&alive_id));
        assert!(!state.clients().contains_key(&dead_id));

        let message = alive_rx.recv().await.unwrap();
        match message {
            Message::Text(text) => assert!(text.contains("pipeline_availability")),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
