pub mod link;
pub mod palette;

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use indexmap::IndexMap;
use tokio::sync::{RwLock, mpsc, watch};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    services::pipeline::PipelineClient,
    state::palette::{PaletteEditor, Preset},
};

pub use self::link::{LinkEvent, LinkState, PipelineLink};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push progress events to a connected UI client.
pub struct ClientConnection {
    /// Connection identifier.
    pub id: Uuid,
    /// Outbound message channel consumed by the socket's writer task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Central application state: the palette editor, preset store, pipeline
/// handle, and the registry of subscribed WebSocket clients.
pub struct AppState {
    config: AppConfig,
    editor: RwLock<PaletteEditor>,
    presets: RwLock<IndexMap<Uuid, Preset>>,
    pipeline: RwLock<Option<Arc<PipelineClient>>>,
    degraded: watch::Sender<bool>,
    clients: DashMap<Uuid, ClientConnection>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a pipeline client is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            editor: RwLock::new(PaletteEditor::new()),
            presets: RwLock::new(IndexMap::new()),
            pipeline: RwLock::new(None),
            degraded: degraded_tx,
            clients: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The palette editing session.
    pub fn editor(&self) -> &RwLock<PaletteEditor> {
        &self.editor
    }

    /// Saved presets, in insertion order.
    pub fn presets(&self) -> &RwLock<IndexMap<Uuid, Preset>> {
        &self.presets
    }

    /// Obtain a handle to the pipeline client, if one is installed.
    pub async fn pipeline(&self) -> Option<Arc<PipelineClient>> {
        let guard = self.pipeline.read().await;
        guard.as_ref().cloned()
    }

    /// Install a pipeline client and leave degraded mode.
    pub async fn install_pipeline(&self, client: Arc<PipelineClient>) {
        {
            let mut guard = self.pipeline.write().await;
            *guard = Some(client);
        }
        self.update_degraded(false);
    }

    /// Remove the current pipeline client and enter degraded mode.
    pub async fn clear_pipeline(&self) {
        {
            let mut guard = self.pipeline.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.pipeline.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Registry of subscribed UI sockets keyed by connection id.
    pub fn clients(&self) -> &DashMap<Uuid, ClientConnection> {
        &self.clients
    }

    /// Update and broadcast the degraded flag when the value changes.
    fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}
