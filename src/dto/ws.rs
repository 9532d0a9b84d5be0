use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::color::ratio::RatioMode;

/// Events pushed to subscribed UI clients over the `/ws` stream.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The pipeline link went up or down.
    PipelineAvailability {
        /// True while the pipeline is unreachable.
        degraded: bool,
    },
    /// Progress of a long-running pipeline job (e.g. color extraction).
    PipelineProgress {
        /// Job identifier.
        job_id: String,
        /// Human-readable stage name.
        stage: String,
        /// Completion percentage.
        percent: u8,
    },
    /// The palette changed; clients should refetch the snapshot.
    PaletteUpdated {
        /// Number of colors after the change.
        color_count: usize,
        /// Ratio mode after the change.
        mode: RatioMode,
    },
}

/// Messages accepted from UI WebSocket clients.
///
/// The stream is server-push; inbound traffic is limited to an optional
/// subscribe marker and anything unknown is ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientInboundMessage {
    /// Explicit subscription marker sent by some clients on connect.
    Subscribe,
    /// Any other message.
    #[serde(other)]
    Unknown,
}
