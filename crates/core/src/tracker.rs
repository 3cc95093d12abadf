//! In-memory lifecycle tracking for 3D model generation per
//! (creation, component) pair.
//!
//! The tracker is a plain store object: callers hold it (behind whatever
//! lock their runtime needs) and mutate it only through the `mark_*`,
//! `hydrate_from_model` and `reset_for_creation` operations. Every
//! transition copies the previous entry, patches it, bumps `version` and
//! stamps `updated_at`.
//!
//! A preview artifact computed locally is authoritative: once installed via
//! [`GenerationTracker::mark_preview_ready`] it is never replaced by
//! server-origin data until the creation is reset.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::job::JobStatus;
use crate::types::Timestamp;

/// Message recorded when a polled remote job reports failure.
pub const REMOTE_FAILURE_MESSAGE: &str = "Remote generation failed";

/// Phase of the generation for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationState {
    #[default]
    Idle,
    AwaitingJob,
    ScadAvailable,
    Compiling,
    PreviewReady,
    Error,
}

/// Where a preview artifact came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactOrigin {
    #[default]
    Server,
    Computed,
}

/// Rendered preview, carried as an encoded string (URL or base64 mesh).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewArtifact {
    pub payload: String,
    pub origin: ArtifactOrigin,
}

/// Display-only information about a compiled model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Geometry complexity, e.g. facet count.
    #[serde(default)]
    pub complexity: u64,
}

/// Tracked state of one (creation, component) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEntry {
    pub state: GenerationState,
    pub source_code: Option<String>,
    pub preview_artifact: Option<PreviewArtifact>,
    pub diagnostics: Option<Diagnostics>,
    pub error: Option<String>,
    pub version: u64,
    pub updated_at: Timestamp,
}

impl GenerationEntry {
    fn idle(now: Timestamp) -> Self {
        Self {
            state: GenerationState::Idle,
            source_code: None,
            preview_artifact: None,
            diagnostics: None,
            error: None,
            version: 0,
            updated_at: now,
        }
    }

    /// Whether a locally computed preview is cached.
    pub fn has_computed_preview(&self) -> bool {
        self.preview_artifact
            .as_ref()
            .is_some_and(|a| a.origin == ArtifactOrigin::Computed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GenerationKey {
    creation_id: String,
    component_id: String,
}

impl GenerationKey {
    fn new(creation_id: &str, component_id: &str) -> Self {
        Self {
            creation_id: creation_id.to_string(),
            component_id: component_id.to_string(),
        }
    }
}

impl fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.creation_id, self.component_id)
    }
}

/// New CAD source, optionally with a server-rendered preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScadUpdate {
    pub source_code: Option<String>,
    pub preview_artifact: Option<String>,
    /// Defaults to [`ArtifactOrigin::Server`]. `computed` is not accepted
    /// here and is recorded as `server`.
    pub origin: Option<ArtifactOrigin>,
    pub diagnostics: Option<Diagnostics>,
}

/// A snapshot polled from a remote job or stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSnapshot {
    pub source_code: Option<String>,
    pub preview_artifact: Option<String>,
    pub external_status: Option<JobStatus>,
}

type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

/// Store of [`GenerationEntry`] values.
pub struct GenerationTracker {
    entries: HashMap<GenerationKey, GenerationEntry>,
    clock: Clock,
}

impl Default for GenerationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(chrono::Utc::now))
    }

    /// Use a custom time source (tests).
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: HashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only lookup.
    pub fn get_entry(&self, creation_id: &str, component_id: &str) -> Option<&GenerationEntry> {
        self.entries
            .get(&GenerationKey::new(creation_id, component_id))
    }

    /// All entries of one creation, sorted by component id.
    pub fn entries_for_creation(&self, creation_id: &str) -> Vec<(&str, &GenerationEntry)> {
        let mut out: Vec<_> = self
            .entries
            .iter()
            .filter(|(k, _)| k.creation_id == creation_id)
            .map(|(k, e)| (k.component_id.as_str(), e))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// A generation request was dispatched; nothing has come back yet.
    pub fn mark_awaiting_job(&mut self, creation_id: &str, component_id: &str) -> &GenerationEntry {
        self.transition(creation_id, component_id, "generation.awaiting_job", |e| {
            e.state = GenerationState::AwaitingJob;
            e.error = None;
        })
    }

    /// CAD source became available, possibly with a server preview.
    pub fn mark_scad_available(
        &mut self,
        creation_id: &str,
        component_id: &str,
        update: ScadUpdate,
    ) -> &GenerationEntry {
        if update.origin == Some(ArtifactOrigin::Computed) {
            tracing::debug!(
                creation_id,
                component_id,
                "Computed origin ignored for scad update; recording as server"
            );
        }

        self.transition(creation_id, component_id, "generation.scad_available", |e| {
            if let Some(source) = update.source_code {
                e.source_code = Some(source);
            }

            if e.has_computed_preview() {
                e.state = GenerationState::PreviewReady;
                e.error = None;
                return;
            }

            if let Some(diagnostics) = update.diagnostics {
                e.diagnostics = Some(diagnostics);
            }
            match update.preview_artifact {
                Some(payload) => {
                    e.preview_artifact = Some(PreviewArtifact {
                        payload,
                        origin: ArtifactOrigin::Server,
                    });
                    e.state = GenerationState::PreviewReady;
                    e.error = None;
                }
                None => e.state = GenerationState::ScadAvailable,
            }
        })
    }

    /// A local compile of the CAD source started.
    pub fn mark_compiling(&mut self, creation_id: &str, component_id: &str) -> &GenerationEntry {
        self.transition(creation_id, component_id, "generation.compiling", |e| {
            e.state = GenerationState::Compiling;
            e.error = None;
        })
    }

    /// Install a preview unconditionally. The only way to cache a
    /// `computed` artifact.
    pub fn mark_preview_ready(
        &mut self,
        creation_id: &str,
        component_id: &str,
        payload: String,
        origin: ArtifactOrigin,
        diagnostics: Option<Diagnostics>,
    ) -> &GenerationEntry {
        self.transition(creation_id, component_id, "generation.preview_ready", |e| {
            e.preview_artifact = Some(PreviewArtifact { payload, origin });
            if let Some(diagnostics) = diagnostics {
                e.diagnostics = Some(diagnostics);
            }
            e.state = GenerationState::PreviewReady;
            e.error = None;
        })
    }

    /// Record a failure. Any cached artifact is kept.
    pub fn mark_error(
        &mut self,
        creation_id: &str,
        component_id: &str,
        error: impl Into<String>,
    ) -> &GenerationEntry {
        let error = error.into();
        self.transition(creation_id, component_id, "generation.error", |e| {
            e.state = GenerationState::Error;
            e.error = Some(error);
        })
    }

    /// Reconcile a remote snapshot with local state. Remote data never
    /// replaces or downgrades a computed preview.
    pub fn hydrate_from_model(
        &mut self,
        creation_id: &str,
        component_id: &str,
        snapshot: RemoteSnapshot,
    ) -> &GenerationEntry {
        self.transition(creation_id, component_id, "generation.hydrate", |e| {
            let RemoteSnapshot {
                source_code,
                preview_artifact,
                external_status,
            } = snapshot;

            if e.has_computed_preview() {
                if let Some(source) = source_code {
                    e.source_code = Some(source);
                }
                return;
            }

            if external_status == Some(JobStatus::Failed) {
                if let Some(source) = source_code {
                    e.source_code = Some(source);
                }
                e.state = GenerationState::Error;
                e.error = Some(REMOTE_FAILURE_MESSAGE.to_string());
                return;
            }

            if let Some(payload) = preview_artifact {
                if let Some(source) = source_code {
                    e.source_code = Some(source);
                }
                e.preview_artifact = Some(PreviewArtifact {
                    payload,
                    origin: ArtifactOrigin::Server,
                });
                e.state = GenerationState::PreviewReady;
                e.error = None;
                return;
            }

            let in_flight = matches!(
                external_status,
                Some(JobStatus::Pending | JobStatus::Processing)
            );
            if let Some(source) = source_code {
                e.source_code = Some(source);
                if in_flight {
                    e.state = GenerationState::AwaitingJob;
                    e.error = None;
                } else {
                    e.state = GenerationState::ScadAvailable;
                }
            } else if in_flight {
                e.state = GenerationState::AwaitingJob;
                e.error = None;
            }
        })
    }

    /// Drop every entry of a discarded creation. Returns how many were
    /// removed.
    pub fn reset_for_creation(&mut self, creation_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, _| k.creation_id != creation_id);
        let removed = before - self.entries.len();
        tracing::info!(
            event = "generation.reset",
            creation_id,
            removed,
            "Generation entries reset"
        );
        removed
    }

    fn transition(
        &mut self,
        creation_id: &str,
        component_id: &str,
        event: &'static str,
        patch: impl FnOnce(&mut GenerationEntry),
    ) -> &GenerationEntry {
        let now = (self.clock)();
        let key = GenerationKey::new(creation_id, component_id);
        let previous = self.entries.get(&key);

        let mut next = previous
            .cloned()
            .unwrap_or_else(|| GenerationEntry::idle(now));
        patch(&mut next);
        next.version = previous.map_or(0, |p| p.version) + 1;
        next.updated_at = previous.map_or(now, |p| now.max(p.updated_at));

        tracing::debug!(
            event,
            key = %key,
            state = ?next.state,
            version = next.version,
            "Generation state transition"
        );

        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.insert(next);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(next),
        }
    }
}
