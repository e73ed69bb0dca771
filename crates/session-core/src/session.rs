use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use kalam_enrich::{
    EnrichmentJob, EnrichmentPatch, EnrichmentPipeline, InterimThrottle, Slot, Translator,
};
use kalam_reconciler::{
    Conversation, Enrichment, FinalEvent, InterimEvent, Reconciler, ReconcilerEvent, UuidIdGen,
    dispatch,
};
use kalam_stt_interface::{LiveMessage, SessionConfig};

use crate::events::SessionEvent;

#[derive(Debug, Clone)]
pub struct SessionParams {
    pub session_id: String,
    pub config: SessionConfig,
}

impl SessionParams {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            config,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token source failed mid-session. Reconnection is the caller's
    /// concern; the reconciler state has already been reset.
    #[error("token stream error {code}: {message}")]
    Stream { code: i32, message: String },
    #[error("session task panicked")]
    Task,
}

/// Enrichment state of the live interim preview.
///
/// The generation stamps every spawned preview call; clearing the preview
/// bumps it, so a result that raced past a commit comes back under a stale
/// generation and is dropped instead of repainting the cleared preview.
struct PreviewState {
    throttle: InterimThrottle,
    detected_language: Option<String>,
    generation: u64,
}

impl PreviewState {
    fn new(throttle: InterimThrottle) -> Self {
        Self {
            throttle,
            detected_language: None,
            generation: 0,
        }
    }

    fn clear(&mut self) {
        self.throttle.clear();
        self.detected_language = None;
        self.generation += 1;
    }
}

/// Drive one recording session to completion.
///
/// Single sequential consumer: all reconciliation state is owned here and
/// mutated only on this path. Enrichment runs as independent spawned tasks
/// whose results come back over an internal patch channel and are applied by
/// utterance id, whenever they arrive. Cancellation stops token consumption
/// and drops the pending throttle timer; in-flight enrichment is abandoned,
/// never joined.
pub async fn run_session<S>(
    params: SessionParams,
    mut messages: S,
    translator: Arc<dyn Translator>,
    events: mpsc::UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) -> Result<Conversation, SessionError>
where
    S: Stream<Item = LiveMessage> + Unpin,
{
    let SessionParams { session_id, config } = params;

    let mut reconciler = Reconciler::new(&config);
    let mut conversation = Conversation::new();
    let mut ids = UuidIdGen;
    let pipeline = EnrichmentPipeline::new(translator);
    let (patch_tx, mut patch_rx) = mpsc::unbounded_channel::<EnrichmentPatch>();
    let mut preview =
        PreviewState::new(InterimThrottle::new(config.throttle.clone(), Instant::now()));

    let _ = events.send(SessionEvent::Started {
        session_id: session_id.clone(),
    });
    tracing::info!(%session_id, "session_started");

    loop {
        let trailing = preview.throttle.trailing_deadline();

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(%session_id, "session_cancelled");
                break;
            }

            patch = patch_rx.recv() => {
                // The loop keeps a sender alive, so this arm never yields None.
                if let Some(patch) = patch {
                    apply_patch(patch, &mut conversation, preview.generation, &session_id, &events);
                }
            }

            _ = tokio::time::sleep_until(trailing.unwrap_or_else(Instant::now)), if trailing.is_some() => {
                if let Some(text) = preview.throttle.on_settle(Instant::now())
                    && let Some(job) = EnrichmentJob::for_interim(
                        &text,
                        preview.detected_language.as_deref(),
                        &config,
                        preview.generation,
                    )
                {
                    pipeline.spawn(job, patch_tx.clone());
                }
            }

            message = messages.next() => match message {
                None | Some(LiveMessage::Finished) => {
                    tracing::info!(%session_id, "token_stream_closed");
                    break;
                }
                Some(LiveMessage::Error { code, message }) => {
                    tracing::error!(%session_id, code, %message, "token_stream_failed");
                    let _ = events.send(SessionEvent::Failed {
                        session_id: session_id.clone(),
                        error: message.clone(),
                    });
                    reconciler.reset();
                    return Err(SessionError::Stream { code, message });
                }
                Some(LiveMessage::Tokens(tokens)) => {
                    for event in reconciler.push_frame(&tokens) {
                        match event {
                            ReconcilerEvent::Interim(interim) => handle_interim(
                                interim, &config, &session_id, &events,
                                &mut preview, &pipeline, &patch_tx,
                            ),
                            ReconcilerEvent::Final(fin) => handle_final(
                                fin, &config, &session_id, &events, &mut ids,
                                &mut conversation, &mut preview, &pipeline, &patch_tx,
                            ),
                        }
                    }
                }
            }
        }
    }

    // Teardown leaves a clean slate: a restarted session begins from empty.
    reconciler.reset();
    preview.clear();

    Ok(conversation)
}

fn handle_interim(
    interim: InterimEvent,
    config: &SessionConfig,
    session_id: &str,
    events: &mpsc::UnboundedSender<SessionEvent>,
    preview: &mut PreviewState,
    pipeline: &EnrichmentPipeline,
    patch_tx: &mpsc::UnboundedSender<EnrichmentPatch>,
) {
    let _ = events.send(SessionEvent::Interim {
        session_id: session_id.to_string(),
        interim: interim.clone(),
    });

    if !config.interim_enrichment_enabled {
        return;
    }

    // Enrich the speaker's side of the preview. The detected language is
    // remembered so a deferred trailing call translates in the same
    // direction as the leading one.
    preview.detected_language = interim.detected_language.clone();
    let detected = interim.detected_language.as_deref();
    let text = if detected == Some(config.secondary_language.as_str()) {
        &interim.secondary_preview
    } else {
        &interim.primary_preview
    };

    if let Some(text) = preview.throttle.on_text(text, Instant::now())
        && let Some(job) = EnrichmentJob::for_interim(&text, detected, config, preview.generation)
    {
        pipeline.spawn(job, patch_tx.clone());
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_final(
    fin: FinalEvent,
    config: &SessionConfig,
    session_id: &str,
    events: &mpsc::UnboundedSender<SessionEvent>,
    ids: &mut UuidIdGen,
    conversation: &mut Conversation,
    preview: &mut PreviewState,
    pipeline: &EnrichmentPipeline,
    patch_tx: &mpsc::UnboundedSender<EnrichmentPatch>,
) {
    // The committed utterance supersedes the live preview and any enrichment
    // still pending for it; bumping the generation invalidates in-flight
    // preview calls.
    preview.clear();
    let _ = events.send(SessionEvent::PreviewCleared {
        session_id: session_id.to_string(),
    });

    let utterance = dispatch(fin, config, ids);
    tracing::debug!(%session_id, utterance_id = %utterance.id, "utterance_committed");

    let job = EnrichmentJob::for_utterance(&utterance, config);
    conversation.append(utterance.clone());

    let _ = events.send(SessionEvent::Committed {
        session_id: session_id.to_string(),
        utterance,
    });

    if let Some(job) = job {
        pipeline.spawn(job, patch_tx.clone());
    }
}

fn apply_patch(
    patch: EnrichmentPatch,
    conversation: &mut Conversation,
    preview_generation: u64,
    session_id: &str,
    events: &mpsc::UnboundedSender<SessionEvent>,
) {
    match patch.slot {
        Slot::Interim(generation) => {
            // A result spawned before the preview was cleared must not
            // repaint it.
            if generation != preview_generation {
                tracing::debug!(%session_id, "stale_preview_translation_dropped");
                return;
            }
            let _ = events.send(SessionEvent::PreviewTranslated {
                session_id: session_id.to_string(),
                outcome: patch.outcome,
            });
        }
        Slot::Utterance(utterance_id) => {
            let enrichment = Enrichment {
                translation: patch.outcome.translation,
                phonetic: patch.outcome.phonetic,
            };
            if !conversation.patch_enrichment(&utterance_id, enrichment, patch.mode) {
                // Stale result for a reset or already-enriched utterance.
                tracing::debug!(%session_id, %utterance_id, "enrichment_patch_ignored");
                return;
            }

            // Emit the value as applied (native mode keeps the recognizer's
            // translation), not the raw backend outcome.
            if let Some(applied) = conversation
                .get(&utterance_id)
                .and_then(|u| u.enrichment.clone())
            {
                let _ = events.send(SessionEvent::Enriched {
                    session_id: session_id.to_string(),
                    utterance_id,
                    enrichment: applied,
                });
            }
        }
    }
}

/// Running session plus the handles to observe and stop it.
pub struct SessionHandle {
    pub session_id: String,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    cancel: CancellationToken,
    join: tokio::task::JoinHandle<Result<Conversation, SessionError>>,
}

impl SessionHandle {
    /// Request shutdown. Returns immediately; consume [`SessionHandle::finished`]
    /// for the conversation snapshot.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub async fn finished(self) -> Result<Conversation, SessionError> {
        self.join.await.map_err(|_| SessionError::Task)?
    }
}

/// Spawn a session onto the runtime and hand back its control surface.
pub fn spawn_session<S>(
    params: SessionParams,
    messages: S,
    translator: Arc<dyn Translator>,
) -> SessionHandle
where
    S: Stream<Item = LiveMessage> + Unpin + Send + 'static,
{
    let session_id = params.session_id.clone();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();

    let join = tokio::spawn(run_session(
        params,
        messages,
        translator,
        event_tx,
        cancel.clone(),
    ));

    SessionHandle {
        session_id,
        events: event_rx,
        cancel,
        join,
    }
}
