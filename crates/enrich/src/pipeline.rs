use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use kalam_reconciler::Utterance;
use kalam_stt_interface::{EnrichmentMode, SessionConfig};
use tokio::sync::mpsc;

use crate::translator::{TranslateOutcome, TranslateRequest, Translator};

/// Logical target of one enrichment call: the live interim preview under a
/// specific preview generation, or one specific committed utterance.
///
/// The generation is bumped by the owner whenever the preview is cleared
/// (commit, teardown), so a result spawned against an earlier preview is
/// recognizably stale when it comes back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Interim(u64),
    Utterance(String),
}

/// A planned enrichment call, fully resolved before it is spawned.
///
/// The two modes are explicit variants of the session config, not one call
/// shape with overloaded argument meanings:
/// - `Native`: the recognizer's translation is trusted; ask only for
///   phonetics of the secondary-language side.
/// - `Contextual`: retranslate the source text into the other configured
///   language, dialect-aware, replacing the native translation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentJob {
    pub slot: Slot,
    pub mode: EnrichmentMode,
    pub request: TranslateRequest,
}

impl EnrichmentJob {
    /// Plan the enrichment call for a committed utterance. Returns `None`
    /// when there is nothing to enrich.
    pub fn for_utterance(utterance: &Utterance, config: &SessionConfig) -> Option<Self> {
        let slot = Slot::Utterance(utterance.id.clone());

        match config.enrichment_mode {
            EnrichmentMode::Native => {
                let secondary_side = if utterance.detected_language == config.primary_language {
                    &utterance.target_text
                } else {
                    &utterance.source_text
                };
                if secondary_side.is_empty() {
                    return None;
                }
                Some(Self {
                    slot,
                    mode: EnrichmentMode::Native,
                    request: TranslateRequest {
                        text: secondary_side.clone(),
                        source_lang: config.secondary_language.clone(),
                        target_lang: config.secondary_language.clone(),
                        style: config.phonetic_style,
                        contextual: false,
                    },
                })
            }
            EnrichmentMode::Contextual => {
                if utterance.source_text.is_empty() {
                    return None;
                }
                Some(Self {
                    slot,
                    mode: EnrichmentMode::Contextual,
                    request: TranslateRequest {
                        text: utterance.source_text.clone(),
                        source_lang: utterance.detected_language.clone(),
                        target_lang: config
                            .other_language(&utterance.detected_language)
                            .to_string(),
                        style: config.phonetic_style,
                        contextual: true,
                    },
                })
            }
        }
    }

    /// Plan a best-effort call for the live interim preview. The result only
    /// ever overwrites the preview field, never a committed utterance.
    pub fn for_interim(
        text: &str,
        detected_language: Option<&str>,
        config: &SessionConfig,
        generation: u64,
    ) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        let source = detected_language.unwrap_or(&config.primary_language);
        Some(Self {
            slot: Slot::Interim(generation),
            mode: config.enrichment_mode,
            request: TranslateRequest {
                text: text.to_string(),
                source_lang: source.to_string(),
                target_lang: config.other_language(source).to_string(),
                style: config.phonetic_style,
                contextual: config.enrichment_mode == EnrichmentMode::Contextual,
            },
        })
    }
}

/// A completed enrichment result on its way back to the session loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentPatch {
    pub slot: Slot,
    pub mode: EnrichmentMode,
    pub outcome: TranslateOutcome,
}

/// Spawns enrichment calls as independent fire-and-forget tasks.
///
/// At most one call is in flight per slot: a request arriving while one is
/// running for the same slot is dropped, not queued. Failures are logged and
/// produce no patch, leaving whatever is displayed untouched.
pub struct EnrichmentPipeline {
    translator: Arc<dyn Translator>,
    inflight: Arc<Mutex<HashSet<Slot>>>,
}

impl EnrichmentPipeline {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            inflight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn spawn(&self, job: EnrichmentJob, patches: mpsc::UnboundedSender<EnrichmentPatch>) {
        {
            let mut inflight = self.inflight.lock().unwrap();
            if !inflight.insert(job.slot.clone()) {
                tracing::debug!(slot = ?job.slot, "enrichment_inflight_dropped");
                return;
            }
        }

        let translator = self.translator.clone();
        let inflight = self.inflight.clone();
        let EnrichmentJob {
            slot,
            mode,
            request,
        } = job;

        tokio::spawn(async move {
            let result = translator.translate(request).await;
            inflight.lock().unwrap().remove(&slot);

            match result {
                Ok(outcome) => {
                    // Receiver may be gone after session stop; abandoning the
                    // result is fine.
                    let _ = patches.send(EnrichmentPatch {
                        slot,
                        mode,
                        outcome,
                    });
                }
                Err(error) => {
                    tracing::warn!(%error, slot = ?slot, "enrichment_failed");
                }
            }
        });
    }
}
