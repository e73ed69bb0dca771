use kalam_stt_interface::EnrichmentMode;

use crate::types::{Enrichment, Utterance, unix_millis_now};

/// Ordered, append-only transcript of one session.
///
/// Only the dispatcher appends and only enrichment callbacks patch, always by
/// stable utterance id — never by object identity or index arithmetic — so a
/// patch is safe to apply whenever it arrives, including after the session
/// has moved on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Conversation {
    pub id: String,
    pub started_unix_millis: u64,
    pub updated_unix_millis: u64,
    pub utterances: Vec<Utterance>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = unix_millis_now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_unix_millis: now,
            updated_unix_millis: now,
            utterances: Vec::new(),
        }
    }

    pub fn append(&mut self, utterance: Utterance) {
        self.updated_unix_millis = unix_millis_now();
        self.utterances.push(utterance);
    }

    /// Apply one enrichment result to the utterance with the given id.
    ///
    /// - `Native` mode trusts the recognizer's translation: `target_text`
    ///   stays untouched and only the phonetics are taken.
    /// - `Contextual` mode replaces `target_text` with the retranslation.
    ///
    /// Returns `false` (and changes nothing) for unknown ids and for
    /// utterances that were already enriched — each utterance is patched at
    /// most once, and a late or duplicate result never reverts a displayed
    /// value.
    pub fn patch_enrichment(
        &mut self,
        utterance_id: &str,
        enrichment: Enrichment,
        mode: EnrichmentMode,
    ) -> bool {
        let Some(utt) = self.utterances.iter_mut().find(|u| u.id == utterance_id) else {
            return false;
        };
        if utt.enrichment.is_some() {
            return false;
        }

        match mode {
            EnrichmentMode::Native => {
                utt.enrichment = Some(Enrichment {
                    translation: utt.target_text.clone(),
                    phonetic: enrichment.phonetic,
                });
            }
            EnrichmentMode::Contextual => {
                utt.target_text = enrichment.translation.clone();
                utt.enrichment = Some(enrichment);
            }
        }

        self.updated_unix_millis = unix_millis_now();
        true
    }

    pub fn get(&self, utterance_id: &str) -> Option<&Utterance> {
        self.utterances.iter().find(|u| u.id == utterance_id)
    }

    /// Short text used by history listings: the most recent source text.
    pub fn preview(&self) -> Option<&str> {
        self.utterances.last().map(|u| u.source_text.as_str())
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
