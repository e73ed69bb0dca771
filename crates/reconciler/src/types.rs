/// Rolling interim snapshot: committed buffer text plus the current interim
/// window for each language slot. Fire-and-forget to the display layer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterimEvent {
    pub primary_preview: String,
    pub secondary_preview: String,
    pub detected_language: Option<String>,
}

/// One completed utterance as seen by the reconciler, before dispatch decides
/// which side is source and which is target.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FinalEvent {
    pub primary_final: String,
    pub secondary_final: String,
    pub detected_language: String,
    pub speaker: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcilerEvent {
    Interim(InterimEvent),
    Final(FinalEvent),
}

/// Result of the asynchronous enrichment pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Enrichment {
    pub translation: String,
    pub phonetic: String,
}

/// A committed spoken turn. Immutable once created, except for the single
/// enrichment patch applied by id.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Utterance {
    pub id: String,
    /// What the speaker said, in the detected language.
    pub source_text: String,
    /// The counterpart-language text. Filled with whatever native translation
    /// the recognizer supplied; empty when none was requested.
    pub target_text: String,
    pub detected_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<Enrichment>,
    pub committed_unix_millis: u64,
}

pub(crate) fn unix_millis_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .min(u64::MAX as u128) as u64
}
