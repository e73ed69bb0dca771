use kalam_enrich::TranslateOutcome;
use kalam_reconciler::{Enrichment, InterimEvent, Utterance};

/// Everything the display layer needs to render a live session.
///
/// Events are fire-and-forget: the session never blocks on a slow or absent
/// consumer.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "sessionStarted")]
    Started { session_id: String },

    /// Rolling preview of the in-progress utterance.
    #[serde(rename = "transcriptInterim")]
    Interim {
        session_id: String,
        interim: InterimEvent,
    },

    /// An utterance was committed. Emitted synchronously on the boundary so
    /// the transcript renders without waiting for enrichment.
    #[serde(rename = "utteranceCommitted")]
    Committed {
        session_id: String,
        utterance: Utterance,
    },

    /// The asynchronous enrichment pass resolved for one utterance.
    #[serde(rename = "utteranceEnriched")]
    Enriched {
        session_id: String,
        utterance_id: String,
        enrichment: Enrichment,
    },

    /// Best-effort translation of the live interim preview.
    #[serde(rename = "previewTranslated")]
    PreviewTranslated {
        session_id: String,
        outcome: TranslateOutcome,
    },

    /// The interim preview (and its translation) is stale; clear it.
    #[serde(rename = "previewCleared")]
    PreviewCleared { session_id: String },

    #[serde(rename = "sessionFailed")]
    Failed { session_id: String, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tags() {
        let event = SessionEvent::PreviewCleared {
            session_id: "s1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "previewCleared");
        assert_eq!(json["session_id"], "s1");
    }
}
