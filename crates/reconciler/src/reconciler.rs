//! # Dual-Buffer Reconciler
//!
//! Converts the ordered token stream of one session into interim previews and
//! committed utterances, splitting primary- and secondary-language material
//! even when both arrive interleaved in one stream (a recognizer emitting a
//! live translation alongside the source transcription does exactly that).
//!
//! Attribution is utterance-granular: the language and speaker of the first
//! tagged token are latched for the whole utterance and later contradicting
//! tags are ignored, until the boundary resets them.

use kalam_stt_interface::{SessionConfig, Token};

use crate::types::{FinalEvent, InterimEvent, ReconcilerEvent};

/// Mutable per-utterance state. All fields reset together on every boundary;
/// there is never more than one utterance in flight because tokens arrive
/// strictly ordered.
#[derive(Debug, Default)]
struct ReconcilerState {
    /// Finalized text per configured language slot.
    buffer_primary: String,
    buffer_secondary: String,
    /// Transient interim window, rebuilt on every recognizer frame. Never
    /// part of the committed buffers.
    interim_primary: String,
    interim_secondary: String,
    /// First-detected language wins for the whole utterance, even when later
    /// tokens are tagged differently. Mid-utterance code-switching is
    /// therefore mis-attributed; a known accuracy limitation, kept as-is.
    sticky_language: Option<String>,
    sticky_speaker: Option<String>,
}

impl ReconcilerState {
    fn reset(&mut self) {
        self.buffer_primary.clear();
        self.buffer_secondary.clear();
        self.interim_primary.clear();
        self.interim_secondary.clear();
        self.sticky_language = None;
        self.sticky_speaker = None;
    }
}

/// Single-writer state machine for one active session.
///
/// Feed recognizer frames via [`Reconciler::push_frame`]; each call returns
/// at most one [`InterimEvent`] followed by at most one [`FinalEvent`].
/// [`Reconciler::push`] is the one-token-frame convenience used by callers
/// that deal in individual tokens.
pub struct Reconciler {
    primary_language: String,
    secondary_language: String,
    diarization_enabled: bool,
    state: ReconcilerState,
}

impl Reconciler {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            primary_language: config.primary_language.clone(),
            secondary_language: config.secondary_language.clone(),
            diarization_enabled: config.diarization_enabled,
            state: ReconcilerState::default(),
        }
    }

    /// Process one recognizer frame: every newly finalized token plus the
    /// complete current interim window, in stream order.
    ///
    /// The interim window is rebuilt from scratch each frame (interim text is
    /// revisable by definition), while final text accumulates across frames.
    pub fn push_frame(&mut self, tokens: &[Token]) -> Vec<ReconcilerEvent> {
        self.state.interim_primary.clear();
        self.state.interim_secondary.clear();

        let mut utterance_complete = false;
        for token in tokens {
            self.apply(token, &mut utterance_complete);
        }

        let mut events = Vec::new();

        let primary_preview = format!(
            "{}{}",
            self.state.buffer_primary, self.state.interim_primary
        )
        .trim()
        .to_string();
        let secondary_preview = format!(
            "{}{}",
            self.state.buffer_secondary, self.state.interim_secondary
        )
        .trim()
        .to_string();

        if !primary_preview.is_empty() || !secondary_preview.is_empty() {
            events.push(ReconcilerEvent::Interim(InterimEvent {
                primary_preview,
                secondary_preview,
                detected_language: self.state.sticky_language.clone(),
            }));
        }

        if utterance_complete {
            if let Some(event) = self.commit() {
                events.push(ReconcilerEvent::Final(event));
            }
            self.state.reset();
        }

        events
    }

    /// Process a single token. Equivalent to a one-token frame.
    pub fn push(&mut self, token: &Token) -> Vec<ReconcilerEvent> {
        self.push_frame(std::slice::from_ref(token))
    }

    /// Clear all state so a restarted session begins from empty. Any text
    /// accumulated without a terminating boundary is discarded.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    fn apply(&mut self, token: &Token, utterance_complete: &mut bool) {
        if self.state.sticky_language.is_none()
            && let Some(language) = &token.language
        {
            self.state.sticky_language = Some(language.clone());
        }

        if self.diarization_enabled
            && self.state.sticky_speaker.is_none()
            && let Some(speaker) = &token.speaker
        {
            self.state.sticky_speaker = Some(speaker.clone());
        }

        if token.is_boundary {
            *utterance_complete = true;
            return;
        }

        // No tag means "assume primary", never "drop". Tokens matching
        // neither configured language are dropped; tokens carry their own
        // spacing, so concatenation inserts nothing.
        let language = token.language.as_deref().unwrap_or(&self.primary_language);

        let slot = if language == self.primary_language {
            if token.is_final {
                &mut self.state.buffer_primary
            } else {
                &mut self.state.interim_primary
            }
        } else if language == self.secondary_language {
            if token.is_final {
                &mut self.state.buffer_secondary
            } else {
                &mut self.state.interim_secondary
            }
        } else {
            return;
        };
        slot.push_str(&token.text);
    }

    fn commit(&self) -> Option<FinalEvent> {
        let primary_final = self.state.buffer_primary.trim();
        let secondary_final = self.state.buffer_secondary.trim();

        // Stray boundary with nothing accumulated: discard silently.
        if primary_final.is_empty() && secondary_final.is_empty() {
            return None;
        }

        Some(FinalEvent {
            primary_final: primary_final.to_string(),
            secondary_final: secondary_final.to_string(),
            detected_language: self
                .state
                .sticky_language
                .clone()
                .unwrap_or_else(|| self.primary_language.clone()),
            speaker: self.state.sticky_speaker.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en_ar() -> Reconciler {
        Reconciler::new(&SessionConfig::new("en", "ar"))
    }

    fn en_ar_diarized() -> Reconciler {
        let mut config = SessionConfig::new("en", "ar");
        config.diarization_enabled = true;
        Reconciler::new(&config)
    }

    fn finals(events: &[ReconcilerEvent]) -> Vec<&FinalEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                ReconcilerEvent::Final(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    fn interims(events: &[ReconcilerEvent]) -> Vec<&InterimEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                ReconcilerEvent::Interim(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn final_token_then_boundary_commits() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("Hello", Some("en")));
        let events = rec.push(&Token::boundary());

        let committed = finals(&events);
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].primary_final, "Hello");
        assert_eq!(committed[0].secondary_final, "");
        assert_eq!(committed[0].detected_language, "en");
    }

    #[test]
    fn bilingual_stream_splits_per_language() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("Hello", Some("en")));
        rec.push(&Token::final_text("مرحبا", Some("ar")));
        let events = rec.push(&Token::boundary());

        let committed = finals(&events);
        assert_eq!(committed[0].primary_final, "Hello");
        assert_eq!(committed[0].secondary_final, "مرحبا");
        assert_eq!(committed[0].detected_language, "en");
    }

    #[test]
    fn first_tagged_language_is_sticky() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("x", Some("ar")));
        rec.push(&Token::final_text("y", Some("en")));
        let events = rec.push(&Token::boundary());

        assert_eq!(finals(&events)[0].detected_language, "ar");
    }

    #[test]
    fn untagged_tokens_route_to_primary() {
        for primary in ["en", "ar", "fr"] {
            let mut rec = Reconciler::new(&SessionConfig::new(primary, "de"));
            rec.push(&Token::final_text("hola", None));
            let events = rec.push(&Token::boundary());
            assert_eq!(
                finals(&events)[0].primary_final,
                "hola",
                "untagged text must land in the primary buffer (primary={primary})"
            );
            assert_eq!(finals(&events)[0].detected_language, primary);
        }
    }

    #[test]
    fn unconfigured_language_is_dropped() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("bonjour", Some("fr")));
        rec.push(&Token::final_text("Hello", Some("en")));
        let events = rec.push(&Token::boundary());

        let committed = finals(&events);
        assert_eq!(committed[0].primary_final, "Hello");
        assert_eq!(committed[0].secondary_final, "");
        // The dropped token still latched the sticky language.
        assert_eq!(committed[0].detected_language, "fr");
    }

    #[test]
    fn boundary_resets_all_state() {
        let mut rec = en_ar_diarized();

        rec.push(&Token::final_text("Hello", Some("en")).with_speaker("1"));
        rec.push(&Token::boundary());

        // Next utterance starts from scratch: new language, new speaker.
        rec.push(&Token::final_text("مرحبا", Some("ar")).with_speaker("2"));
        let events = rec.push(&Token::boundary());

        let committed = finals(&events);
        assert_eq!(committed[0].primary_final, "");
        assert_eq!(committed[0].secondary_final, "مرحبا");
        assert_eq!(committed[0].detected_language, "ar");
        assert_eq!(committed[0].speaker.as_deref(), Some("2"));
    }

    #[test]
    fn empty_boundary_commits_nothing() {
        let mut rec = en_ar();
        assert!(rec.push(&Token::boundary()).is_empty());
        assert!(rec.push(&Token::boundary()).is_empty());
    }

    #[test]
    fn interim_tokens_preview_without_committing() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("Hello ", Some("en")));
        let events = rec.push(&Token::interim("wor", Some("en")));

        let previews = interims(&events);
        assert_eq!(previews[0].primary_preview, "Hello wor");

        // The interim window is rebuilt per frame; revision replaces it.
        let events = rec.push(&Token::interim("world", Some("en")));
        assert_eq!(interims(&events)[0].primary_preview, "Hello world");

        // Only the finalized text survives the boundary.
        let events = rec.push(&Token::boundary());
        assert_eq!(finals(&events)[0].primary_final, "Hello");
    }

    #[test]
    fn interim_event_skipped_when_both_previews_empty() {
        let mut rec = en_ar();
        let events = rec.push(&Token::interim("   ", Some("en")));
        assert!(events.is_empty());
    }

    #[test]
    fn boundary_frame_emits_interim_then_final() {
        let mut rec = en_ar();

        let events = rec.push_frame(&[
            Token::final_text("Hello", Some("en")),
            Token::boundary(),
        ]);

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ReconcilerEvent::Interim(_)));
        assert!(matches!(events[1], ReconcilerEvent::Final(_)));
    }

    #[test]
    fn speaker_latched_only_with_diarization() {
        let mut rec = en_ar();
        rec.push(&Token::final_text("Hello", Some("en")).with_speaker("1"));
        let events = rec.push(&Token::boundary());
        assert_eq!(finals(&events)[0].speaker, None);

        let mut rec = en_ar_diarized();
        rec.push(&Token::final_text("Hello", Some("en")).with_speaker("1"));
        rec.push(&Token::final_text(" there", Some("en")).with_speaker("2"));
        let events = rec.push(&Token::boundary());
        assert_eq!(finals(&events)[0].speaker.as_deref(), Some("1"));
    }

    #[test]
    fn tokens_concatenate_without_inserted_whitespace() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("Hel", Some("en")));
        rec.push(&Token::final_text("lo", Some("en")));
        rec.push(&Token::final_text(" world", Some("en")));
        let events = rec.push(&Token::boundary());

        assert_eq!(finals(&events)[0].primary_final, "Hello world");
    }

    #[test]
    fn reset_discards_uncommitted_tail() {
        let mut rec = en_ar();

        rec.push(&Token::final_text("dangling", Some("en")));
        rec.reset();

        assert!(rec.push(&Token::boundary()).is_empty());
    }
}
