use kalam_stt_interface::SessionConfig;

use crate::types::{FinalEvent, Utterance, unix_millis_now};

/// Where utterance ids come from. Injected so tests can commit utterances
/// with predictable ids and assert on them later.
pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> String;
}

/// Random v4 ids; what sessions use.
#[derive(Debug, Default)]
pub struct UuidIdGen;

impl IdGenerator for UuidIdGen {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Turn a completed [`FinalEvent`] into a committed [`Utterance`].
///
/// Which buffer is "source" (what the speaker said) and which is "target"
/// (the counterpart language) follows from comparing the detected language
/// to the configured primary. Enrichment starts unset; the target side holds
/// whatever native translation the recognizer already produced, possibly
/// empty.
pub fn dispatch(
    event: FinalEvent,
    config: &SessionConfig,
    ids: &mut dyn IdGenerator,
) -> Utterance {
    let FinalEvent {
        primary_final,
        secondary_final,
        detected_language,
        speaker,
    } = event;

    let (source_text, target_text) = if detected_language == config.primary_language {
        (primary_final, secondary_final)
    } else {
        (secondary_final, primary_final)
    };

    Utterance {
        id: ids.next_id(),
        source_text,
        target_text,
        detected_language,
        speaker,
        enrichment: None,
        committed_unix_millis: unix_millis_now(),
    }
}
