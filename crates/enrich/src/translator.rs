pub use futures_util::future::BoxFuture;
use kalam_stt_interface::PhoneticStyle;

use crate::error::Error;

/// One translation/phonetics request to the enrichment backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub style: PhoneticStyle,
    /// Dialect-aware, meaning-based retranslation rather than a literal one.
    pub contextual: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranslateOutcome {
    pub translation: String,
    pub phonetic: String,
}

/// Async contract for the contextual-translation/phonetics backend.
///
/// Each call is independent and best-effort: a failure is terminal for that
/// attempt (no automatic retry) and must never cause the caller to blank or
/// revert an already-displayed value.
///
/// Object-safe via the explicit `BoxFuture` return type; pipelines hold a
/// `dyn Translator`.
pub trait Translator: Send + Sync {
    fn translate<'a>(
        &'a self,
        request: TranslateRequest,
    ) -> BoxFuture<'a, Result<TranslateOutcome, Error>>;
}
