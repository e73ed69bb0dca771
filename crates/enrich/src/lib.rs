pub mod error;
pub mod gemini;
pub mod pipeline;
pub mod throttle;
pub mod translator;

pub use error::Error;
pub use gemini::GeminiTranslator;
pub use pipeline::{EnrichmentJob, EnrichmentPatch, EnrichmentPipeline, Slot};
pub use throttle::InterimThrottle;
pub use translator::{BoxFuture, TranslateOutcome, TranslateRequest, Translator};
