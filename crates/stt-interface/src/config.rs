use std::time::Duration;

/// How committed utterances are enriched after display.
///
/// The two modes are distinct request shapes, not one call with overloaded
/// arguments: `Native` trusts the recognizer's own translation and asks the
/// backend only for phonetics, `Contextual` replaces it with a dialect-aware
/// retranslation plus phonetics.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnrichmentMode {
    #[default]
    Native,
    Contextual,
}

/// Notation convention for the phonetic transcription. Affects only how the
/// backend renders pronunciation, not what gets translated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PhoneticStyle {
    #[default]
    Clean,
    Precise,
    Franco,
    Ipa,
    Upa,
}

/// Rate limits for enrichment of in-progress (interim) text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ThrottleConfig {
    /// Minimum gap between two leading-edge enrichment calls.
    pub interval: Duration,
    /// Settle delay after the last text change before the trailing call.
    pub settle: Duration,
    /// Interim texts shorter than this are ignored outright.
    pub min_chars: usize,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(250),
            settle: Duration::from_millis(600),
            min_chars: 2,
        }
    }
}

/// Caller-supplied configuration for one recording session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    pub primary_language: String,
    pub secondary_language: String,
    #[serde(default)]
    pub diarization_enabled: bool,
    #[serde(default)]
    pub enrichment_mode: EnrichmentMode,
    #[serde(default)]
    pub phonetic_style: PhoneticStyle,
    #[serde(default)]
    pub interim_enrichment_enabled: bool,
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

impl SessionConfig {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary_language: primary.into(),
            secondary_language: secondary.into(),
            diarization_enabled: false,
            enrichment_mode: EnrichmentMode::default(),
            phonetic_style: PhoneticStyle::default(),
            interim_enrichment_enabled: false,
            throttle: ThrottleConfig::default(),
        }
    }

    /// The configured language that is not `language`. Falls back to the
    /// secondary slot when `language` matches neither side.
    pub fn other_language(&self, language: &str) -> &str {
        if language == self.primary_language {
            &self.secondary_language
        } else {
            &self.primary_language
        }
    }
}
