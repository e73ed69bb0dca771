/// Sentinel text some recognizers emit as a final token to mark the end of an
/// utterance. Normalized into [`Token::is_boundary`] by [`crate::live`].
pub const END_SENTINEL: &str = "<end>";

/// Smallest unit of recognizer output.
///
/// Tokens for one utterance arrive strictly in order. A boundary token
/// terminates exactly one utterance and carries no text. A missing `language`
/// means "assume the configured primary language", never "unknown"; a missing
/// `speaker` means "unknown/unchanged".
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Token {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_final: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default)]
    pub is_boundary: bool,
}

impl Token {
    /// A finalized text token, optionally language-tagged.
    pub fn final_text(text: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            language: language.map(str::to_string),
            ..Default::default()
        }
    }

    /// An interim (revisable) text token, optionally language-tagged.
    pub fn interim(text: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            language: language.map(str::to_string),
            ..Default::default()
        }
    }

    /// The end-of-utterance marker.
    pub fn boundary() -> Self {
        Self {
            is_final: true,
            is_boundary: true,
            ..Default::default()
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}
