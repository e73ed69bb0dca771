use crate::token::{END_SENTINEL, Token};

/// One normalized message from a live-transcription socket.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveMessage {
    /// One recognizer frame: the newly finalized tokens followed by the
    /// complete current set of interim tokens, in stream order.
    Tokens(Vec<Token>),
    /// The provider closed the session normally.
    Finished,
    /// The provider reported a session-level error. The session cannot
    /// continue; reconnection is the caller's concern.
    Error { code: i32, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed live frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, serde::Deserialize)]
struct WireFrame {
    #[serde(default)]
    tokens: Vec<WireToken>,
    #[serde(default)]
    finished: bool,
    error_code: Option<i32>,
    error_message: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireToken {
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_final: bool,
    language: Option<String>,
    speaker: Option<String>,
}

impl From<WireToken> for Token {
    fn from(w: WireToken) -> Self {
        if w.is_final && w.text == END_SENTINEL {
            return Token::boundary();
        }
        Token {
            text: w.text,
            is_final: w.is_final,
            language: w.language,
            speaker: w.speaker,
            is_boundary: false,
        }
    }
}

/// Normalize one raw live-transcription JSON frame into a [`LiveMessage`].
///
/// Absent fields follow the defaulting rules of the token contract: no
/// `language` and no `speaker` are represented as `None`, never rejected.
/// The `"<end>"` sentinel is rewritten into an explicit boundary token.
pub fn parse_live_message(raw: &str) -> Result<LiveMessage, ParseError> {
    let frame: WireFrame = serde_json::from_str(raw)?;

    if let Some(code) = frame.error_code {
        return Ok(LiveMessage::Error {
            code,
            message: frame.error_message.unwrap_or_default(),
        });
    }

    if frame.finished {
        return Ok(LiveMessage::Finished);
    }

    Ok(LiveMessage::Tokens(
        frame.tokens.into_iter().map(Token::from).collect(),
    ))
}
