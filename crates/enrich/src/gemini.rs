use kalam_stt_interface::PhoneticStyle;
use serde::Deserialize;

use crate::error::Error;
use crate::translator::{BoxFuture, TranslateOutcome, TranslateRequest, Translator};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const BASE_PROMPT: &str = r#"You are a translator.
Output JSON format: { "translation": "...", "phonetic": "..." }

Rules:
1. Translate the input text from Source Language to Target Language.
2. "translation" field = The translated text.
3. "phonetic" field = The phonetic transcription of the TARGET-LANGUAGE text involved.
   - If Source is the target-alphabet language, provide phonetics of Source.
   - If Target is, provide phonetics of Target.
   - If neither, leave empty."#;

fn phonetic_instruction(style: PhoneticStyle) -> &'static str {
    match style {
        PhoneticStyle::Clean => {
            "   - Style: Clean/Standard.\n\
             \x20  - Use macrons for long vowels (e.g. 'ā', 'ī', 'ū').\n\
             \x20  - Use apostrophe (') or hamza (ʾ) for glottal stops.\n\
             \x20  - DO NOT use confusing symbols like '?' or ':' or numbers.\n\
             \x20  - Focus on readability."
        }
        PhoneticStyle::Precise => {
            "   - Style: Precise/Scientific.\n\
             \x20  - You MAY use symbols like '?' (glottal stop), ':' (long vowel), '3' (ayn)\n\
             \x20    to ensure exact pronunciation.\n\
             \x20  - Focus on phonetic accuracy over readability."
        }
        PhoneticStyle::Franco => {
            "   - Style: Franco/Arabizi.\n\
             \x20  - Use numbers for sounds: '2' (hamza), '3' (ayn), '5' (kha), '7' (ha), '9' (sad/qaf).\n\
             \x20  - Example: \"Salam 3alaykom\", \"Sob7an Allah\"."
        }
        PhoneticStyle::Ipa => {
            "   - Style: IPA.\n\
             \x20  - Use standard International Phonetic Alphabet symbols, enclosed in slashes."
        }
        PhoneticStyle::Upa => {
            "   - Style: UPA.\n\
             \x20  - Use Uralic Phonetic Alphabet conventions."
        }
    }
}

const CONTEXTUAL_INSTRUCTION: &str = "\
   - MODE: CONTEXTUAL / SMART TRANSLATION.\n\
   - DO NOT translate literally. Translate the meaning and intent.\n\
   - Use the informal register a local speaker would use in conversation,\n\
     not formal or touristic phrasing.";

fn build_prompt(request: &TranslateRequest) -> String {
    let mut prompt = format!("{BASE_PROMPT}\n{}", phonetic_instruction(request.style));
    if request.contextual {
        prompt.push('\n');
        prompt.push_str(CONTEXTUAL_INSTRUCTION);
    }
    prompt.push_str(&format!(
        "\n\nSource Language: {}\nTarget Language: {}\nInput: \"{}\"",
        request.source_lang, request.target_lang, request.text
    ));
    prompt
}

/// Strip a Markdown code fence the model sometimes wraps its JSON in.
fn strip_code_fences(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct OutcomePayload {
    translation: Option<String>,
    phonetic: Option<String>,
}

/// Gemini-style `generateContent` client for translation and phonetics.
pub struct GeminiTranslator {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiTranslator {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(GEMINI_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, request: TranslateRequest) -> Result<TranslateOutcome, Error> {
        let mut url = url::Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        ))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": build_prompt(&request) }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let response = self.http.post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text: String = parsed
            .candidates
            .first()
            .ok_or(Error::EmptyResponse)?
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();

        let payload: OutcomePayload = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(TranslateOutcome {
            translation: payload.translation.unwrap_or_default(),
            phonetic: payload.phonetic.unwrap_or_default(),
        })
    }
}

impl Translator for GeminiTranslator {
    fn translate<'a>(
        &'a self,
        request: TranslateRequest,
    ) -> BoxFuture<'a, Result<TranslateOutcome, Error>> {
        Box::pin(self.generate(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn request(text: &str, contextual: bool) -> TranslateRequest {
        TranslateRequest {
            text: text.into(),
            source_lang: "en".into(),
            target_lang: "ar".into(),
            style: PhoneticStyle::Clean,
            contextual,
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
    }

    #[tokio::test]
    async fn parses_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "k"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                r#"{"translation":"أهلاً","phonetic":"ahlan"}"#,
            )))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        let outcome = translator.translate(request("Hello", true)).await.unwrap();

        assert_eq!(outcome.translation, "أهلاً");
        assert_eq!(outcome.phonetic, "ahlan");
    }

    #[tokio::test]
    async fn tolerates_markdown_fenced_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                "```json\n{\"translation\":\"t\",\"phonetic\":\"p\"}\n```",
            )))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        let outcome = translator.translate(request("Hello", false)).await.unwrap();

        assert_eq!(outcome.translation, "t");
        assert_eq!(outcome.phonetic, "p");
    }

    #[tokio::test]
    async fn missing_fields_default_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_body(r#"{"translation":"t"}"#)),
            )
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        let outcome = translator.translate(request("Hello", false)).await.unwrap();
        assert_eq!(outcome.phonetic, "");
    }

    #[tokio::test]
    async fn non_json_candidate_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("sorry, no JSON today")),
            )
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        assert!(matches!(
            translator.translate(request("Hello", false)).await,
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        assert!(matches!(
            translator.translate(request("Hello", false)).await,
            Err(Error::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn http_error_status_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        assert!(matches!(
            translator.translate(request("Hello", false)).await,
            Err(Error::Status(429))
        ));
    }

    #[tokio::test]
    async fn contextual_flag_changes_the_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                r#"{"translation":"t","phonetic":"p"}"#,
            )))
            .mount(&server)
            .await;

        let translator = GeminiTranslator::with_base_url(server.uri(), "k");
        translator.translate(request("Hello", true)).await.unwrap();
        translator.translate(request("Hello", false)).await.unwrap();

        let received: Vec<Request> = server.received_requests().await.unwrap();
        let prompts: Vec<String> = received
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["contents"][0]["parts"][0]["text"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();

        assert!(prompts[0].contains("CONTEXTUAL"));
        assert!(!prompts[1].contains("CONTEXTUAL"));
        assert!(prompts[0].contains("Source Language: en"));
        assert!(prompts[0].contains("Target Language: ar"));
    }
}
