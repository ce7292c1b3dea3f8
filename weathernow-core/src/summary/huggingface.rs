use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::Error as _};
use serde_json::Value;
use tracing::debug;

use crate::config::SamplingParams;

use super::{GenerationError, TextGenerator};

/// Inference endpoints answer either with a list of results or a single one.
#[derive(Debug)]
enum GenerationResponse {
    Many(Vec<Value>),
    One(GeneratedText),
    /// A bare string, number or boolean; carries no generated text.
    Scalar,
}

#[derive(Debug, Default, Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: Option<Value>,
    #[serde(default)]
    summary_text: Option<Value>,
}

/// Which response fields carry usable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    Generated,
    GeneratedOrSummary,
}

impl TryFrom<Value> for GenerationResponse {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => Ok(GenerationResponse::Many(items)),
            Value::Object(_) => Ok(GenerationResponse::One(serde_json::from_value(value)?)),
            Value::Null => Err(serde_json::Error::custom("null generation response")),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(GenerationResponse::Scalar),
        }
    }
}

impl GenerationResponse {
    /// The generated text, empty when the response has none.
    ///
    /// A first result that is not an object, or a text field that is not a
    /// string, is malformed.
    fn into_text(self, field: TextField) -> Result<String, serde_json::Error> {
        let item: GeneratedText = match self {
            GenerationResponse::Many(items) => match items.into_iter().next() {
                None => return Ok(String::new()),
                Some(first @ Value::Object(_)) => serde_json::from_value(first)?,
                Some(other) => {
                    return Err(serde_json::Error::custom(format!(
                        "expected an object as first generation result, got {other}"
                    )));
                }
            },
            GenerationResponse::One(item) => item,
            GenerationResponse::Scalar => return Ok(String::new()),
        };

        let text = match (text_value(item.generated_text)?, field) {
            (Some(text), _) => Some(text),
            (None, TextField::GeneratedOrSummary) => text_value(item.summary_text)?,
            (None, TextField::Generated) => None,
        };

        Ok(text.unwrap_or_default())
    }
}

fn text_value(value: Option<Value>) -> Result<Option<String>, serde_json::Error> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(serde_json::Error::custom(format!("expected generated text, got {other}"))),
    }
}

#[derive(Debug, Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a SamplingParams,
}

#[derive(Debug, Serialize)]
struct DialogueRequest<'a> {
    inputs: &'a str,
}

/// POST `body` and parse the answer. `Ok(None)` on a non-success status.
async fn post_json<B: Serialize + ?Sized>(
    http: &Client,
    url: &str,
    body: &B,
) -> Result<Option<GenerationResponse>, GenerationError> {
    let res = http.post(url).json(body).send().await?;

    let status = res.status();
    if !status.is_success() {
        debug!(%status, url, "text generation backend declined");
        return Ok(None);
    }

    let body = res.text().await?;
    let value: Value = serde_json::from_str(&body)?;
    Ok(Some(GenerationResponse::try_from(value)?))
}

/// General text-generation model (e.g. gpt2) driven with sampling parameters.
#[derive(Debug, Clone)]
pub struct TextGenerationBackend {
    http: Client,
    url: String,
    sampling: SamplingParams,
}

impl TextGenerationBackend {
    pub fn new(http: Client, url: String, sampling: SamplingParams) -> Self {
        Self { http, url, sampling }
    }
}

#[async_trait]
impl TextGenerator for TextGenerationBackend {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let request = TextGenerationRequest { inputs: prompt, parameters: &self.sampling };
        let response = post_json(&self.http, &self.url, &request).await?;
        Ok(response.map(|r| r.into_text(TextField::Generated)).transpose()?)
    }
}

/// Dialogue model (e.g. blenderbot) that takes the bare prompt.
#[derive(Debug, Clone)]
pub struct DialogueBackend {
    http: Client,
    url: String,
}

impl DialogueBackend {
    pub fn new(http: Client, url: String) -> Self {
        Self { http, url }
    }
}

#[async_trait]
impl TextGenerator for DialogueBackend {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let request = DialogueRequest { inputs: prompt };
        let response = post_json(&self.http, &self.url, &request).await?;
        Ok(response.map(|r| r.into_text(TextField::GeneratedOrSummary)).transpose()?)
    }
}
