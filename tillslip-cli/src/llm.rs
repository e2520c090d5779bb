use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tillslip_core::CategoryConfig;
use tillslip_scan::{TranscribeRequest, Transcriber};

use crate::config::AiSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Anthropic,
    OpenaiCompatible,
}

/// Completion client that asks a model for a JSON receipt.
#[derive(Debug, Clone)]
pub struct AiTranscriber {
    section: AiSection,
    categories: Vec<String>,
}

impl AiTranscriber {
    pub fn new(section: AiSection, categories: &CategoryConfig) -> Self {
        Self {
            section,
            categories: categories.categories().to_vec(),
        }
    }
}

impl Transcriber for AiTranscriber {
    fn transcribe(&self, request: &TranscribeRequest) -> tillslip_core::Result<String> {
        // The CLI runs under #[tokio::main]; a nested runtime would panic.
        let out = if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete(request)))
        } else {
            tokio::runtime::Runtime::new()
                .context("create tokio runtime")
                .and_then(|rt| rt.block_on(self.complete(request)))
        };
        out.map_err(|e| tillslip_core::Error::Upstream(format!("{e:#}")))
    }
}

impl AiTranscriber {
    async fn complete(&self, request: &TranscribeRequest) -> Result<String> {
        let prompt = match request {
            TranscribeRequest::Image { .. } => image_prompt(&self.categories),
            TranscribeRequest::Text(text) => text_prompt(text, &self.categories),
        };
        debug!(provider = ?self.section.provider, model = %self.section.model, "requesting transcription");
        match self.section.provider {
            Provider::Anthropic => self.anthropic_complete(request, &prompt).await,
            Provider::OpenaiCompatible => self.openai_complete(request, &prompt).await,
        }
    }

    async fn anthropic_complete(&self, request: &TranscribeRequest, prompt: &str) -> Result<String> {
        let key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("missing ANTHROPIC_API_KEY"))?;

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<Msg>,
        }

        #[derive(Serialize)]
        struct Msg {
            role: &'static str,
            content: Vec<Block>,
        }

        #[derive(Serialize)]
        #[serde(tag = "type", rename_all = "lowercase")]
        enum Block {
            Image { source: ImageSource },
            Text { text: String },
        }

        #[derive(Serialize)]
        struct ImageSource {
            #[serde(rename = "type")]
            t: &'static str,
            media_type: String,
            data: String,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let mut content = Vec::new();
        if let TranscribeRequest::Image { bytes, media_type } = request {
            content.push(Block::Image {
                source: ImageSource {
                    t: "base64",
                    media_type: media_type.clone(),
                    data: STANDARD.encode(bytes),
                },
            });
        }
        content.push(Block::Text {
            text: prompt.to_string(),
        });

        let body = Req {
            model: &self.section.model,
            max_tokens: self.section.max_tokens,
            temperature: self.section.temperature,
            messages: vec![Msg {
                role: "user",
                content,
            }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = format!("{}/v1/messages", self.section.base_url.trim_end_matches('/'));
        let resp = reqwest::Client::new()
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let text: String = out
            .content
            .into_iter()
            .filter(|b| b.t == "text")
            .filter_map(|b| b.text)
            .collect();
        Ok(text.trim().to_string())
    }

    async fn openai_complete(&self, request: &TranscribeRequest, prompt: &str) -> Result<String> {
        let key = std::env::var("OPENAI_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .map_err(|_| anyhow!("missing OPENAI_API_KEY or GROQ_API_KEY"))?;

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Serialize)]
        struct Msg {
            role: &'static str,
            content: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        enum Part {
            Text { text: String },
            ImageUrl { image_url: ImageUrl },
        }

        #[derive(Serialize)]
        struct ImageUrl {
            url: String,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let mut content = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let TranscribeRequest::Image { bytes, media_type } = request {
            content.push(Part::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{media_type};base64,{}", STANDARD.encode(bytes)),
                },
            });
        }

        let body = Req {
            model: &self.section.model,
            messages: vec![Msg {
                role: "user",
                content,
            }],
            temperature: self.section.temperature,
            max_tokens: self.section.max_tokens,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.section.base_url.trim_end_matches('/')
        );
        let resp = reqwest::Client::new()
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .context("completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("completion error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse completion response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

fn category_list(categories: &[String]) -> String {
    categories.join(", ")
}

pub fn image_prompt(categories: &[String]) -> String {
    format!(
        r#"Analyze this receipt and extract the following information in JSON format only (no markdown, no preamble):
{{
  "merchant": "store name",
  "date": "YYYY-MM-DD",
  "total": number,
  "items": [
    {{"name": "item name", "price": number, "quantity": number}}
  ],
  "category": "one of: {}"
}}"#,
        category_list(categories)
    )
}

pub fn text_prompt(text: &str, categories: &[String]) -> String {
    format!(
        r#"You are a receipt parser. Extract structured data from this receipt text.

Receipt Text:
{text}

Return ONLY a valid JSON object with this exact structure:
{{
  "merchant": "store name",
  "date": "YYYY-MM-DD",
  "total": 0.00,
  "category": "one of: {}",
  "items": [
    {{"name": "item name", "price": 0.00, "quantity": 1}}
  ]
}}

Rules:
- merchant: First clear business name found
- date: Format as YYYY-MM-DD, omit if not found
- total: Final total amount
- category: Choose the best fit from the list above
- items: Individual purchases with name and price (extract ALL items with prices)
- Return valid JSON only, no markdown or explanations"#,
        category_list(categories)
    )
}
