//! Completion client: provider abstraction over the external text-completion
//! service. The Gemini provider does the real call; a disabled client stands
//! in when no API key is configured, and a scripted mock drives tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Trait object used by the pipeline and handlers. One call per stage; no
/// retries, no schema guarantee on the returned text.
pub trait CompletionClient: Send + Sync {
    fn complete<'a>(
        &'a self,
        system_instruction: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;

    /// Whether a real completion service is available. Drives /api/health.
    fn is_configured(&self) -> bool;
}

/// Convenient alias used by callers.
pub type DynCompletionClient = Arc<dyn CompletionClient>;

/// Factory: build a client from the environment. An absent or empty
/// `GEMINI_API_KEY` disables extraction; everything else keeps working on
/// whatever is already stored.
pub fn build_client_from_env() -> DynCompletionClient {
    match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => {
            let model = std::env::var("GEMINI_MODEL").ok();
            Arc::new(GeminiClient::new(key, model.as_deref()))
        }
        _ => Arc::new(DisabledClient),
    }
}

/// Gemini provider (uses the generateContent REST API).
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// `model_override`: pass Some("gemini-1.5-pro") to override; defaults to
    /// gemini-1.5-flash.
    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("forex-signal-extractor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        let model = model_override.unwrap_or("gemini-1.5-flash").to_string();
        Self {
            http,
            api_key,
            model,
        }
    }

    async fn complete_impl(&self, system_instruction: &str, user_prompt: &str) -> anyhow::Result<String> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            system_instruction: Content<'a>,
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: CandidateContent,
        }
        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }

        let req = Req {
            system_instruction: Content {
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
            contents: vec![Content {
                parts: vec![Part { text: user_prompt }],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("completion service returned {status}"));
        }
        let body: Resp = resp.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| anyhow!("completion response had no candidates"))?;
        Ok(text)
    }
}

impl CompletionClient for GeminiClient {
    fn complete<'a>(
        &'a self,
        system_instruction: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(self.complete_impl(system_instruction, user_prompt))
    }
    fn provider_name(&self) -> &'static str {
        "gemini"
    }
    fn is_configured(&self) -> bool {
        true
    }
}

/// Always errors; used when no API key is configured.
pub struct DisabledClient;

impl CompletionClient for DisabledClient {
    fn complete<'a>(
        &'a self,
        _system_instruction: &'a str,
        _user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async { Err(anyhow!("completion service not configured")) })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
    fn is_configured(&self) -> bool {
        false
    }
}

/// Scripted mock for tests: pops one canned reply per call, in order.
/// `Err` entries simulate a service failure. An exhausted script also errors.
pub struct MockClient {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl MockClient {
    pub fn with_script<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
        }
    }

    /// Single successful reply; common case for stage-only tests.
    pub fn replying(text: &str) -> Self {
        Self::with_script([Ok(text.to_string())])
    }
}

impl CompletionClient for MockClient {
    fn complete<'a>(
        &'a self,
        _system_instruction: &'a str,
        _user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        let next = self
            .script
            .lock()
            .expect("mock script mutex poisoned")
            .pop_front();
        Box::pin(async move {
            match next {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(anyhow!(msg)),
                None => Err(anyhow!("mock script exhausted")),
            }
        })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
    fn is_configured(&self) -> bool {
        true
    }
}
