//! Mock vision provider for exercising the chain and pipeline without
//! network calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use glimpse_core::error::{GlimpseError, Result};
use glimpse_core::{ImageInput, VisionProvider};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// A provider that returns a canned reply and records every call.
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    reply: MockReply,
    calls: Arc<AtomicUsize>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockProvider {
    /// Succeeds with `text` (which may be empty).
    pub fn replying(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_reply(name, MockReply::Text(text.into()))
    }

    /// Fails with a provider error carrying `message`.
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_reply(name, MockReply::Fail(message.into()))
    }

    fn with_reply(name: impl Into<String>, reply: MockReply) -> Self {
        Self {
            name: name.into(),
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn into_shared(self) -> Arc<dyn VisionProvider> {
        Arc::new(self)
    }
}

#[async_trait]
impl VisionProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, _image: &ImageInput, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.write() {
            prompts.push(prompt.to_string());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Fail(message) => Err(GlimpseError::provider(&self.name, message)),
        }
    }
}
