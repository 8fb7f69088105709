pub mod chain;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod testing;

pub use chain::ProviderChain;
pub use pipeline::OcrPipeline;
pub use prompts::{resolve, ModeStrategy};
pub use providers::{build_provider, AnthropicProvider, OpenRouterProvider};
