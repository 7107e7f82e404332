//! Seam between the gateway and whatever actually produces text.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// The four kinds of request the gateway sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    StepGeneration,
    StepRephrase,
    ContextGathering,
    TitleGeneration,
}

impl RequestKind {
    /// Operation name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::StepGeneration => "generate step",
            RequestKind::StepRephrase => "rephrase step",
            RequestKind::ContextGathering => "gather context",
            RequestKind::TitleGeneration => "derive title",
        }
    }

    /// File stem of the prompt template for this kind.
    pub fn template_name(&self) -> &'static str {
        match self {
            RequestKind::StepGeneration => "step_generation",
            RequestKind::StepRephrase => "step_rephrase",
            RequestKind::ContextGathering => "context_gathering",
            RequestKind::TitleGeneration => "title_generation",
        }
    }
}

/// One outbound generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: RequestKind,
    /// Fully rendered prompt
    pub instruction: String,
    /// JSON Schema of the expected reply, sent as the response format where
    /// the service supports it
    pub schema: Value,
}

/// A text-generation service.
///
/// Implementations return the raw reply text. Interpreting it is the
/// gateway's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(&self, request: &GenerationRequest) -> Result<String>;

    /// Short name for logs
    fn name(&self) -> &str;
}
