//! Narrative stages: per-month activity notes and the closing summary.
//!
//! Both stages degrade to deterministic text when no language model is
//! configured or a completion fails, so they only fail on missing input.

mod fallback;
mod monthly;
mod parsing;
mod prompts;
mod summary;

pub use fallback::{fallback_note, fallback_recommendations, fallback_summary};
pub use monthly::MonthlyAnalysisStage;
pub use parsing::{parse_monthly_note, parse_recommendations};
pub use summary::SummaryStage;

use anyhow::{Context, Result, anyhow};

use crate::client::{ChatCompletionRequest, ChatMessage, ChatMessageRole, DynChatClient};
use crate::config::ModelSettings;

/// Single-turn completion against the narrative model.
pub(crate) async fn complete(
    client: Option<&DynChatClient>,
    models: &ModelSettings,
    prompt: String,
) -> Result<String> {
    let client = client.ok_or_else(|| anyhow!("no language model configured"))?;

    let request = ChatCompletionRequest {
        model: models.narrative.clone(),
        messages: vec![ChatMessage {
            role: ChatMessageRole::User,
            content: prompt,
        }],
        max_tokens: Some(models.max_tokens),
        temperature: Some(models.temperature),
    };

    client
        .chat_completion(request)
        .await
        .context("Narrative model call failed")?
        .first_content()
}

/// Percentage with one decimal, `0.1234` → `12.3%`.
pub(crate) fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Integer with comma thousands separators.
pub(crate) fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
