//! User-visible wording for failed generations.

use std::time::Duration;

use muse_llm::ProviderError;

pub fn rate_limited(model_name: &str) -> String {
    format!(
        "⚠️ Rate limit exceeded. The free tier has daily/minute limits. Please try again in a few minutes or consider upgrading to a paid plan. Model used: {}",
        model_name
    )
}

pub fn model_not_found(model_name: &str) -> String {
    format!("❌ Model '{}' not found. Please check if the model name is correct.", model_name)
}

pub fn timed_out(timeout: Duration) -> String {
    let limit = if timeout.subsec_millis() == 0 && timeout.as_secs() > 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{} ms", timeout.as_millis())
    };
    format!("⏱️ The model did not finish responding within {}. Please try again.", limit)
}

/// Classify an upstream error into the message shown in place of the reply
pub fn describe(err: &anyhow::Error, model_name: &str) -> String {
    if let Some(provider) = err.downcast_ref::<ProviderError>() {
        if provider.is_rate_limited() {
            return rate_limited(model_name);
        }
        if provider.is_not_found() {
            return model_not_found(model_name);
        }
        return format!("❌ API Error: {}", provider);
    }
    format!("❌ API Error: {}", err)
}
