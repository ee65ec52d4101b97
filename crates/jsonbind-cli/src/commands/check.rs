//! `jsonbind check` — Validate a signature description.

use jsonbind_core::signature::DecodeStrategy;

use super::{load_signature, print_json};

pub fn run(path: &str) -> Result<(), String> {
    let sig = load_signature(path)?;

    let strategy = match sig.strategy() {
        DecodeStrategy::Empty => "empty",
        DecodeStrategy::Bare => "bare",
        DecodeStrategy::Wrapped(_) => "wrapped",
    };

    tracing::info!(operation = sig.name(), strategy, "signature is valid");

    print_json(&serde_json::json!({
        "name": sig.name(),
        "parameters": sig.parameter_names().iter().collect::<Vec<_>>(),
        "strategy": strategy,
        "requestFormatter": sig.uses_request_formatter(),
        "replyFormatter": sig.uses_reply_formatter(),
    }));
    Ok(())
}
