//! `jsonbind fault` — Render the fault envelope for a failure chain.

use jsonbind_core::{Failure, FormatterConfig, JsonFormatter};

use super::print_response;

pub fn run(config: FormatterConfig, messages: &[String], status: Option<u16>) -> Result<(), String> {
    let failure = chain(messages, status).ok_or("at least one message is required")?;
    let formatter = JsonFormatter::new(config);
    print_response(&formatter.provide_fault(&failure));
    Ok(())
}

/// Build a failure whose causes follow `messages` from the outermost inward.
fn chain(messages: &[String], status: Option<u16>) -> Option<Failure> {
    let failure = messages
        .iter()
        .rev()
        .fold(None, |cause: Option<Failure>, message| {
            let failure = Failure::new(message.as_str());
            Some(match cause {
                Some(cause) => failure.with_cause(cause),
                None => failure,
            })
        })?;
    Some(match status {
        Some(code) => failure.with_status(code),
        None => failure,
    })
}
