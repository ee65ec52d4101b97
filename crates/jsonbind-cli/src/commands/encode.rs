//! `jsonbind encode` — Encode a result value as a reply body.

use jsonbind_core::{Failure, FormatterConfig, JsonFormatter};

use super::{load_signature, print_response, read_input};

pub fn run(config: FormatterConfig, signature: &str, value: &str) -> Result<(), String> {
    let sig = load_signature(signature)?;
    let raw = read_input(value)?;
    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|e| format!("Invalid JSON value: {}", e))?;
    let formatter = JsonFormatter::new(config);

    match formatter.serialize_reply(&sig, &value) {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(err) => {
            print_response(&formatter.provide_fault(&Failure::from(err)));
            Err("result value rejected".into())
        }
    }
}
