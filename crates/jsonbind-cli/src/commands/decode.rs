//! `jsonbind decode` — Decode a request body against a signature.

use jsonbind_core::{Failure, FormatterConfig, JsonFormatter};

use super::{load_signature, print_json, print_response, read_input};

pub fn run(config: FormatterConfig, signature: &str, body: &str) -> Result<(), String> {
    let sig = load_signature(signature)?;
    let body = read_input(body)?;
    let formatter = JsonFormatter::new(config);

    match formatter.decode_request(&sig, &body) {
        Ok(args) => {
            print_json(&args.to_object());
            Ok(())
        }
        Err(err) => {
            // Show exactly what a client would receive.
            print_response(&formatter.provide_fault(&Failure::from(err)));
            Err("request body rejected".into())
        }
    }
}
