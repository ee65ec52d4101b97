//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and drives the
//! jsonbind-core entry points directly.

pub mod check;
pub mod decode;
pub mod encode;
pub mod fault;

use std::io::Read;

use jsonbind_core::{EncodedResponse, OperationSignature};

/// Load and register a signature from a JSON description file.
pub fn load_signature(path: &str) -> Result<OperationSignature, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read signature file '{}': {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid signature '{}': {}", path, e))
}

/// Read a file, or stdin when `path` is "-".
pub fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|e| format!("Failed to read '{}': {}", path, e))
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}

/// Print an encoded response as status line + raw body.
pub fn print_response(response: &EncodedResponse) {
    println!(
        "{} {}",
        response.status,
        response.content_type.unwrap_or("(no body)")
    );
    println!("{}", String::from_utf8_lossy(&response.body));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_signature_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"add","parameters":[{{"name":"a","type":{{"type":"integer"}}}},{{"name":"b","type":{{"type":"integer"}}}}],"returns":{{"type":"integer"}}}}"#
        )
        .unwrap();

        let sig = load_signature(file.path().to_str().unwrap()).unwrap();
        assert_eq!(sig.name(), "add");
        assert_eq!(sig.parameters().len(), 2);
    }

    #[test]
    fn test_load_signature_rejects_duplicates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"dup","parameters":[{{"name":"a","type":{{"type":"integer"}}}},{{"name":"a","type":{{"type":"integer"}}}}]}}"#
        )
        .unwrap();

        let err = load_signature(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("Duplicate parameter"));
    }

    #[test]
    fn test_read_missing_input() {
        assert!(read_input("/nonexistent/body.json").is_err());
    }
}
