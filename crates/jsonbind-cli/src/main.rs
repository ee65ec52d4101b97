//! jsonbind CLI — inspect how request bodies, replies and faults are
//! marshaled for a given operation signature.
//!
//! Signatures are read from JSON description files:
//!
//! ```json
//! {
//!   "name": "setStatus",
//!   "parameters": [
//!     { "name": "id", "type": { "type": "integer" } },
//!     { "name": "status", "type": { "type": "enum", "name": "Status", "variants": ["Active", "Inactive"] } }
//!   ],
//!   "returns": { "type": "bool" }
//! }
//! ```

mod commands;

use clap::{Parser, Subcommand};
use jsonbind_core::FormatterConfig;

/// jsonbind CLI — JSON parameter marshaling for RPC operations
#[derive(Parser)]
#[command(name = "jsonbind", version, about = "jsonbind CLI — JSON parameter marshaling for RPC operations")]
pub struct Cli {
    /// Include traces and inner causes in fault bodies
    #[arg(long, global = true, env = "JSONBIND_INCLUDE_DETAIL")]
    include_detail: bool,

    /// Status used for failures that do not declare one
    #[arg(long, global = true, env = "JSONBIND_DEFAULT_STATUS", default_value_t = 500)]
    default_status: u16,

    /// Maximum depth of error trees built with detail
    #[arg(long, global = true, default_value_t = 64)]
    max_error_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a signature description and show how it will be decoded
    Check {
        /// Path to the signature JSON file
        signature: String,
    },

    /// Decode a request body into the operation's arguments
    Decode {
        /// Path to the signature JSON file
        #[arg(long, short = 's')]
        signature: String,
        /// Request body file ("-" for stdin)
        #[arg(default_value = "-")]
        body: String,
    },

    /// Encode a result value as the operation's reply body
    Encode {
        /// Path to the signature JSON file
        #[arg(long, short = 's')]
        signature: String,
        /// Result value file ("-" for stdin)
        #[arg(default_value = "-")]
        value: String,
    },

    /// Render the fault envelope for a failure chain
    Fault {
        /// Messages from the outermost failure inward
        #[arg(required = true)]
        messages: Vec<String>,
        /// Declared status code of the outermost failure
        #[arg(long)]
        status: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jsonbind_core=warn,jsonbind_cli=info".into()),
        )
        .init();

    let config = FormatterConfig {
        include_detail: cli.include_detail,
        default_status: cli.default_status,
        max_error_depth: cli.max_error_depth,
    };

    let result = match cli.command {
        Commands::Check { signature } => commands::check::run(&signature),
        Commands::Decode { signature, body } => commands::decode::run(config, &signature, &body),
        Commands::Encode { signature, value } => commands::encode::run(config, &signature, &value),
        Commands::Fault { messages, status } => commands::fault::run(config, &messages, status),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
