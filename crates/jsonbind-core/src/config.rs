//! Formatter configuration.

use serde::Deserialize;

use crate::fault::DEFAULT_MAX_ERROR_DEPTH;

/// Deployment settings for a [`JsonFormatter`](crate::JsonFormatter).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatterConfig {
    /// Put traces and inner causes into fault bodies. Keep off in production.
    pub include_detail: bool,
    /// Status for failures that do not declare their own.
    pub default_status: u16,
    /// Cut-off for error trees built with detail.
    pub max_error_depth: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_detail: false,
            default_status: 500,
            max_error_depth: DEFAULT_MAX_ERROR_DEPTH,
        }
    }
}
