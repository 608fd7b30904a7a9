use std::io;
use std::path::PathBuf;

use crate::model::vo::DirectiveKey;

/// Reasons a synthesis run is aborted. No partial script is produced.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("data not ready: {0}")]
    NotReady(&'static str),

    #[error("{} invalid #QSYS directive(s): {}", .0.len(), join_directive_errors(.0))]
    Directives(Vec<DirectiveError>),

    #[error("cannot read input file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to interpret a single `#QSYS` line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("`{0}` is not of the form <key>=<value>")]
    Malformed(String),

    #[error("unknown directive `{key}` in `{line}`")]
    UnknownKey { key: String, line: String },

    #[error("invalid value `{value}` for `{key}`: {reason}")]
    InvalidValue {
        key: DirectiveKey,
        value: String,
        reason: String,
    },
}

fn join_directive_errors(errors: &[DirectiveError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
