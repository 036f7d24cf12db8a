//! Conditions reported to the caller. Malformed report content is never an
//! error; only an empty trade table or a failed source read is.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No trades detected.")]
    NoData,

    #[error("error reading report '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("report '{0}' is not in the store")]
    UnknownReport(String),

    #[error("unknown report profile '{0}'")]
    UnknownProfile(String),
}
