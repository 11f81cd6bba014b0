mod ollama;

pub use ollama::OllamaLlm;

use crate::domain::DomainError;

/// Maps a transport failure talking to the inference daemon.
pub(crate) fn daemon_error(e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::timeout(format!("inference daemon: {e}"))
    } else if e.is_connect() {
        DomainError::unavailable(format!("cannot reach inference daemon: {e}"))
    } else {
        DomainError::external(format!("inference daemon: {e}"))
    }
}
