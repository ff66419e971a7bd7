/// Failures the visitor sees while waiting for a reading.
#[derive(Debug, thiserror::Error)]
pub enum FortuneError {
    #[error("The oracle was silent. Please try again.")]
    EmptyResponse,

    #[error("API key missing: set ANTHROPIC_API_KEY for the fortune proxy.")]
    MissingApiKey,

    #[error("Rate limited. Wait a moment and try again.")]
    RateLimited,

    #[error("Oracle unreachable ({status}). Try again.")]
    BadStatus { status: u16 },

    #[error("The oracle spoke in riddles. Please try again.")]
    Unparseable {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

impl FortuneError {
    /// Map a non-success proxy status to the message shown to the visitor.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FortuneError::MissingApiKey,
            429 => FortuneError::RateLimited,
            status => FortuneError::BadStatus { status },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_messages() {
        assert!(matches!(FortuneError::from_status(401), FortuneError::MissingApiKey));
        assert!(matches!(FortuneError::from_status(429), FortuneError::RateLimited));
        assert_eq!(
            FortuneError::from_status(502).to_string(),
            "Oracle unreachable (502). Try again."
        );
    }
}
