//! Client error types for clusterlens

/// Error type for connection-settings and cluster API operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("no cluster host configured")]
    MissingHost,

    #[error("no tagline in response from {url}, target is not a search cluster")]
    UnrecognizedCluster { url: String },

    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::MissingHost;
        assert_eq!(err.to_string(), "no cluster host configured");

        let err = ClientError::UnrecognizedCluster {
            url: "http://localhost:9200".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no tagline in response from http://localhost:9200, target is not a search cluster"
        );

        let err = ClientError::RequestFailed {
            status: 503,
            body: "cluster unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 503: cluster unavailable"
        );

        let err = ClientError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ClientError = parse_err.into();
        assert!(matches!(err, ClientError::Serialization(_)));
    }
}
