//! Unit tests for catalog error types

#[cfg(test)]
mod tests {
    use crate::catalog::error::{ClientError, FetchError, GENERIC_UPSTREAM_MESSAGE};

    #[test]
    fn test_upstream_uses_api_message() {
        let error = FetchError::upstream(Some("There is nothing here".into()));
        assert_eq!(error.to_string(), "There is nothing here");
    }

    #[test]
    fn test_upstream_falls_back_to_generic_message() {
        assert_eq!(FetchError::upstream(None).to_string(), GENERIC_UPSTREAM_MESSAGE);
        assert_eq!(
            FetchError::upstream(Some("   ".into())).to_string(),
            GENERIC_UPSTREAM_MESSAGE
        );
    }

    #[test]
    fn test_network_and_malformed_display() {
        let network = FetchError::Network("connection refused".into());
        assert_eq!(network.to_string(), "Network error: connection refused");

        let malformed = FetchError::Malformed("missing field `info`".into());
        assert!(malformed.to_string().starts_with("Malformed response"));
    }

    #[test]
    fn test_fetch_error_clones_equal() {
        let error = FetchError::Network("timeout".into());
        assert_eq!(error.clone(), error);
    }

    #[test]
    fn test_invalid_url_error() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let error: ClientError = parse_err.into();
        assert!(error.to_string().starts_with("Invalid catalog URL"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FetchError>();
        assert_send_sync::<ClientError>();
    }
}
