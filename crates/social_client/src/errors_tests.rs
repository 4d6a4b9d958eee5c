use super::*;

#[test]
fn test_api_error_display() {
    let error = Error::Api {
        status: 403,
        body: r#"{"detail":"duplicate content"}"#.to_string(),
    };

    assert_eq!(
        error.to_string(),
        r#"API returned 403: {"detail":"duplicate content"}"#
    );
}

#[test]
fn test_invalid_base_url_display() {
    let error = Error::InvalidBaseUrl {
        url: "not a url".to_string(),
        reason: "relative URL without a base".to_string(),
    };

    assert!(error.to_string().contains("not a url"));
}
