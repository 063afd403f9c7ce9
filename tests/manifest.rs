#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use selfup::errors::UpdateError;
    use selfup::manifest::fetch_manifest;
    use selfup::requester::Requester;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies and records every requested URL.
    struct MockRequester {
        responses: HashMap<String, Option<Vec<u8>>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockRequester {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn on(mut self, url: &str, body: &[u8]) -> Self {
            self.responses.insert(url.to_string(), Some(body.to_vec()));
            self
        }

        /// Success with no body: the transport contract violation.
        fn on_nil(mut self, url: &str) -> Self {
            self.responses.insert(url.to_string(), None);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Requester for MockRequester {
        async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
            self.requests.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Some(body)) => Ok(Some(body.clone())),
                Some(None) => Ok(None),
                None => bail!("bad http status from {}: 404 Not Found", url),
            }
        }
    }

    fn manifest_json(version: &str, digest: &[u8]) -> Vec<u8> {
        format!(r#"{{"Version":"{}","Sha256":"{}"}}"#, version, STANDARD.encode(digest)).into_bytes()
    }

    #[tokio::test]
    async fn test_fetch_manifest_parses_version_and_digest() {
        let digest = [7u8; 32];
        let requester = MockRequester::new().on(
            "http://api.test/myapp/linux-amd64.json",
            &manifest_json("2.0", &digest),
        );

        let manifest = fetch_manifest(&requester, "http://api.test/", "myapp", "linux-amd64")
            .await
            .unwrap();

        assert_eq!(manifest.version, "2.0");
        assert_eq!(manifest.sha256, digest);
    }

    #[tokio::test]
    async fn test_fetch_manifest_escapes_path_segments() {
        let digest = [1u8; 32];
        let requester = MockRequester::new().on(
            "http://api.test/my%20app/linux-amd64.json",
            &manifest_json("2.0", &digest),
        );

        fetch_manifest(&requester, "http://api.test/", "my app", "linux-amd64")
            .await
            .unwrap();

        assert_eq!(requester.requests(), vec!["http://api.test/my%20app/linux-amd64.json"]);
    }

    #[tokio::test]
    async fn test_fetch_manifest_rejects_wrong_digest_length() {
        let requester = MockRequester::new().on(
            "http://api.test/myapp/linux-amd64.json",
            &manifest_json("2.0", &[1u8; 16]),
        );

        let err = fetch_manifest(&requester, "http://api.test/", "myapp", "linux-amd64")
            .await
            .unwrap_err();

        assert!(matches!(err, UpdateError::Manifest(_)));
    }

    #[tokio::test]
    async fn test_fetch_manifest_rejects_malformed_json() {
        let requester = MockRequester::new().on("http://api.test/myapp/linux-amd64.json", b"not json at all");

        let err = fetch_manifest(&requester, "http://api.test/", "myapp", "linux-amd64")
            .await
            .unwrap_err();

        assert!(matches!(err, UpdateError::Manifest(_)));
    }

    #[tokio::test]
    async fn test_fetch_manifest_rejects_nil_body_as_contract_violation() {
        let requester = MockRequester::new().on_nil("http://api.test/myapp/linux-amd64.json");

        let err = fetch_manifest(&requester, "http://api.test/", "myapp", "linux-amd64")
            .await
            .unwrap_err();

        assert!(matches!(err, UpdateError::Manifest(_)));
        assert!(err.to_string().contains("no body"));
    }

    #[tokio::test]
    async fn test_fetch_manifest_propagates_transport_failure() {
        let requester = MockRequester::new();

        let err = fetch_manifest(&requester, "http://api.test/", "myapp", "linux-amd64")
            .await
            .unwrap_err();

        assert!(matches!(err, UpdateError::Manifest(_)));
        assert!(err.to_string().contains("404"));
    }
}
