fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use pagesync_protocol::{
        ApiEnvelope, AssetUpload, HashesRequest, UploadTokenResponse,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn read_fixture(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&read_fixture(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let text = read_fixture(name);
        let fixture: serde_json::Value = serde_json::from_str(&text).unwrap();
        let parsed: T = serde_json::from_str(&text)
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&parsed).unwrap())
                .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  wire: {fixture}\n  rust: {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_upload_token_response() {
        let token: UploadTokenResponse = roundtrip_test("upload_token_response.json");
        assert!(token.jwt.starts_with("eyJ"));
    }

    #[test]
    fn fixture_hashes_request() {
        let req: HashesRequest = roundtrip_test("hashes_request.json");
        assert_eq!(req.hashes.len(), 2);
    }

    #[test]
    fn fixture_upload_batch() {
        let batch: Vec<AssetUpload> = roundtrip_test("upload_batch.json");
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].value, b"Hello");
        assert_eq!(batch[1].value, b"<h1>hi</h1>");
        assert!(batch.iter().all(|e| e.base64));
    }

    #[test]
    fn fixture_envelope_check_missing() {
        let env: ApiEnvelope = roundtrip_test("envelope_check_missing.json");
        assert!(env.success);
        let missing: Vec<String> = env.parse_result().unwrap().unwrap();
        assert_eq!(missing, vec!["e5e943f01929441dfbb0d4956a759fda"]);
    }

    #[test]
    fn fixture_envelope_auth_error() {
        let env: ApiEnvelope = roundtrip_test("envelope_auth_error.json");
        assert!(!env.success);
        assert!(env.result.is_none());
        assert_eq!(
            env.error_summary(),
            "8000000: Authorization error: token expired"
        );
    }

    #[test]
    fn envelope_null_result_is_absent() {
        let env: ApiEnvelope =
            serde_json::from_str(r#"{"success":true,"errors":[],"messages":[],"result":null}"#)
                .unwrap();
        assert!(env.result.is_none());
    }

    /// Keys must match what the store computes for the same content.
    #[test]
    fn fixture_content_hashes() {
        let cases = load_fixture("content_hashes.json");
        let cases = cases.as_array().unwrap();
        assert!(!cases.is_empty());

        for case in cases {
            let content = case["content"].as_str().unwrap();
            let extension = case["extension"].as_str().unwrap();
            let expected = case["hash"].as_str().unwrap();
            assert_eq!(
                pagesync_assets::content_hash(content.as_bytes(), extension),
                expected,
                "hash mismatch for {content:?} with extension {extension:?}"
            );
        }
    }

    /// Upload entries carry the same key the scanner would assign.
    #[test]
    fn upload_batch_keys_match_content() {
        let batch: Vec<AssetUpload> =
            serde_json::from_str(&read_fixture("upload_batch.json")).unwrap();
        let extensions = ["txt", "html"];
        for (entry, ext) in batch.iter().zip(extensions) {
            assert_eq!(entry.key, pagesync_assets::content_hash(&entry.value, ext));
        }
    }
}
