use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use tutorchat::config::ProviderConfig;
use tutorchat::providers::OpenAiCompatProvider;
use tutorchat::relay::CompletionRelay;

#[allow(dead_code)]
pub const TEST_KEY: &str = "gsk_test_key";

/// SSE body the way the completion API streams a reply
#[allow(dead_code)]
pub fn completion_sse_body(fragments: &[&str]) -> String {
    let mut body = String::from(
        "data: {\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
    );
    for fragment in fragments {
        let chunk = serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "delta": { "content": fragment } }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str(
        "data: {\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    );
    body.push_str("data: [DONE]\n\n");
    body
}

#[allow(dead_code)]
pub fn relay_for(api_base: &str) -> CompletionRelay {
    relay_with_timeout(api_base, 5)
}

#[allow(dead_code)]
pub fn relay_with_timeout(api_base: &str, timeout_seconds: u64) -> CompletionRelay {
    let config = ProviderConfig {
        api_base: api_base.to_string(),
        timeout_seconds,
        ..Default::default()
    };
    let provider = OpenAiCompatProvider::new(&config, TEST_KEY.to_string())
        .expect("failed to build provider");
    CompletionRelay::new(Arc::new(provider))
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
