use std::fs;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("chatbridge crate should live at workspace root/chatbridge")
        .to_path_buf()
}

fn member_names(manifest: &str) -> Vec<String> {
    let start = manifest.find("members = [").expect("workspace members");
    let rest = &manifest[start..];
    let end = rest.find(']').expect("closing bracket");
    rest[..end]
        .lines()
        .skip(1)
        .map(|line| line.trim().trim_end_matches(',').trim_matches('"').to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[test]
fn every_member_has_a_manifest() {
    let root = workspace_root();
    let manifest = fs::read_to_string(root.join("Cargo.toml")).expect("root manifest");
    let members = member_names(&manifest);
    assert!(members.contains(&"chatbridge-server".to_string()));

    for member in members {
        let path = root.join(&member).join("Cargo.toml");
        assert!(path.exists(), "member manifest missing: {member}");
    }
}

#[test]
fn facade_features_cover_optional_crates() {
    let manifest = fs::read_to_string(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"))
        .expect("facade manifest");
    for feature in ["llm", "prompt", "auth", "server"] {
        let expected = format!("dep:chatbridge-{feature}");
        assert!(
            manifest.contains(&expected),
            "feature {feature} should enable {expected}"
        );
    }
}

#[test]
fn default_features_expose_providers_and_prompts() {
    use chatbridge::prelude::*;

    let client = OllamaClient::new("http://localhost:11434").expect("client");
    assert_eq!(client.base_url(), "http://localhost:11434");
    assert!(!client.has_api_key());

    let registry = ProviderRegistry::builder().ollama(client).build();
    assert_eq!(registry.active_provider(), chatbridge::llm::ProviderKind::Ollama);

    let reasoning = chatbridge::prompt::REASONING_MODEL_ID;
    assert_eq!(reasoning, "chat-model-reasoning");

    let history = parse_messages(&serde_json::json!([{"role": "user", "content": "hi"}]))
        .expect("messages");
    assert_eq!(history, vec![Message::user("hi")]);
}
