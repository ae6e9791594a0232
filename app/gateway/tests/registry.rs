//! Tests for provider resolution and caching.

use otter_gateway::{
    ConfigError, CustomEndpoint, GatewayConfig, Provider, ProviderKind, ProviderRegistry,
    registry::parse_provider,
};

fn registry() -> ProviderRegistry {
    ProviderRegistry::new(llm::Client::new())
}

fn config_with_key(provider: ProviderKind, key: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.llm.provider = provider;
    config.llm.api_key = key.to_owned();
    config
}

#[test]
fn parses_known_provider_names() {
    assert_eq!(parse_provider("Anthropic").unwrap(), ProviderKind::Anthropic);
    assert_eq!(parse_provider("OpenAI").unwrap(), ProviderKind::OpenAI);
    assert_eq!(parse_provider("Google").unwrap(), ProviderKind::Google);
    assert_eq!(
        parse_provider("OpenAICompatible").unwrap(),
        ProviderKind::OpenAICompatible
    );
}

#[test]
fn unknown_provider_name_is_an_error() {
    let err = parse_provider("Frontier9000").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownProvider(_)));
    assert!(err.to_string().contains("Frontier9000"));
}

#[test]
fn configured_key_is_used_and_cached() {
    let registry = registry();
    let config = config_with_key(ProviderKind::Anthropic, "sk-ant-configured");

    assert!(registry.is_empty());
    let first = registry.resolve(&config, ProviderKind::Anthropic, None, None);
    assert!(matches!(first, Ok(Provider::Anthropic(_))));
    assert_eq!(registry.len(), 1);

    // Second resolve hits the cache.
    registry
        .resolve(&config, ProviderKind::Anthropic, None, None)
        .unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn clear_drops_cached_providers() {
    let registry = registry();
    let config = config_with_key(ProviderKind::OpenAI, "sk-openai-configured");

    registry
        .resolve(&config, ProviderKind::OpenAI, None, None)
        .unwrap();
    assert_eq!(registry.len(), 1);

    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn custom_key_bypasses_the_cache() {
    let registry = registry();
    let config = config_with_key(ProviderKind::Anthropic, "sk-ant-configured");

    registry
        .resolve(&config, ProviderKind::Anthropic, Some("sk-user-supplied"), None)
        .unwrap();
    assert!(registry.is_empty());
}

#[test]
fn missing_key_is_a_config_error() {
    let registry = registry();
    // Default provider is Anthropic, so the configured key does not apply
    // to Google; the environment variable is the only fallback.
    let config = config_with_key(ProviderKind::Anthropic, "sk-ant-configured");
    unsafe { std::env::remove_var("GOOGLE_GENERATIVE_AI_API_KEY") };

    let err = registry
        .resolve(&config, ProviderKind::Google, None, None)
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("Google")));
}

#[test]
fn compatible_endpoint_uses_custom_base_url() {
    let registry = registry();
    let config = GatewayConfig::default();
    let endpoint = CustomEndpoint {
        base_url: Some("http://localhost:9999/v1/".to_owned()),
        api_key: Some("local-key".to_owned()),
    };

    let provider = registry
        .resolve(
            &config,
            ProviderKind::OpenAICompatible,
            None,
            Some(&endpoint),
        )
        .unwrap();
    let Provider::OpenAi(provider) = provider else {
        panic!("expected an OpenAI-compatible provider");
    };
    assert_eq!(
        provider.endpoint(),
        "http://localhost:9999/v1/chat/completions"
    );
    // Compatible providers are never cached.
    assert!(registry.is_empty());
}

#[test]
fn compatible_endpoint_works_without_a_key() {
    let registry = registry();
    let mut config = GatewayConfig::default();
    config.llm.base_url = Some("http://localhost:11434/v1".to_owned());
    unsafe { std::env::remove_var("OPENAI_COMPATIBLE_BASE_URL") };
    unsafe { std::env::remove_var("OPENAI_COMPATIBLE_API_KEY") };

    let provider = registry
        .resolve(&config, ProviderKind::OpenAICompatible, None, None)
        .unwrap();
    let Provider::OpenAi(provider) = provider else {
        panic!("expected an OpenAI-compatible provider");
    };
    assert_eq!(
        provider.endpoint(),
        "http://localhost:11434/v1/chat/completions"
    );
}

#[test]
fn google_resolves_to_openai_compatible_transport() {
    let registry = registry();
    let config = config_with_key(ProviderKind::Google, "g-key");

    let provider = registry
        .resolve(&config, ProviderKind::Google, None, None)
        .unwrap();
    let Provider::OpenAi(provider) = provider else {
        panic!("expected the OpenAI-compatible transport");
    };
    assert!(provider.endpoint().contains("generativelanguage.googleapis.com"));
}
