use fetchmock::prelude::*;

#[test]
fn search_param_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/test", HandlerConfig::new().search_param("id", "hello"));

    // Act
    let missing = registry.handle(RequestPayload::new("GET", "https://api.test/test"));
    let present = registry.handle(RequestPayload::new("GET", "https://api.test/test?id=hello"));

    // Assert
    assert_eq!(missing.status, 404);
    assert_eq!(present.status, 200);
    m.assert();
}

#[test]
fn additional_search_params_are_ignored_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/search", HandlerConfig::new().search_param("q", "rust").body("results"));

    // Act
    let response = registry.handle(RequestPayload::new(
        "GET",
        "https://api.test/search?page=2&q=rust&lang=en",
    ));

    // Assert
    m.assert();
    assert_eq!(response.body_string(), "results");
}

#[test]
fn embedded_search_params_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/test?id=hello", "found");

    // Act
    let matched = registry.handle(RequestPayload::new("GET", "https://api.test/test?id=hello"));
    let wrong_value = registry.handle(RequestPayload::new("GET", "https://api.test/test?id=bye"));

    // Assert
    assert_eq!(matched.body_string(), "found");
    assert_eq!(wrong_value.status, 404);
    m.assert();
}

#[test]
fn explicit_search_params_override_embedded_ones_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/test?id=embedded", HandlerConfig::new().search_param("id", "explicit"));

    // Act
    let embedded = registry.handle(RequestPayload::new("GET", "https://api.test/test?id=embedded"));
    let explicit = registry.handle(RequestPayload::new("GET", "https://api.test/test?id=explicit"));

    // Assert
    assert_eq!(embedded.status, 404);
    assert_eq!(explicit.status, 200);
    m.assert();
}

#[test]
fn encoded_values_are_compared_decoded_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/search", HandlerConfig::new().search_param("q", "hello world"));

    // Act
    registry.handle(RequestPayload::new("GET", "https://api.test/search?q=hello%20world"));
    registry.handle(RequestPayload::new("GET", "https://api.test/search?q=hello+world"));

    // Assert
    m.assert_hits(2);
}

#[test]
fn search_params_match_function_test() {
    let query = vec![
        ("tag".to_string(), "a".to_string()),
        ("tag".to_string(), "b".to_string()),
    ];

    let mut required = std::collections::BTreeMap::new();
    required.insert("tag".to_string(), "b".to_string());
    assert!(fetchmock::search_params_match(&query, &required));

    required.insert("page".to_string(), "1".to_string());
    assert!(!fetchmock::search_params_match(&query, &required));
}

#[test]
fn plus_sign_in_explicit_search_param_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let explicit = server.get("/x", HandlerConfig::new().search_param("q", "a+b").body("explicit"));
    let embedded = server.get("/y?q=a+b", "embedded");

    // Act
    let explicit_response = registry.handle(RequestPayload::new("GET", "https://api.test/x?q=a+b"));
    let embedded_response = registry.handle(RequestPayload::new("GET", "https://api.test/y?q=a+b"));

    // Assert
    assert_eq!(explicit_response.body_string(), "explicit");
    assert_eq!(embedded_response.body_string(), "embedded");
    explicit.assert();
    embedded.assert();
}
