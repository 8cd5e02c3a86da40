use fetchmock::prelude::*;

fn get(registry: &Registry, url: &str) -> String {
    registry.handle(RequestPayload::new("GET", url)).body_string()
}

#[test]
fn specific_handler_registered_first_wins_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    server.get("/users/:id", HandlerConfig::new().path_param("id", "1").body("Fred"));
    server.get("/users/:id", "Unknown");

    // Act & Assert
    assert_eq!(get(&registry, "https://api.test/users/1"), "Fred");
    assert_eq!(get(&registry, "https://api.test/users/2"), "Unknown");
}

#[test]
fn general_handler_registered_first_shadows_specific_one_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let general = server.get("/users/:id", "Unknown");
    let specific = server.get("/users/:id", HandlerConfig::new().path_param("id", "1").body("Fred"));

    // Act & Assert
    assert_eq!(get(&registry, "https://api.test/users/1"), "Unknown");
    general.assert();
    specific.assert_hits(0);
}

#[test]
fn path_param_mismatch_falls_through_to_404_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    server.get(
        "/orgs/:org/repos/:repo",
        HandlerConfig::new().path_param("org", "rust-lang").body("repo"),
    );

    // Act
    let matched = registry.handle(RequestPayload::new("GET", "https://api.test/orgs/rust-lang/repos/cargo"));
    let unmatched = registry.handle(RequestPayload::new("GET", "https://api.test/orgs/other/repos/cargo"));

    // Assert
    assert_eq!(matched.body_string(), "repo");
    assert_eq!(unmatched.status, 404);
}

#[test]
fn trailing_slash_and_encoding_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/files/:name", HandlerConfig::new().path_param("name", "a b"));

    // Act
    let response = registry.handle(RequestPayload::new("GET", "https://api.test/files/a%20b/"));

    // Assert
    assert_eq!(response.status, 200);
    m.assert();
}

#[test]
fn segment_count_must_match_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/users/:id", "user");

    // Act
    let too_long = registry.handle(RequestPayload::new("GET", "https://api.test/users/1/posts"));
    let too_short = registry.handle(RequestPayload::new("GET", "https://api.test/users"));

    // Assert
    assert_eq!(too_long.status, 404);
    assert_eq!(too_short.status, 404);
    m.assert_hits(0);
}

#[test]
fn undeclared_path_param_is_rejected_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();

    // Act
    let result = server.try_mock(
        "GET",
        "/users/:id",
        HandlerConfig::new().path_param("name", "Fred"),
    );

    // Assert
    assert!(matches!(result, Err(fetchmock::Error::UnknownPathParam { .. })));
}

#[test]
fn path_template_can_be_used_directly_test() {
    let template = fetchmock::PathTemplate::compile("/users/:id/posts/:post").unwrap();

    let result = template.match_path("/users/7/posts/42");

    assert!(result.is_match);
    assert_eq!(result.params.get("id").unwrap(), "7");
    assert_eq!(result.params.get("post").unwrap(), "42");
    assert!(!template.match_path("/users/7/comments/42").is_match);
}

#[test]
fn dot_segments_are_rejected_test() {
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();

    for pattern in ["/files/../x", "/files/./x", "/files/%2e%2e/x"] {
        assert!(
            matches!(
                server.try_mock("GET", pattern, "A"),
                Err(fetchmock::Error::InvalidPattern { .. })
            ),
            "pattern '{}' should be rejected",
            pattern
        );
    }
}
