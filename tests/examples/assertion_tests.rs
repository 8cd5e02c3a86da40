use fetchmock::prelude::*;

#[test]
fn assert_hits_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/ping", "pong");

    // Act
    for _ in 0..3 {
        registry.handle(RequestPayload::new("GET", "https://api.test/ping"));
    }

    // Assert
    m.assert_hits(3);
    assert_eq!(m.hits(), 3);
}

#[test]
#[should_panic(expected = "0 of 1 expected requests matched handler")]
fn assert_fails_with_closest_match_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/search", HandlerConfig::new().search_param("q", "rust"));

    // Act
    registry.handle(RequestPayload::new("GET", "https://api.test/search?q=go"));

    // Assert
    m.assert();
}

#[test]
#[should_panic(expected = "Search Parameter Mismatch")]
fn assert_output_names_the_mismatch_test() {
    let _ = env_logger::try_init();

    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.get("/search", HandlerConfig::new().search_param("q", "rust"));

    registry.handle(RequestPayload::new("GET", "https://api.test/search?q=go"));

    m.assert();
}

#[test]
#[should_panic(expected = "1 of the registered handlers were never called")]
fn assert_all_called_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let called = server.get("/a", "A");
    let uncalled = server.get("/b", "B");

    // Act
    registry.handle(RequestPayload::new("GET", "https://api.test/a"));

    // Assert
    assert_all_called(&[called, uncalled]);
}

#[test]
#[should_panic(expected = "GET /b")]
fn server_assert_all_called_test() {
    let _ = env_logger::try_init();

    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    server.get("/a", "A");
    server.get("/b", "B");

    registry.handle(RequestPayload::new("GET", "https://api.test/a"));

    server.assert_all_called();
}

#[test]
fn closest_match_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    server.get("/users/:id", HandlerConfig::new().path_param("id", "1"));

    // Act
    registry.handle(RequestPayload::new("GET", "https://api.test/users/2"));
    registry.handle(RequestPayload::new("POST", "https://api.test/orders"));

    // Assert
    let unmatched = server.unmatched_requests();
    assert_eq!(unmatched.len(), 2);
    assert_eq!(unmatched[0].url(), "https://api.test/users/2");
}
