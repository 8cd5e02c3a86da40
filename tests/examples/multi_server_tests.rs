use fetchmock::prelude::*;

#[test]
fn multi_server_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server_a = registry.create_server("https://a.test").unwrap();
    let server_b = registry.create_server("https://b.test").unwrap();

    let mock_a = server_a.get("/test", "A");
    let mock_b = server_b.get("/test", "B");

    // Act
    let response_a = registry.handle(RequestPayload::new("GET", "https://a.test/test"));
    let response_b = registry.handle(RequestPayload::new("GET", "https://b.test/test"));

    // Assert
    assert_eq!(response_a.body_string(), "A");
    assert_eq!(response_b.body_string(), "B");
    mock_a.assert();
    mock_b.assert();
}

#[test]
fn base_path_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let v1 = registry.create_server("https://api.test/v1").unwrap();
    let v2 = registry.create_server("https://api.test/v2/").unwrap();

    let users_v1 = v1.get("/users", "v1 users");
    let users_v2 = v2.get("/users", "v2 users");

    // Act
    let r1 = registry.handle(RequestPayload::new("GET", "https://api.test/v1/users"));
    let r2 = registry.handle(RequestPayload::new("GET", "https://api.test/v2/users"));
    let unhandled = registry.resolve(RequestPayload::new("GET", "https://api.test/v3/users"));

    // Assert
    assert_eq!(r1.body_string(), "v1 users");
    assert_eq!(r2.body_string(), "v2 users");
    assert_eq!(unhandled, Resolution::Unhandled);
    users_v1.assert();
    users_v2.assert();
    assert_eq!(v2.url("/users"), "https://api.test/v2/users");
}

#[test]
fn duplicate_server_test() {
    let _ = env_logger::try_init();

    let registry = Registry::new();
    registry.create_server("https://a.test").unwrap();

    let result = registry.create_server("https://a.test/");

    assert!(matches!(result, Err(fetchmock::Error::DuplicateBaseUrl(_))));
    assert_eq!(registry.servers().len(), 1);
}

#[test]
fn server_lookup_test() {
    let registry = Registry::new();
    registry.create_server("https://a.test").unwrap();

    let server = registry.server("https://A.test/").unwrap();

    assert_eq!(server.base_url(), "https://a.test");
    assert!(registry.server("https://b.test").is_none());
}
