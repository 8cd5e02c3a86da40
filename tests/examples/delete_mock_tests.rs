use fetchmock::prelude::*;

#[test]
fn explicit_delete_mock_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let mut m = server.get("/health", HandlerConfig::new().status(205));

    // Act: Send the request
    let response = registry.handle(RequestPayload::new("GET", "https://api.test/health"));

    // Assert
    m.assert();
    assert_eq!(response.status, 205);

    // Delete the mock and send the request again
    m.delete();

    let response = registry.handle(RequestPayload::new("GET", "https://api.test/health"));

    // Assert that the request failed, because the mock has been deleted
    assert_eq!(response.status, 404);
    assert_eq!(m.hits(), 0);
}

#[test]
fn deleting_a_mock_exposes_later_ones_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let mut first = server.get("/users/:id", "first");
    let second = server.get("/users/:id", "second");

    // Act
    first.delete();
    let response = registry.handle(RequestPayload::new("GET", "https://api.test/users/1"));

    // Assert
    assert_eq!(response.body_string(), "second");
    second.assert();
}
