use fetchmock::prelude::*;

#[test]
fn concurrent_requests_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let hit = server.get("/users/:id", HandlerConfig::new().path_param("id", "1").body("Fred"));
    let sibling = server.get("/users/:id", "Unknown");
    let threads = 8;

    // Act: Every thread sends the same request through its own registry clone
    std::thread::scope(|scope| {
        for _ in 0..threads {
            let registry = registry.clone();
            scope.spawn(move || {
                let response = registry.handle(RequestPayload::new("GET", "https://api.test/users/1"));
                assert_eq!(response.body_string(), "Fred");
            });
        }
    });

    // Assert
    hit.assert_hits(threads);
    assert_eq!(hit.sent_request().unwrap().url(), "https://api.test/users/1");
    assert_eq!(sibling.hits(), 0);
    assert!(sibling.sent_request().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_requests_test() {
    let _ = env_logger::try_init();

    // Arrange
    let registry = Registry::new();
    let server = registry.create_server("https://api.test").unwrap();
    let m = server.post("/events", HandlerConfig::new().status(202));

    // Act
    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let request = RequestPayload::new("POST", "https://api.test/events")
                    .with_body(format!("event {}", i));
                registry.handle_source_async(&request).await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().status, 202);
    }

    // Assert
    m.assert_hits(32);
    assert!(m.sent_request().unwrap().body_string().starts_with("event "));
}
