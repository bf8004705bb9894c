use crate::helpers::{email_endpoint, spawn_app, IO_TIMEOUT};
use serde_json::json;
use wiremock::ResponseTemplate;

fn ana() -> serde_json::Value {
    json!({"Name": "Ana", "Email": "ana@x.com", "Message": "Hi"})
}

#[tokio::test]
async fn register_returns_201_and_echoes_the_user_when_everything_is_healthy() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": 201,
            "message": "User registered successfully",
            "emailSent": true,
            "user": {"Name": "Ana", "Email": "ana@x.com"}
        })
    );
}

#[tokio::test]
async fn register_persists_the_registration() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    // Act
    app.post_register(&ana()).await;

    // Assert
    let items = app.stored_items().await;
    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item["Type"]["S"], "Registration");
    assert_eq!(item["Name"]["S"], "Ana");
    assert_eq!(item["Email"]["S"], "ana@x.com");
    assert_eq!(item["Message"]["S"], "Hi");
    assert!(item["PK"]["S"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn register_returns_500_and_never_emails_when_the_store_rejects_the_write() {
    // Arrange
    let app = spawn_app().await;
    app.store_rejects_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"status": 500, "error": "Error registering user"})
    );
    // Mock asserts on drop
}

#[tokio::test]
async fn register_returns_500_when_the_store_does_not_answer_in_time() {
    // Arrange
    let app = spawn_app().await;
    app.store_hangs().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn register_still_returns_201_when_the_email_provider_fails() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], 201);
    assert_eq!(body["emailSent"], false);
    assert_eq!(body["user"], json!({"Name": "Ana", "Email": "ana@x.com"}));
}

#[tokio::test]
async fn register_reports_email_not_sent_when_the_provider_rejects_the_token() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ErrorCode": 10,
            "Message": "Bad or missing Server API token."
        })))
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["emailSent"], false);
}

#[tokio::test]
async fn register_reports_email_not_sent_when_the_provider_does_not_answer_in_time() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200).set_delay(IO_TIMEOUT * 3))
        .mount(&app.email_server)
        .await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["emailSent"], false);
    assert_eq!(app.stored_items().await.len(), 1);
}

#[tokio::test]
async fn identical_requests_create_distinct_records() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    // Act
    for _ in 0..2 {
        let response = app.post_register(&ana()).await;
        assert_eq!(201, response.status().as_u16());
    }

    // Assert
    let items = app.stored_items().await;
    assert_eq!(items.len(), 2);
    assert_ne!(items[0]["PK"], items[1]["PK"]);
}

#[tokio::test]
async fn missing_fields_are_accepted_and_left_out_of_the_record() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        ("{}".to_string(), "an empty object"),
        (String::new(), "an empty body"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app
            .post_register_raw("application/json", body)
            .await;

        // Assert
        assert_eq!(
            201,
            response.status().as_u16(),
            "The API did not accept {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["user"], json!({}));
    }

    for item in app.stored_items().await {
        assert!(item.get("Name").is_none());
        assert!(item.get("Email").is_none());
        assert!(item.get("Message").is_none());
    }
}

#[tokio::test]
async fn urlencoded_submissions_are_accepted() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_register_raw(
            "application/x-www-form-urlencoded",
            "Name=le%20guin&Email=ursula_le_guin%40gmail.com&Message=hello".to_string(),
        )
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["user"],
        json!({"Name": "le guin", "Email": "ursula_le_guin@gmail.com"})
    );
}

#[tokio::test]
async fn bodies_without_form_fields_register_an_empty_submission() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        ("text/plain", "hello", "a plain text body"),
        ("application/json", "[1, 2, 3]", "a JSON array"),
    ];

    for (content_type, body, description) in test_cases {
        // Act
        let response = app.post_register_raw(content_type, body.to_string()).await;

        // Assert
        assert_eq!(
            201,
            response.status().as_u16(),
            "The API did not accept {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["user"], json!({}));
    }

    assert_eq!(app.stored_items().await.len(), 2);
}

#[tokio::test]
async fn content_type_matching_ignores_case() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_register_raw(
            "Application/X-WWW-Form-Urlencoded",
            "Name=Ana&Email=ana%40x.com".to_string(),
        )
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"], json!({"Name": "Ana", "Email": "ana@x.com"}));
}

#[tokio::test]
async fn non_string_fields_are_stored_as_text() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.email_server)
        .await;

    // Act
    let response = app
        .post_register(&json!({"Name": 42, "Email": "n@x.com", "Message": null}))
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());
    let item = &app.stored_items().await[0];
    assert_eq!(item["Name"]["S"], "42");
    assert!(item.get("Message").is_none());
}

#[tokio::test]
async fn malformed_bodies_return_400_without_touching_store_or_email() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (r#"{"Name": "Ana""#, "truncated JSON"),
        ("42", "a bare JSON number"),
        ("not json at all", "plain text"),
    ];

    for (body, description) in test_cases {
        // Act
        let response = app
            .post_register_raw("application/json", body.to_string())
            .await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            description
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], 400);
    }

    assert!(app.stored_items().await.is_empty());
}

#[tokio::test]
async fn notification_is_sent_to_the_operator_with_escaped_markup() {
    // Arrange
    let app = spawn_app().await;
    app.store_accepts_writes().await;
    email_endpoint()
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // Act
    app.post_register(&json!({
        "Name": "Ana",
        "Email": "ana@x.com",
        "Message": "<img src=x onerror=alert(1)>"
    }))
    .await;

    // Assert
    let emails = app.sent_emails().await;
    let email = &emails[0];
    assert_eq!(email["To"], app.operator_email.as_str());
    let html = email["HtmlBody"].as_str().unwrap();
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(!html.contains("<img"));
    let text = email["TextBody"].as_str().unwrap();
    assert!(text.contains("<img src=x onerror=alert(1)>"));
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    // Arrange
    let app = spawn_app().await;
    app.store_rejects_writes().await;

    // Act
    let response = app.post_register(&ana()).await;

    // Assert
    assert!(response.headers().get("x-request-id").is_some());
}
