use std::collections::HashSet;

use blog_backend::messages;
use serde_json::json;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::add_tag;
use crate::helpers::create;
use crate::helpers::lookup;
use crate::helpers::no_subscriber;
use crate::helpers::spawn_app;
use crate::helpers::subscriber;

#[tokio::test]
async fn new_subscriber() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .expect(1)
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(subscriber("sub_1"))
        .expect(1)
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(subscriber("sub_1"))
        .expect(2)
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "devops" }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::SUBSCRIPTION_NEW);
    // only set for existing subscribers
    assert!(body.get("alreadySubscribed").is_none());

    let tags: HashSet<String> = app.sent_tags().await.into_iter().collect();
    assert_eq!(tags, HashSet::from(["new".to_string(), "devops".to_string()]));
}

#[tokio::test]
async fn existing_subscriber() {
    let app = spawn_app().await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(subscriber("sub_1"))
        .expect(0)
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(subscriber("sub_1"))
        .expect(1)
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "kubernetes" }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::SUBSCRIPTION_UPDATED);
    assert_eq!(body["alreadySubscribed"], true);
    assert_eq!(app.sent_tags().await, vec!["kubernetes".to_string()]);
}

#[tokio::test]
async fn source_is_forwarded() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;

    for (source, expected) in [
        (json!("newsletter"), "newsletter"),
        (json!(null), "landing_page"),
        (json!(""), "landing_page"),
    ] {
        app.post_subscribe(&json!({ "email": "reader@example.com", "utmSource": source }))
            .await;

        let requests = app.registry_server.received_requests().await.unwrap();
        let created = requests
            .iter()
            .filter(|r| r.method.as_str() == "POST" && r.url.path().ends_with("/subscriptions"))
            .last()
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&created.body).unwrap();
        assert_eq!(body["utm_source"], expected);
        assert_eq!(body["reactivate_existing"], true);
    }
}

#[tokio::test]
async fn blank_tag_is_ignored() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(subscriber("sub_1"))
        .expect(1)
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "  " }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(app.sent_tags().await, vec!["new".to_string()]);
}

#[tokio::test]
async fn invalid_email() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.registry_server)
        .await;

    for (body, msg) in [
        (json!({}), "missing email"),
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "not-an-email" }), "no @"),
        (json!({ "email": "reader@example" }), "no domain suffix"),
        (json!({ "email": "reader@example.c" }), "one letter suffix"),
    ] {
        let resp = app.post_subscribe(&body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["message"], messages::INVALID_EMAIL, "{msg}");
    }
}

#[tokio::test]
async fn malformed_body() {
    let app = spawn_app().await;

    let resp = app.post_raw("/api/subscribe", "{not json").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], messages::INCOMPLETE_DATA);

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com", "utmSource": "billboard" }))
        .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn registry_failure() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com" }))
        .await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::SUBSCRIPTION_ERROR);
}

#[tokio::test]
async fn tag_failure() {
    let app = spawn_app().await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(ResponseTemplate::new(400))
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "devops" }))
        .await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::TAGS_UPDATE_ERROR);
}

#[tokio::test]
async fn repeated_subscription_is_idempotent() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .up_to_n_times(1)
        .mount(&app.registry_server)
        .await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    create()
        .respond_with(subscriber("sub_1"))
        .expect(1)
        .mount(&app.registry_server)
        .await;
    add_tag()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;

    let first = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "a" }))
        .await;
    let second = app
        .post_subscribe(&json!({ "email": "reader@example.com", "tag": "b" }))
        .await;
    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 200);

    let second: serde_json::Value = second.json().await.unwrap();
    assert_eq!(second["alreadySubscribed"], true);

    let tags: HashSet<String> = app.sent_tags().await.into_iter().collect();
    let expected: HashSet<String> = ["new", "a", "b"].iter().map(|t| t.to_string()).collect();
    assert_eq!(tags, expected);
}
