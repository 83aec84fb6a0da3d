use blog_backend::messages;
use serde_json::json;
use wiremock::matchers::any;
use wiremock::matchers::header;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::assert_is_redirect_to;
use crate::helpers::lookup;
use crate::helpers::no_subscriber;
use crate::helpers::remove;
use crate::helpers::spawn_app;
use crate::helpers::subscriber;

#[tokio::test]
async fn unsubscribe_ok() {
    let app = spawn_app().await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    remove("sub_1")
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_unsubscribe(&json!({ "email": "reader@example.com" }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], messages::UNSUBSCRIPTION);
}

#[tokio::test]
async fn unsubscribe_unknown_email() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .mount(&app.registry_server)
        .await;
    remove("sub_1")
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_unsubscribe(&json!({ "email": "reader@example.com" }))
        .await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], messages::EMAIL_NOT_SUBSCRIBED);
}

#[tokio::test]
async fn removal_refused() {
    let app = spawn_app().await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    // anything but 204 is a failure, even a 200
    remove("sub_1")
        .respond_with(ResponseTemplate::new(200))
        .mount(&app.registry_server)
        .await;

    let resp = app
        .post_unsubscribe(&json!({ "email": "reader@example.com" }))
        .await;
    assert_eq!(resp.status().as_u16(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::SERVER_ERROR);
}

#[tokio::test]
async fn unsubscribe_invalid_email() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&app.registry_server)
        .await;

    let resp = app.post_unsubscribe(&json!({ "email": "nope" })).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], messages::INVALID_EMAIL);

    let resp = app.get_unsubscribe("nope").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], messages::INVALID_EMAIL);
}

#[tokio::test]
async fn unsubscribe_link_redirects() {
    let app = spawn_app().await;
    lookup()
        .respond_with(subscriber("sub_1"))
        .mount(&app.registry_server)
        .await;
    remove("sub_1")
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.registry_server)
        .await;

    let resp = app.get_unsubscribe("reader+blog@example.com").await;
    assert_is_redirect_to(&resp, messages::UNSUBSCRIBE_SUCCESS_PAGE);
}

#[tokio::test]
async fn unsubscribe_link_for_unknown_email() {
    let app = spawn_app().await;
    lookup()
        .respond_with(no_subscriber())
        .mount(&app.registry_server)
        .await;

    let resp = app.get_unsubscribe("reader@example.com").await;
    assert_is_redirect_to(&resp, messages::NOT_FOUND_PAGE);
}
