// tests/dispatch.rs
//! Channel dispatcher behavior against mocked channel APIs: partial
//! failures stay partial, every destination gets its attempt.

use std::time::Duration;

use newsalert::digest::RenderedDigest;
use newsalert::notify::{dispatch_all, Dispatcher, EmailDispatcher, SmsDispatcher, TelegramDispatcher};
use wiremock::matchers::{basic_auth, body_json_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn digest() -> RenderedDigest {
    RenderedDigest {
        chat: "📰 <b>NewsAlert</b>\n1. Hello".to_string(),
        email_subject: "NewsAlert — World".to_string(),
        email_html: "<h3>NewsAlert</h3>".to_string(),
        sms: "NewsAlert\n1. Hello".to_string(),
    }
}

#[tokio::test]
async fn telegram_partial_failure_yields_one_success_one_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_string_contains("\"chat_id\":\"good\""))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_string_contains("\"chat_id\":\"bad\""))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"ok":false,"description":"chat not found"}"#),
        )
        .mount(&server)
        .await;

    let dispatcher = TelegramDispatcher::new("TOKEN".to_string(), vec!["good".into(), "bad".into()])
        .with_api_base(server.uri())
        .with_pause(Duration::ZERO);

    let results = dispatcher.dispatch(&digest()).await;
    assert_eq!(results.len(), 2);
    assert!(results[0].ok);
    assert!(!results[1].ok);
    assert!(results[1].detail.contains("chat not found"));
}

#[tokio::test]
async fn telegram_requires_ok_true_not_just_http_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":false}"#))
        .mount(&server)
        .await;

    let dispatcher = TelegramDispatcher::new("TOKEN".to_string(), vec!["x".into()])
        .with_api_base(server.uri())
        .with_pause(Duration::ZERO);

    let results = dispatcher.dispatch(&digest()).await;
    assert!(!results[0].ok);
}

#[tokio::test]
async fn telegram_sends_html_payload_with_preview_disabled() {
    let server = MockServer::start().await;
    let d = digest();
    let expected = serde_json::json!({
        "chat_id": "c1",
        "text": d.chat,
        "parse_mode": "HTML",
        "disable_web_page_preview": true,
    });
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_json_string(expected.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = TelegramDispatcher::new("TOKEN".to_string(), vec!["c1".into()])
        .with_api_base(server.uri())
        .with_pause(Duration::ZERO);
    let results = dispatcher.dispatch(&d).await;
    assert!(results[0].ok);
}

#[tokio::test]
async fn email_sends_one_request_per_recipient_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header("authorization", "Bearer SG.KEY"))
        .respond_with(ResponseTemplate::new(202))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = EmailDispatcher::new(
        "SG.KEY".to_string(),
        "bot@example.test".to_string(),
        vec!["a@example.test".into(), "b@example.test".into()],
    )
    .with_api_base(server.uri())
    .with_pause(Duration::ZERO);

    let results = dispatcher.dispatch(&digest()).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.ok));
}

#[tokio::test]
async fn sms_posts_form_body_with_basic_auth_per_recipient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2010-04-01/Accounts/SID/Messages.json"))
        .and(basic_auth("SID", "SECRET"))
        .and(body_string_contains("From=whatsapp%3A%2B1415"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = SmsDispatcher::new(
        "SID".to_string(),
        "SECRET".to_string(),
        "whatsapp:+1415".to_string(),
        vec!["whatsapp:+441".into(), "whatsapp:+442".into()],
    )
    .with_api_base(server.uri())
    .with_pause(Duration::ZERO);

    let results = dispatcher.dispatch(&digest()).await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.ok));
}

#[tokio::test]
async fn one_channel_failing_does_not_stop_the_others() {
    let server = MockServer::start().await;
    // Chat API down entirely; mail API healthy.
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let channels: Vec<Box<dyn Dispatcher>> = vec![
        Box::new(
            TelegramDispatcher::new("TOKEN".to_string(), vec!["c1".into()])
                .with_api_base(server.uri())
                .with_pause(Duration::ZERO),
        ),
        Box::new(
            EmailDispatcher::new(
                "SG.KEY".to_string(),
                "bot@example.test".to_string(),
                vec!["a@example.test".into()],
            )
            .with_api_base(server.uri())
            .with_pause(Duration::ZERO),
        ),
    ];

    let results = dispatch_all(&channels, &digest()).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results.iter().filter(|r| r.ok).count(), 1);
    assert_eq!(results.iter().filter(|r| !r.ok).count(), 1);
    assert_eq!(results[1].channel, "email");
    assert!(results[1].ok);
}
