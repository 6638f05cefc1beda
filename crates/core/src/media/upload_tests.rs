//! Orchestrator tests over in-memory fakes of every seam.

use std::sync::Arc;
use std::time::Duration;

use crate::media::test_support::{
    FakeBroker, FakeSessions, FakeTransport, error_reply, ok_reply, session,
};
use crate::media::{
    Bucket, MediaError, MediaFile, MediaUploader, SessionAccessor, UploadStage, UploadTimeouts,
};

type Uploader = MediaUploader<FakeBroker, FakeTransport, FakeSessions>;

struct Harness {
    broker: Arc<FakeBroker>,
    transport: Arc<FakeTransport>,
    sessions: Arc<FakeSessions>,
}

impl Harness {
    fn new(broker: FakeBroker, transport: FakeTransport, sessions: FakeSessions) -> Self {
        Self {
            broker: Arc::new(broker),
            transport: Arc::new(transport),
            sessions: Arc::new(sessions),
        }
    }

    fn uploader(&self) -> Uploader {
        MediaUploader::new(
            Arc::clone(&self.broker),
            Arc::clone(&self.transport),
            SessionAccessor::new(Arc::clone(&self.sessions)),
        )
    }
}

fn photo() -> MediaFile {
    MediaFile::new("holiday.JPG", "image/jpeg", vec![7u8; 64])
}

#[tokio::test]
async fn test_upload_returns_public_url_and_generated_key() {
    let h = Harness::new(
        FakeBroker::new(vec![ok_reply("https://r2/put?sig", "https://media/posts/x.jpg")]),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );

    let result = h
        .uploader()
        .upload(&photo(), Bucket::Posts, None, None)
        .await
        .unwrap();

    assert_eq!(result.url, "https://media/posts/x.jpg");
    assert!(result.key.starts_with("posts/"));
    assert!(result.key.ends_with(".jpg"));

    let requests = h.broker.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key, result.key);
    assert_eq!(requests[0].content_type, "image/jpeg");
    assert_eq!(requests[0].file_size, 64);

    let puts = h.transport.calls();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].url, "https://r2/put?sig");
    assert_eq!(puts[0].size, 64);
}

#[tokio::test]
async fn test_upload_with_custom_path_and_token() {
    let h = Harness::new(
        FakeBroker::new(vec![ok_reply("https://put", "https://pub")]),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_out(),
    );

    let result = h
        .uploader()
        .upload(
            &photo(),
            Bucket::Avatars,
            Some("avatars/user-1/avatar.jpg"),
            Some("caller-token"),
        )
        .await
        .unwrap();

    assert_eq!(result.key, "avatars/user-1/avatar.jpg");
    assert_eq!(h.broker.tokens(), vec!["caller-token".to_string()]);
}

#[tokio::test]
async fn test_upload_retries_after_refresh_with_two_tokens() {
    let h = Harness::new(
        FakeBroker::new(vec![
            error_reply(401, Some("JWT expired")),
            ok_reply("https://put", "https://pub"),
        ]),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_in(session("first", 3_600)).refreshing_to(session("second", 3_600)),
    );

    let result = h
        .uploader()
        .upload(&photo(), Bucket::Posts, None, None)
        .await
        .unwrap();

    assert_eq!(result.url, "https://pub");
    let tokens = h.broker.tokens();
    assert_eq!(tokens.len(), 2);
    assert_ne!(tokens[0], tokens[1]);
    assert_eq!(h.transport.calls().len(), 1);
}

#[tokio::test]
async fn test_upload_refresh_failure_is_authentication_error() {
    let h = Harness::new(
        FakeBroker::new(vec![error_reply(401, None)]),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_in(session("first", 3_600)),
    );

    let err = h
        .uploader()
        .upload(&photo(), Bucket::Posts, None, None)
        .await
        .unwrap_err();

    assert!(err.is_unauthenticated());
    assert_eq!(h.broker.call_count(), 1);
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_slow_broker_times_out_before_transfer() {
    let h = Harness::new(
        FakeBroker::new(vec![ok_reply("https://put", "https://pub")])
            .with_delay(Duration::from_secs(5)),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );
    let uploader = h.uploader().with_timeouts(UploadTimeouts {
        target: Duration::from_millis(20),
        transfer: Duration::from_secs(1),
    });

    let err = uploader
        .upload(&photo(), Bucket::Videos, None, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MediaError::Timeout {
            stage: UploadStage::RequestingTarget,
            ..
        }
    ));
    assert!(h.transport.calls().is_empty());
}

#[tokio::test]
async fn test_transfer_failure_hides_public_url() {
    let h = Harness::new(
        FakeBroker::new(vec![ok_reply("https://put", "https://pub/secret-location")]),
        FakeTransport::new(vec![500]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );

    let err = h
        .uploader()
        .upload(&photo(), Bucket::Posts, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::Transfer { status: 500 }));
    assert!(err.to_string().contains("500"));
    assert!(!err.to_string().contains("secret-location"));
}

#[tokio::test]
async fn test_upload_all_is_sequential_and_stops_on_failure() {
    let h = Harness::new(
        FakeBroker::new(vec![
            ok_reply("https://put/1", "https://pub/1"),
            ok_reply("https://put/2", "https://pub/2"),
            ok_reply("https://put/3", "https://pub/3"),
        ]),
        FakeTransport::new(vec![200, 502, 200]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );
    let files = vec![photo(), photo(), photo()];

    let err = h
        .uploader()
        .upload_all(&files, Bucket::Posts, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::Transfer { status: 502 }));
    assert_eq!(h.broker.call_count(), 2);
    let urls: Vec<String> = h.transport.calls().into_iter().map(|c| c.url).collect();
    assert_eq!(urls, vec!["https://put/1", "https://put/2"]);
}

#[tokio::test]
async fn test_upload_all_returns_results_in_order() {
    let h = Harness::new(
        FakeBroker::new(vec![
            ok_reply("https://put/1", "https://pub/1"),
            ok_reply("https://put/2", "https://pub/2"),
        ]),
        FakeTransport::new(vec![200, 200]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );

    let results = h
        .uploader()
        .upload_all(&[photo(), photo()], Bucket::CommentMedia, Some("tok"))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, "https://pub/1");
    assert_eq!(results[1].url, "https://pub/2");
    assert_ne!(results[0].key, results[1].key);
    assert!(results.iter().all(|r| r.key.starts_with("comment-media/")));
}

#[test]
fn test_default_timeouts() {
    let timeouts = UploadTimeouts::default();
    assert_eq!(timeouts.target, Duration::from_secs(45));
    assert_eq!(timeouts.transfer, Duration::from_secs(180));
}

#[tokio::test]
async fn test_empty_public_url_fails_before_transfer() {
    let h = Harness::new(
        FakeBroker::new(vec![ok_reply("https://put", "")]),
        FakeTransport::new(vec![200]),
        FakeSessions::signed_in(session("t1", 3_600)),
    );

    let err = h
        .uploader()
        .upload(&photo(), Bucket::Posts, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, MediaError::Broker { status: 200, .. }));
    assert!(h.transport.calls().is_empty());
}
