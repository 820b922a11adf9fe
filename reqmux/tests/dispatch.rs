use reqmux::{
    Applier, BoxError, ContextOptions, DispatchError, EventKind, Reply, Subscription, action,
    resolvers::{LatestWins, resolver_fn},
    testing::{HostCall, RecordingAction},
};

mod common;
use common::{Capture, details, engine, result_of, tagged};

#[tokio::test]
async fn test_reply_reaches_host() {
    let (web, host) = engine();
    web.on_before_request(
        Subscription::new(action(|_details, done| {
            done.done(tagged("success"));
        }))
        .filter(["*://test.com/"]),
    )
    .unwrap();

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com"))
        .await;

    assert!(fired.bound);
    assert!(fired.result.is_ok());
    assert_eq!(fired.replies.len(), 1);
    assert_eq!(result_of(&fired.replies[0]), Some("success"));
}

#[tokio::test]
async fn test_fire_and_forget_never_replies() {
    let (web, host) = engine();
    let completed = RecordingAction::replying(Reply::cancel());
    web.on_completed(Subscription::new(completed.clone()).filter(["*://test.com/*"]))
        .unwrap();

    let fired = host
        .fire_with_reply(EventKind::Completed, details("https://test.com/done"))
        .await;

    assert!(fired.result.is_ok());
    assert!(fired.replies.is_empty());
    assert_eq!(completed.urls(), vec!["https://test.com/done".to_string()]);
}

#[tokio::test]
async fn test_fire_and_forget_runs_every_match() {
    let (web, host) = engine();
    let first = RecordingAction::silent();
    let second = RecordingAction::failing("ignored");
    let other = RecordingAction::passing();
    web.on_send_headers(Subscription::new(first.clone())).unwrap();
    web.on_send_headers(Subscription::new(second.clone())).unwrap();
    web.on_send_headers(Subscription::new(other.clone()).filter(["*://elsewhere/*"]))
        .unwrap();

    let fired = host
        .fire(EventKind::SendHeaders, details("http://test.com/"))
        .await;

    assert!(fired.result.is_ok());
    assert_eq!(first.call_count(), 1);
    assert_eq!(second.call_count(), 1);
    assert_eq!(other.call_count(), 0);
}

#[tokio::test]
async fn test_unmatched_request_gets_neutral_reply() {
    let (web, host) = engine();
    let only_foo = RecordingAction::replying(Reply::cancel());
    web.on_before_request(Subscription::new(only_foo.clone()).filter(["http://*/foo*"]))
        .unwrap();

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test/bar"))
        .await;

    assert_eq!(fired.replies, vec![Reply::neutral()]);
    assert_eq!(only_foo.call_count(), 0);
}

#[tokio::test]
async fn test_latest_listener_decides() {
    let (web, host) = engine();
    let a = RecordingAction::replying(tagged("A"));
    let b = RecordingAction::replying(tagged("B"));
    web.on_before_request(Subscription::new(a.clone())).unwrap();
    web.on_before_request(Subscription::new(b.clone())).unwrap();
    web.on_before_request(Subscription::new(action(|_details, done| {
        done.done(tagged("X"));
    })))
    .unwrap();

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert_eq!(result_of(&fired.replies[0]), Some("X"));
    assert_eq!(a.call_count(), 0);
    assert_eq!(b.call_count(), 0);
}

#[tokio::test]
async fn test_priority_overrides_registration_order() {
    let (web, host) = engine();
    web.on_before_request(
        Subscription::new(RecordingAction::replying(tagged("important")))
            .context(ContextOptions::new().with_priority(5).with_origin("ADBLOCK")),
    )
    .unwrap();
    web.on_before_request(Subscription::new(RecordingAction::replying(tagged("late"))))
        .unwrap();

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert_eq!(result_of(&fired.replies[0]), Some("important"));
}

#[tokio::test]
async fn test_resolver_failure_replies_neutral_and_errors() {
    let (web, host) = engine();
    web.on_before_request(Subscription::new(RecordingAction::replying(Reply::cancel())))
        .unwrap();
    assert!(web.set_resolver(
        EventKind::BeforeRequest,
        resolver_fn(|_appliers: Vec<Applier>| async {
            Err::<Reply, BoxError>("resolver exploded".into())
        }),
    ));

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert_eq!(fired.replies, vec![Reply::neutral()]);
    match fired.result {
        Err(DispatchError::Resolver { kind, source }) => {
            assert_eq!(kind, EventKind::BeforeRequest);
            assert_eq!(source.to_string(), "resolver exploded");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_failing_listener_only_rejects_its_applier() {
    let (web, host) = engine();
    let healthy = RecordingAction::replying(tagged("healthy"));
    web.on_headers_received(Subscription::new(healthy.clone())).unwrap();
    web.on_headers_received(Subscription::new(RecordingAction::failing("broken")))
        .unwrap();
    web.set_resolver(
        EventKind::HeadersReceived,
        resolver_fn(|appliers: Vec<Applier>| async move {
            for applier in appliers.into_iter().rev() {
                if let Ok(reply) = applier.apply().await {
                    return Ok(reply);
                }
            }
            Ok::<_, BoxError>(Reply::neutral())
        }),
    );

    let fired = host
        .fire(EventKind::HeadersReceived, details("http://test.com/"))
        .await;

    assert!(fired.result.is_ok());
    assert_eq!(result_of(&fired.replies[0]), Some("healthy"));
    assert_eq!(healthy.call_count(), 1);
}

#[tokio::test]
async fn test_resolver_configuration() {
    let (web, _host) = engine();

    assert!(!web.set_resolver(EventKind::Completed, LatestWins));
    assert!(web.set_resolver(EventKind::BeforeSendHeaders, LatestWins));
    // Replacing is allowed.
    assert!(web.set_resolver(EventKind::BeforeSendHeaders, LatestWins));
    assert!(web.clear_resolver(EventKind::BeforeSendHeaders));
    assert!(!web.clear_resolver(EventKind::BeforeSendHeaders));
}

#[tokio::test]
async fn test_builder_resolver_is_used() {
    let host = reqmux::testing::MockHost::new();
    let web = reqmux::WebRequest::builder(host.clone())
        .resolver(
            EventKind::BeforeRequest,
            resolver_fn(|_appliers: Vec<Applier>| async { Ok::<_, BoxError>(tagged("configured")) }),
        )
        .instrument(false)
        .build();
    let listener = RecordingAction::replying(Reply::cancel());
    web.on_before_request(Subscription::new(listener.clone())).unwrap();

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert_eq!(result_of(&fired.replies[0]), Some("configured"));
    assert_eq!(listener.call_count(), 0);
}

#[tokio::test]
async fn test_dispatch_without_listeners_detaches() {
    let (web, host) = engine();
    let capture = Capture::new();

    let result = web
        .dispatch(EventKind::BeforeRequest, details("http://test.com/"), capture.sink())
        .await;

    assert!(result.is_ok());
    assert_eq!(capture.replies(), vec![Reply::neutral()]);
    assert_eq!(
        host.calls(),
        vec![HostCall::Unregister {
            kind: EventKind::BeforeRequest
        }]
    );
}

#[tokio::test]
async fn test_dropped_engine_replies_neutral() {
    let (web, host) = engine();
    let listener = RecordingAction::replying(Reply::cancel());
    web.on_before_request(Subscription::new(listener.clone())).unwrap();
    drop(web);

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert!(fired.result.is_ok());
    assert_eq!(fired.replies, vec![Reply::neutral()]);
    assert_eq!(listener.call_count(), 0);
}

#[tokio::test]
async fn test_listener_sees_request_details() {
    let (web, host) = engine();
    let listener = RecordingAction::passing();
    web.on_before_redirect(Subscription::new(listener.clone())).unwrap();

    host.fire(
        EventKind::BeforeRedirect,
        details("http://test.com/old").with_method("POST").with_id(7),
    )
    .await;

    let seen = listener.calls();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].id, 7);
}

#[tokio::test]
async fn test_panicking_resolver_still_replies() {
    let (web, host) = engine();
    let listener = RecordingAction::replying(Reply::cancel());
    web.on_before_request(Subscription::new(listener.clone())).unwrap();
    web.set_resolver(
        EventKind::BeforeRequest,
        resolver_fn(|_appliers: Vec<Applier>| async {
            if true {
                panic!("resolver blew up");
            }
            Ok::<Reply, BoxError>(Reply::cancel())
        }),
    );

    let fired = host
        .fire(EventKind::BeforeRequest, details("http://test.com/"))
        .await;

    assert_eq!(fired.replies, vec![Reply::neutral()]);
    match fired.result {
        Err(DispatchError::Resolver { kind, source }) => {
            assert_eq!(kind, EventKind::BeforeRequest);
            assert!(source.to_string().contains("resolver blew up"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_resolver_panicking_before_its_future_still_replies() {
    let host = reqmux::testing::MockHost::new();
    let web = reqmux::WebRequest::builder(host.clone())
        .instrument(false)
        .resolver(
            EventKind::HeadersReceived,
            resolver_fn(
                |_appliers: Vec<Applier>| -> std::future::Ready<Result<Reply, BoxError>> {
                    panic!("no future for you")
                },
            ),
        )
        .build();
    web.on_headers_received(Subscription::new(RecordingAction::passing()))
        .unwrap();

    let fired = host
        .fire(EventKind::HeadersReceived, details("http://test.com/"))
        .await;

    assert_eq!(fired.replies, vec![Reply::neutral()]);
    assert!(matches!(fired.result, Err(DispatchError::Resolver { .. })));
}
