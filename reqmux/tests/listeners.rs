use reqmux::{
    ALL_URLS, ContextOptions, EventKind, FilterSet, PatternError, Reply, SubscribeError,
    Subscription, action, match_listeners,
    testing::{HostCall, RecordingAction},
};

mod common;
use common::engine;

fn filter(urls: &[&str]) -> FilterSet {
    urls.iter().copied().collect()
}

#[tokio::test]
async fn test_filters_are_exact_union() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();
    web.add_listener(
        EventKind::BeforeRequest,
        ["http://a/*", "http://shared/*"],
        pass.clone(),
        ContextOptions::new(),
    )
    .unwrap();
    web.add_listener(
        EventKind::BeforeRequest,
        ["http://shared/*", "http://b/*"],
        pass.clone(),
        ContextOptions::new(),
    )
    .unwrap();

    let expected = filter(&["http://a/*", "http://shared/*", "http://b/*"]);
    assert_eq!(web.filters_for(EventKind::BeforeRequest), expected);
    assert_eq!(host.filter(EventKind::BeforeRequest), Some(expected));
}

#[tokio::test]
async fn test_add_then_remove_restores_filters() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();
    web.add_listener(
        EventKind::BeforeRequest,
        ["http://unrelated/*"],
        pass.clone(),
        ContextOptions::new(),
    )
    .unwrap();
    let before = web.filters_for(EventKind::BeforeRequest);

    let added = web
        .add_listener(
            EventKind::BeforeRequest,
            ["http://unrelated/*", "http://new/*"],
            pass.clone(),
            ContextOptions::new(),
        )
        .unwrap();
    assert_ne!(web.filters_for(EventKind::BeforeRequest), before);

    web.remove_listener(EventKind::BeforeRequest, added.id);
    assert_eq!(web.filters_for(EventKind::BeforeRequest), before);
    assert_eq!(host.filter(EventKind::BeforeRequest), Some(before));
}

#[tokio::test]
async fn test_rebind_only_when_filters_change() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();
    for _ in 0..3 {
        web.add_listener(
            EventKind::Completed,
            ["*://test.com/*"],
            pass.clone(),
            ContextOptions::new(),
        )
        .unwrap();
    }

    assert_eq!(
        host.calls(),
        vec![HostCall::Register {
            kind: EventKind::Completed,
            filter: filter(&["*://test.com/*"]),
        }]
    );
}

#[tokio::test]
async fn test_removing_last_listener_detaches() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();
    let first = web
        .add_listener(EventKind::ErrorOccurred, ["http://a/*"], pass.clone(), ContextOptions::new())
        .unwrap();
    let second = web
        .add_listener(EventKind::ErrorOccurred, ["http://b/*"], pass.clone(), ContextOptions::new())
        .unwrap();

    web.remove_listener(EventKind::ErrorOccurred, first.id);
    assert!(host.is_bound(EventKind::ErrorOccurred));

    web.remove_listener(EventKind::ErrorOccurred, second.id);
    assert!(!host.is_bound(EventKind::ErrorOccurred));
    assert!(web.filters_for(EventKind::ErrorOccurred).is_empty());
    assert_eq!(
        host.calls().last(),
        Some(&HostCall::Unregister {
            kind: EventKind::ErrorOccurred
        })
    );

    // Idempotent.
    host.clear_calls();
    web.remove_listener(EventKind::ErrorOccurred, second.id);
    web.remove_listener(EventKind::BeforeRequest, second.id);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_orders_are_unique_across_kinds() {
    let (web, _host) = engine();
    let pass = RecordingAction::passing();
    let mut orders = Vec::new();
    for kind in EventKind::ALL {
        let handle = web
            .add_listener(kind, [ALL_URLS], pass.clone(), ContextOptions::new())
            .unwrap();
        orders.push(handle.context.order);
    }

    assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(web.listeners().len(), EventKind::ALL.len());
}

#[tokio::test]
async fn test_handle_reports_context() {
    let (web, _host) = engine();
    let handle = web
        .add_listener(
            EventKind::BeforeSendHeaders,
            ["*://api.example/*"],
            RecordingAction::passing(),
            ContextOptions::new().with_priority(2).with_origin("auth"),
        )
        .unwrap();

    assert_eq!(handle.kind, EventKind::BeforeSendHeaders);
    assert_eq!(handle.urls, vec!["*://api.example/*".to_string()]);
    assert_eq!(handle.context.priority, Some(2));
    assert_eq!(handle.context.origin.as_deref(), Some("auth"));
    assert_eq!(web.listeners_for(EventKind::BeforeSendHeaders), vec![handle]);
}

#[tokio::test]
async fn test_invalid_subscriptions_register_nothing() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();

    let empty: [&str; 0] = [];
    assert_eq!(
        web.add_listener(EventKind::BeforeRequest, empty, pass.clone(), ContextOptions::new()),
        Err(SubscribeError::EmptyFilter)
    );
    assert_eq!(
        web.add_listener(
            EventKind::BeforeRequest,
            ["http://ok/*", "not a pattern"],
            pass.clone(),
            ContextOptions::new(),
        ),
        Err(SubscribeError::InvalidPattern(PatternError::Whitespace(
            "not a pattern".to_string()
        )))
    );
    assert_eq!(
        web.on_before_request(Subscription::default().filter(["http://a/*"])),
        Err(SubscribeError::MissingAction {
            kind: EventKind::BeforeRequest
        })
    );

    assert!(web.listeners().is_empty());
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_convenience_call_shapes() {
    let (web, host) = engine();

    let handle = web
        .on_response_started(Subscription::new(action(|_details, done| done.pass())))
        .unwrap()
        .unwrap();
    assert_eq!(handle.urls, vec![ALL_URLS.to_string()]);
    assert_eq!(
        host.filter(EventKind::ResponseStarted),
        Some(filter(&[ALL_URLS]))
    );

    web.on_response_started(Subscription::new(RecordingAction::passing()))
        .unwrap();
    assert_eq!(web.listeners_for(EventKind::ResponseStarted).len(), 2);

    // Nothing at all detaches every listener.
    assert_eq!(
        web.on_response_started(Subscription::default()).unwrap(),
        None
    );
    assert!(web.listeners_for(EventKind::ResponseStarted).is_empty());
    assert!(!host.is_bound(EventKind::ResponseStarted));

    web.on_before_request(Subscription::new(RecordingAction::replying(Reply::cancel())))
        .unwrap();
    web.on_before_request(Subscription::unbind()).unwrap();
    assert!(!host.is_bound(EventKind::BeforeRequest));
}

#[tokio::test]
async fn test_clear_listeners() {
    let (web, host) = engine();
    let pass = RecordingAction::passing();
    web.add_listener(EventKind::Completed, ["http://a/*"], pass.clone(), ContextOptions::new())
        .unwrap();
    web.add_listener(EventKind::Completed, ["http://b/*"], pass.clone(), ContextOptions::new())
        .unwrap();

    assert_eq!(web.clear_listeners(EventKind::Completed), 2);
    assert!(!host.is_bound(EventKind::Completed));
    assert_eq!(web.clear_listeners(EventKind::Completed), 0);
}

#[tokio::test]
async fn test_match_listeners() {
    let (web, _host) = engine();
    let pass = RecordingAction::passing();
    let foo = web
        .add_listener(EventKind::BeforeRequest, ["http://*/foo*"], pass.clone(), ContextOptions::new())
        .unwrap();
    web.add_listener(
        EventKind::BeforeRequest,
        ["*://*.bazile.com/"],
        pass.clone(),
        ContextOptions::new(),
    )
    .unwrap();

    let matched = web.match_listeners(EventKind::BeforeRequest, "http://test/foo");
    assert_eq!(matched, vec![foo]);
    assert!(web.match_listeners(EventKind::BeforeRequest, "http://test/bar").is_empty());
    assert_eq!(
        web.match_listeners(EventKind::BeforeRequest, "https://www.bazile.com/")
            .len(),
        1
    );
}

#[test]
fn test_match_listeners_helper_orders_by_registration() {
    use reqmux_std::{ListenerRegistry, MatchPattern};
    use std::sync::Arc;

    let mut registry = ListenerRegistry::new();
    let mut add = |url: &str| {
        registry
            .add(
                EventKind::BeforeRequest,
                vec![MatchPattern::parse(url).unwrap()],
                Arc::new(RecordingAction::passing()),
                ContextOptions::new(),
            )
            .unwrap()
            .0
    };
    let first = add("http://*/*");
    let second = add("http://test/*");

    let listeners = registry.listeners_for(EventKind::BeforeRequest);
    let reversed: Vec<_> = listeners.iter().rev().cloned().collect();
    let matched = match_listeners("http://test/x", &reversed);

    let ids: Vec<_> = matched.iter().map(|l| l.id()).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}
