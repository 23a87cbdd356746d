//! Controller wiring tests

use courier::controller::Courier;
use courier_common::Signal;
use tokio::sync::broadcast;

#[tokio::test]
async fn example_config_parses_and_wires() {
    let mut courier: Courier = ron::from_str(include_str!("../../courier.config.ron"))
        .expect("the shipped example config should parse");

    assert_eq!(courier.dispatch.tick_interval_secs, 5);
    assert_eq!(courier.dispatch.max_days_to_live, 30);
    assert_eq!(courier.providers.len(), 1);

    courier.init().expect("wiring should succeed");
    assert!(
        courier.providers.is_empty(),
        "providers are seeded into the store"
    );

    // No messages yet, so the first tick idles without touching anything.
    let outcome = courier.dispatch.tick().await.unwrap();
    assert!(outcome.is_idle());
}

#[tokio::test]
async fn defaults_apply_when_the_config_is_minimal() {
    let mut courier: Courier = ron::from_str("(dispatch: ())").unwrap();

    assert_eq!(courier.dispatch.tick_interval_secs, 15);
    assert_eq!(courier.dispatch.max_errors, 3);
    assert_eq!(courier.dispatch.archive_interval_secs, 86400);

    courier.init().expect("an empty provider list still wires");
}

#[tokio::test]
async fn serve_exits_cleanly_on_shutdown() {
    let mut courier: Courier = ron::from_str("(dispatch: ())").unwrap();
    courier.init().unwrap();

    let (sender, receiver) = broadcast::channel(4);
    let handle = tokio::spawn(async move { courier.dispatch.serve(receiver).await });

    sender.send(Signal::Shutdown).unwrap();

    handle
        .await
        .expect("serve task should not panic")
        .expect("serve should exit cleanly on shutdown");
}
