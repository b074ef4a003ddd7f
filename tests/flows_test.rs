//! Pairing, permission and listing flows against a fake authority

mod common;

use common::*;
use futures::StreamExt;
use proxyu_gateway::flows::{list_permissions, FlowMessage, FlowOutcome};
use proxyu_gateway::proto::{
    correlation_response, data_request::Request, permission_response, CorrelationResponse,
    PermissionResponse,
};
use proxyu_gateway::store::ItemStore;
use proxyu_gateway::types::{BrowserId, ItemRecord, ItemStatus};
use std::time::Duration;
use tonic::Status;

fn correlation_message(msg: &str) -> Result<CorrelationResponse, Status> {
    Ok(CorrelationResponse {
        response: Some(correlation_response::Response::CorrelationMessage(
            msg.to_string(),
        )),
    })
}

fn public_key(fill: u8) -> Result<CorrelationResponse, Status> {
    Ok(CorrelationResponse {
        response: Some(correlation_response::Response::PublicKey(vec![fill; 32])),
    })
}

fn permission_message(msg: &str) -> Result<PermissionResponse, Status> {
    Ok(PermissionResponse {
        response: Some(permission_response::Response::PermissionMessage(
            msg.to_string(),
        )),
    })
}

fn granted(value: bool) -> Result<PermissionResponse, Status> {
    Ok(PermissionResponse {
        response: Some(permission_response::Response::Granted(value)),
    })
}

#[tokio::test]
async fn test_pairing_binds_session() {
    let mut h = Harness::start();
    let browser = BrowserId::random();

    let mut flow = h.pairing.start(browser, &h.shutdown);
    let exchange = h.authority.correlation().await;

    exchange.send(correlation_message("Scan the code")).unwrap();
    assert_eq!(
        within(flow.events.next()).await,
        Some(FlowMessage::progress("Scan the code"))
    );

    exchange.send(public_key(7)).unwrap();
    assert_eq!(within(flow.events.next()).await, Some(FlowMessage::done()));
    assert_eq!(within(flow.events.next()).await, None);
    assert_eq!(within(flow.task).await.unwrap(), FlowOutcome::Bound);

    assert_eq!(
        h.store.get_session(&browser).await.unwrap(),
        Some(subject(7))
    );
}

#[tokio::test]
async fn test_pairing_without_key_fails() {
    let mut h = Harness::start();
    let browser = BrowserId::random();

    let mut flow = h.pairing.start(browser, &h.shutdown);
    let exchange = h.authority.correlation().await;
    exchange.send(correlation_message("Waiting")).unwrap();
    drop(exchange);

    assert_eq!(
        within(flow.events.next()).await,
        Some(FlowMessage::progress("Waiting"))
    );
    assert_eq!(within(flow.events.next()).await, None);
    assert!(matches!(
        within(flow.task).await.unwrap(),
        FlowOutcome::Failed(_)
    ));
    assert!(h.store.get_session(&browser).await.unwrap().is_none());
}

#[tokio::test]
async fn test_pairing_backend_error_fails() {
    let mut h = Harness::start();
    let browser = BrowserId::random();

    let flow = h.pairing.start(browser, &h.shutdown);
    let exchange = h.authority.correlation().await;
    exchange.send(Err(Status::internal("boom"))).unwrap();

    assert_eq!(
        within(flow.task).await.unwrap(),
        FlowOutcome::Failed("boom".to_string())
    );
}

#[tokio::test]
async fn test_dropping_events_cancels_pairing() {
    let mut h = Harness::start();
    let browser = BrowserId::random();

    let flow = h.pairing.start(browser, &h.shutdown);
    let exchange = h.authority.correlation().await;

    drop(flow.events);

    // The backend sub-stream is torn down with the flow
    within(exchange.closed()).await;
    assert_eq!(within(flow.task).await.unwrap(), FlowOutcome::Cancelled);
    assert!(h.store.get_session(&browser).await.unwrap().is_none());
}

#[tokio::test]
async fn test_permission_grant_records_sentinel() {
    let mut h = Harness::start();
    let alice = subject(1);

    let mut flow = h.permission.start(item(PASSPORT), alice, &h.shutdown);
    let (request, exchange) = h.authority.permission().await;

    assert_eq!(request.process, PROCESS.as_bytes().to_vec());
    assert_eq!(request.data, item(PASSPORT).to_vec());
    assert_eq!(request.public_key, alice.to_vec());
    assert_eq!(request.amount, 0);
    assert_eq!(request.level, 1);

    exchange.send(permission_message("Asking")).unwrap();
    exchange.send(granted(true)).unwrap();

    assert_eq!(
        within(flow.events.next()).await,
        Some(FlowMessage::progress("Asking"))
    );
    assert_eq!(within(flow.events.next()).await, Some(FlowMessage::done()));
    assert_eq!(within(flow.events.next()).await, None);
    assert_eq!(within(flow.task).await.unwrap(), FlowOutcome::Granted);

    let items = h.store.list_items(&alice).await.unwrap();
    assert_eq!(items, vec![(item(PASSPORT), ItemRecord::granted())]);
}

#[tokio::test]
async fn test_permission_denied_writes_nothing() {
    let mut h = Harness::start();
    let alice = subject(1);

    let mut flow = h.permission.start(item(PASSPORT), alice, &h.shutdown);
    let (_, exchange) = h.authority.permission().await;
    exchange.send(granted(false)).unwrap();

    assert_eq!(
        within(flow.events.next()).await,
        Some(FlowMessage::denied())
    );
    assert_eq!(within(flow.task).await.unwrap(), FlowOutcome::Denied);
    assert!(h.store.list_items(&alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_shutdown_cancels_flows() {
    let mut h = Harness::start();

    let flow = h.permission.start(item(PASSPORT), subject(1), &h.shutdown);
    let (_, exchange) = h.authority.permission().await;

    h.shutdown.cancel();
    assert_eq!(within(flow.task).await.unwrap(), FlowOutcome::Cancelled);
    within(exchange.closed()).await;
}

#[tokio::test]
async fn test_listing_fetches_granted_items() {
    let mut h = Harness::start();
    let mut wire = h.authority.wire().await;
    let alice = subject(1);

    h.store
        .put_item(&alice, &item(PASSPORT), &ItemRecord::granted())
        .await
        .unwrap();

    let store = h.store.clone();
    let multiplexer = h.multiplexer.clone();
    let listing =
        tokio::spawn(async move { list_permissions(store.as_ref(), &multiplexer, alice).await });

    match next_request(&mut wire).await {
        Request::RetrieveRequest(request) => {
            assert_eq!(request.data, item(PASSPORT).to_vec())
        }
        other => panic!("expected retrieve request, got {:?}", other),
    }
    h.authority.push_retrieve_response(
        alice,
        item(PASSPORT),
        0,
        vec![field(item(FIRST_NAME), "text/plain", b"Albert")],
    );

    let listing = within(listing).await.unwrap().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[PASSPORT].status, 2);
    assert!(listing[PASSPORT].value.is_empty());
    assert_eq!(listing[FIRST_NAME].status, 2);
    assert_eq!(listing[FIRST_NAME].value, b"Albert");

    // The fetched field is kept for the next listing
    let stored = h
        .store
        .get_item(&alice, &item(FIRST_NAME))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ItemStatus::Fetched);
    assert_eq!(stored.payload, b"Albert");

    // So is the item that was asked for
    let stored = h
        .store
        .get_item(&alice, &item(PASSPORT))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ItemStatus::Fetched);
}

#[tokio::test]
async fn test_listing_fetches_granted_item_only_once() {
    let mut h = Harness::start();
    let mut wire = h.authority.wire().await;
    let alice = subject(1);

    h.store
        .put_item(&alice, &item(FIRST_NAME), &ItemRecord::granted())
        .await
        .unwrap();

    let store = h.store.clone();
    let multiplexer = h.multiplexer.clone();
    let listing =
        tokio::spawn(async move { list_permissions(store.as_ref(), &multiplexer, alice).await });

    next_request(&mut wire).await;
    h.authority.push_retrieve_response(
        alice,
        item(FIRST_NAME),
        0,
        vec![field(item(FIRST_NAME), "text/plain", b"Albert")],
    );

    let first = within(listing).await.unwrap().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[FIRST_NAME].status, 2);
    assert_eq!(first[FIRST_NAME].value, b"Albert");

    let second = within(list_permissions(h.store.as_ref(), &h.multiplexer, alice))
        .await
        .unwrap();
    assert_eq!(second, first);

    // Nothing was asked of the authority the second time
    assert_eq!(h.multiplexer.pending().await, 0);
    let quiet = tokio::time::timeout(Duration::from_millis(100), wire.next()).await;
    assert!(quiet.is_err());
}

#[tokio::test]
async fn test_listing_keeps_sentinel_when_fetch_is_rejected() {
    let mut h = Harness::start();
    let mut wire = h.authority.wire().await;
    let alice = subject(1);

    h.store
        .put_item(&alice, &item(PASSPORT), &ItemRecord::granted())
        .await
        .unwrap();
    h.store
        .put_item(&alice, &item(LAST_NAME), &ItemRecord::fetched("text/plain", "Einstein"))
        .await
        .unwrap();

    let store = h.store.clone();
    let multiplexer = h.multiplexer.clone();
    let listing =
        tokio::spawn(async move { list_permissions(store.as_ref(), &multiplexer, alice).await });

    next_request(&mut wire).await;
    h.authority
        .push_retrieve_response(alice, item(PASSPORT), 2, Vec::new());

    let listing = within(listing).await.unwrap().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[PASSPORT].status, 1);
    assert_eq!(listing[PASSPORT].value, vec![0u8]);
    assert_eq!(listing[LAST_NAME].status, 2);
    assert_eq!(listing[LAST_NAME].value, b"Einstein");
}
