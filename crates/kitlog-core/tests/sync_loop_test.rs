#![allow(clippy::unwrap_used)]
// Integration tests for the `Inventory` synchronization loop, driven
// against a wiremock authority.

use std::time::Duration;

use chrono::NaiveDate;
use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kitlog_core::{
    CoreError, Inventory, Item, ItemForm, ItemId, MaintenanceForm, ServiceConfig, SessionGuard,
    SessionToken,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, Inventory) {
    let server = MockServer::start().await;
    let session = match token {
        Some(raw) => SessionGuard::with_token(SessionToken::new(raw)),
        None => SessionGuard::new(),
    };
    let config = ServiceConfig::new(Url::parse(&server.uri()).unwrap());
    let inventory = Inventory::new(&config, session).unwrap();
    (server, inventory)
}

fn item_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": "Electronics",
        "purchaseDate": "2024-01-01T00:00:00.000Z",
        "serialNumber": "SN1",
        "__v": 0
    })
}

fn record_json(id: &str, item_id: &str, service: &str, date: &str, cost: f64) -> Value {
    json!({
        "_id": id,
        "itemId": item_id,
        "serviceType": service,
        "dateOfService": date,
        "cost": cost
    })
}

fn drill_form() -> ItemForm {
    ItemForm {
        name: "Drill".into(),
        category: "Electronics".into(),
        purchase_date: "2024-01-01".into(),
        serial_number: "SN1".into(),
    }
}

async fn mount_items(server: &MockServer, items: Value) {
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

async fn mount_maintenance(server: &MockServer, item_id: &str, records: Value) {
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .and(query_param("itemId", item_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

fn service_types(inventory: &Inventory) -> Vec<String> {
    inventory
        .maintenance_snapshot()
        .iter()
        .map(|r| r.service_type.clone())
        .collect()
}

// ── Item cycles ─────────────────────────────────────────────────────

#[tokio::test]
async fn add_item_then_listing_matches_authority() {
    let (server, inventory) = setup(Some("tok")).await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "name": "Drill",
            "category": "Electronics",
            "purchaseDate": "2024-01-01",
            "serialNumber": "SN1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(item_json("i1", "Drill")))
        .expect(1)
        .mount(&server)
        .await;
    mount_items(&server, json!([item_json("i1", "Drill")])).await;

    let created = inventory.add_item(&drill_form()).await.unwrap();
    assert_eq!(created.id, ItemId::from("i1"));

    let expected = Item {
        id: ItemId::from("i1"),
        name: "Drill".into(),
        category: "Electronics".into(),
        purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        serial_number: "SN1".into(),
    };
    assert_eq!(*inventory.items_snapshot(), vec![expected]);
    assert_eq!(inventory.error_message(), None);
}

#[tokio::test]
async fn successive_writes_track_the_authority() {
    let (server, inventory) = setup(Some("tok")).await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(201).set_body_json(item_json("i1", "Drill")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/items/i1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "deleted" })))
        .expect(1)
        .mount(&server)
        .await;
    // First listing sees the new item, later ones see it gone.
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [item_json("i1", "Drill")] })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_items(&server, json!([])).await;

    inventory.add_item(&drill_form()).await.unwrap();
    assert_eq!(inventory.items_snapshot().len(), 1);

    inventory.delete_item(&ItemId::from("i1")).await.unwrap();
    assert!(inventory.items_snapshot().is_empty());
    assert_eq!(inventory.error_message(), None);
}

#[tokio::test]
async fn repeated_refresh_is_idempotent() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_items(
        &server,
        json!([item_json("i1", "Drill"), item_json("i2", "Desk")]),
    )
    .await;

    inventory.refresh_items().await.unwrap();
    let first = inventory.items_snapshot();
    inventory.refresh_items().await.unwrap();
    let second = inventory.items_snapshot();

    assert_eq!(*first, *second);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn rejected_delete_keeps_items_and_shows_server_message() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_items(&server, json!([item_json("i1", "Drill")])).await;
    Mock::given(method("DELETE"))
        .and(path("/items/i1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
        .mount(&server)
        .await;

    inventory.refresh_items().await.unwrap();
    let err = inventory.delete_item(&ItemId::from("i1")).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(inventory.items_snapshot().len(), 1);
    assert_eq!(inventory.error_message().as_deref(), Some("not found"));
}

#[tokio::test]
async fn non_array_listing_is_empty_without_error() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": "not-an-array" })),
        )
        .mount(&server)
        .await;

    inventory.refresh_items().await.unwrap();
    assert!(inventory.items_snapshot().is_empty());
    assert_eq!(inventory.error_message(), None);
}

#[tokio::test]
async fn undecodable_entry_is_skipped_and_rest_kept() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_items(
        &server,
        json!([
            item_json("i1", "Drill"),
            item_json("i2", "Saw"),
            { "_id": "i3", "name": "Ladder", "category": "Tools" },
        ]),
    )
    .await;

    inventory.refresh_items().await.unwrap();

    let names: Vec<String> = inventory
        .items_snapshot()
        .iter()
        .map(|item| item.name.clone())
        .collect();
    assert_eq!(names, ["Drill", "Saw"]);
    assert_eq!(inventory.error_message(), None);
}

#[tokio::test]
async fn success_clears_previous_error() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_items(&server, json!([item_json("i1", "Drill")])).await;

    assert!(inventory.refresh_items().await.is_err());
    assert_eq!(
        inventory.error_message().as_deref(),
        Some("Failed to fetch items")
    );

    inventory.refresh_items().await.unwrap();
    assert_eq!(inventory.error_message(), None);
}

#[tokio::test]
async fn invalid_item_form_never_reaches_authority() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let form = ItemForm {
        category: "Tools".into(),
        ..drill_form()
    };
    let err = inventory.add_item(&form).await.unwrap_err();

    assert!(matches!(err, CoreError::Validation { field: "category", .. }));
    assert!(inventory.error_message().is_some());
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_token_short_circuits_without_requests() {
    let (server, inventory) = setup(None).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(inventory.refresh_items().await, Err(CoreError::Unauthorized));
    assert!(inventory.items_snapshot().is_empty());
    assert_eq!(
        inventory.error_message().as_deref(),
        Some("Unauthorized access. Please log in again.")
    );

    assert_eq!(
        inventory.add_item(&drill_form()).await.unwrap_err(),
        CoreError::Unauthorized
    );
    assert_eq!(
        inventory.delete_item(&ItemId::from("i1")).await.unwrap_err(),
        CoreError::Unauthorized
    );

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unauthorized_response_tears_down_session() {
    let (server, inventory) = setup(Some("stale")).await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "jwt expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = inventory.refresh_items().await.unwrap_err();
    assert_eq!(
        err,
        CoreError::SessionExpired {
            message: "jwt expired".into()
        }
    );
    assert!(!inventory.session().is_authenticated());

    // Next call never leaves the client.
    assert_eq!(inventory.refresh_items().await, Err(CoreError::Unauthorized));
}

#[tokio::test]
async fn login_establishes_bearer_for_later_calls() {
    let (server, inventory) = setup(None).await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "jwt-1" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(header("authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let password = SecretString::from("pw".to_owned());
    inventory.login("a@b.c", &password).await.unwrap();
    assert!(inventory.session().is_authenticated());

    inventory.refresh_items().await.unwrap();
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let (server, inventory) = setup(None).await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("nope".to_owned());
    let err = inventory.login("a@b.c", &password).await.unwrap_err();

    assert!(err.is_auth());
    assert!(!inventory.session().is_authenticated());
    assert_eq!(
        inventory.error_message().as_deref(),
        Some("Invalid credentials")
    );
}

#[tokio::test]
async fn logout_resets_view() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_items(&server, json!([item_json("i1", "Drill")])).await;
    mount_maintenance(&server, "i1", json!([])).await;

    inventory.refresh_items().await.unwrap();
    inventory.view_maintenance(ItemId::from("i1")).await.unwrap();
    inventory.logout();

    let view = inventory.view();
    assert!(view.items.is_empty());
    assert!(view.selection.active().is_none());
    assert!(!inventory.session().is_authenticated());
}

#[tokio::test]
async fn listing_in_flight_across_logout_is_discarded() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [item_json("i1", "Drill")] }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (refreshed, ()) = tokio::join!(inventory.refresh_items(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        inventory.logout();
    });
    refreshed.unwrap();

    let view = inventory.view();
    assert!(view.items.is_empty());
    assert_eq!(view.error, None);
    assert!(!inventory.session().is_authenticated());
}

// ── Maintenance ─────────────────────────────────────────────────────

#[tokio::test]
async fn view_maintenance_sorts_by_date_of_service() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_maintenance(
        &server,
        "i1",
        json!([
            record_json("m1", "i1", "Belt", "2024-03-01", 20.0),
            record_json("m2", "i1", "Oil", "2023-11-20T00:00:00.000Z", 10.0),
            record_json("m3", "i1", "Filter", "2024-03-01", 5.0),
        ]),
    )
    .await;

    inventory.view_maintenance(ItemId::from("i1")).await.unwrap();

    let selection = inventory.selection();
    assert!(selection.is_visible());
    assert_eq!(selection.active(), Some(&ItemId::from("i1")));
    assert_eq!(service_types(&inventory), ["Oil", "Belt", "Filter"]);
}

#[tokio::test]
async fn late_result_for_abandoned_selection_is_discarded() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .and(query_param("itemId", "A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([record_json("a1", "A", "A-service", "2024-01-01", 1.0)]))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_maintenance(
        &server,
        "B",
        json!([record_json("b1", "B", "B-service", "2024-01-02", 2.0)]),
    )
    .await;

    let (a, b) = tokio::join!(inventory.view_maintenance(ItemId::from("A")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        inventory.close_maintenance();
        inventory.view_maintenance(ItemId::from("B")).await
    });
    a.unwrap();
    b.unwrap();

    assert_eq!(inventory.selection().active(), Some(&ItemId::from("B")));
    assert_eq!(service_types(&inventory), ["B-service"]);
}

#[tokio::test]
async fn non_numeric_cost_is_rejected_locally() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_maintenance(
        &server,
        "i1",
        json!([record_json("m1", "i1", "Oil", "2024-01-01", 10.0)]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/maintenance"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    inventory.view_maintenance(ItemId::from("i1")).await.unwrap();
    let form = MaintenanceForm {
        service_type: "Belt".into(),
        date_of_service: "2024-02-01".into(),
        cost: "twelve".into(),
    };
    let err = inventory.add_maintenance(&form).await.unwrap_err();

    assert!(matches!(err, CoreError::Validation { field: "cost", .. }));
    assert_eq!(service_types(&inventory), ["Oil"]);
    assert!(inventory.error_message().is_some());
}

#[tokio::test]
async fn add_maintenance_requires_selection() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let form = MaintenanceForm {
        service_type: "Oil".into(),
        date_of_service: "2024-02-01".into(),
        cost: "10".into(),
    };
    let err = inventory.add_maintenance(&form).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { field: "selection", .. }));
}

#[tokio::test]
async fn add_maintenance_posts_for_selected_item_and_refetches() {
    let (server, inventory) = setup(Some("tok")).await;
    Mock::given(method("POST"))
        .and(path("/maintenance"))
        .and(body_json(json!({
            "itemId": "i1",
            "serviceType": "Oil",
            "dateOfService": "2024-02-01",
            "cost": 10.0
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(record_json("m1", "i1", "Oil", "2024-02-01", 10.0)),
        )
        .expect(1)
        .mount(&server)
        .await;
    // Empty history when first opened, then the new record.
    Mock::given(method("GET"))
        .and(path("/maintenance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_maintenance(
        &server,
        "i1",
        json!([record_json("m1", "i1", "Oil", "2024-02-01", 10.0)]),
    )
    .await;

    inventory.view_maintenance(ItemId::from("i1")).await.unwrap();
    assert!(inventory.maintenance_snapshot().is_empty());

    let form = MaintenanceForm {
        service_type: "Oil".into(),
        date_of_service: "2024-02-01".into(),
        cost: "10".into(),
    };
    let created = inventory.add_maintenance(&form).await.unwrap();

    assert_eq!(created.item_id, Some(ItemId::from("i1")));
    assert_eq!(service_types(&inventory), ["Oil"]);
}

#[tokio::test]
async fn delete_leaves_selection_alone() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_maintenance(&server, "i1", json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/items/i1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_items(&server, json!([])).await;

    inventory.view_maintenance(ItemId::from("i1")).await.unwrap();
    inventory.delete_item(&ItemId::from("i1")).await.unwrap();

    let view = inventory.view();
    assert_eq!(view.selection.active(), Some(&ItemId::from("i1")));
    assert!(view.selected_item().is_none());
}

// ── Subscriptions ───────────────────────────────────────────────────

#[tokio::test]
async fn subscribers_see_committed_listing() {
    let (server, inventory) = setup(Some("tok")).await;
    mount_items(&server, json!([item_json("i1", "Drill")])).await;

    let mut stream = inventory.subscribe();
    assert!(stream.current().items.is_empty());

    inventory.refresh_items().await.unwrap();
    let next = stream.changed().await.unwrap();
    assert_eq!(next.items.len(), 1);
    assert_eq!(stream.latest().items.len(), 1);

    let mut snapshots = inventory.subscribe().into_stream();
    let first = snapshots.next().await.unwrap();
    assert_eq!(first.items[0].name, "Drill");
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn slow_authority_times_out_as_connection_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = ServiceConfig::new(Url::parse(&server.uri()).unwrap());
    config.timeout = Duration::from_millis(300);
    let session = SessionGuard::with_token(SessionToken::new("tok"));
    let inventory = Inventory::new(&config, session).unwrap();

    let err = inventory.refresh_items().await.unwrap_err();

    assert!(
        matches!(err, CoreError::ConnectionFailed { .. }),
        "expected connection failure, got: {err:?}"
    );
    assert_eq!(
        inventory.error_message().as_deref(),
        Some("Cannot reach the inventory service: request timed out after 300ms")
    );
    assert!(inventory.items_snapshot().is_empty());
    assert!(inventory.session().is_authenticated());
}
