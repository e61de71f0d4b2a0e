use axum_test::TestServer;
use boarding_api::{AppState, create_app};
use boarding_core::{adapters::FixedClock, domain::room::RoomCatalog};
use chrono::{TimeZone, Utc};
use http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

struct TestApp {
    server: TestServer,
    clock: Arc<FixedClock>,
    token: String,
}

impl TestApp {
    fn auth(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", self.token)).unwrap(),
        )
    }

    async fn create_tenant(&self, name: &str, room: &str) -> String {
        let (name_header, value) = self.auth();
        let response = self
            .server
            .post("/api/tenants")
            .add_header(name_header, value)
            .json(&json!({
                "name": name,
                "phone": "0771234567",
                "room_no": room,
                "rent_amount": 8500
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["id"].as_str().unwrap().to_string()
    }

    async fn distribute(
        &self,
        room: &str,
        electricity: Value,
        water: Value,
    ) -> (StatusCode, Value) {
        let (name, value) = self.auth();
        let response = self
            .server
            .post(&format!("/api/rooms/{}/bills", room.replace(' ', "%20")))
            .add_header(name, value)
            .json(&json!({ "total_electricity": electricity, "total_water": water }))
            .await;
        (response.status_code(), response.json::<Value>())
    }

    async fn tenant(&self, id: &str) -> Value {
        let (name, value) = self.auth();
        let response = self
            .server
            .get(&format!("/api/tenants/{}", id))
            .add_header(name, value)
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json::<Value>()
    }

    async fn mark_paid(&self, id: &str) -> StatusCode {
        let (name, value) = self.auth();
        self.server
            .post(&format!("/api/tenants/{}/payments", id))
            .add_header(name, value)
            .await
            .status_code()
    }
}

// Registers a landlord, signs in, and returns an app holding the session token
async fn setup_test_app() -> TestApp {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
    ));
    let state = AppState::in_memory(RoomCatalog::default(), clock.clone(), 3600);
    let server = TestServer::new(create_app(state)).expect("Failed to create TestServer");

    let register = server
        .post("/api/auth/register")
        .json(&json!({
            "full_name": "Sunil Landlord",
            "email": "sunil@example.com",
            "password": "secret123"
        }))
        .await;
    assert_eq!(register.status_code(), StatusCode::CREATED);

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": "sunil@example.com", "password": "secret123" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::OK);
    let token = login.json::<Value>()["token"].as_str().unwrap().to_string();

    TestApp {
        server,
        clock,
        token,
    }
}

#[tokio::test]
async fn room_01_split_then_payment_blocks_redistribution() {
    let app = setup_test_app().await;
    let a = app.create_tenant("Amal", "Room 01").await;
    let b = app.create_tenant("Bimal", "Room 01").await;
    let c = app.create_tenant("Chathu", "Room 01").await;

    let (status, split) = app.distribute("Room 01", json!(4500), json!(1200)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(split["tenant_count"], 3);
    assert_eq!(split["electricity_share"], 1500.0);
    assert_eq!(split["water_share"], 400.0);
    assert_eq!(split["period"], "2026-01");
    for id in [&a, &b, &c] {
        let tenant = app.tenant(id).await;
        assert_eq!(tenant["electricity_share"], 1500.0);
        assert_eq!(tenant["water_share"], 400.0);
        assert_eq!(tenant["total_due"], 8500.0 + 1500.0 + 400.0);
    }

    assert_eq!(app.mark_paid(&a).await, StatusCode::OK);
    let paid = app.tenant(&a).await;
    assert_eq!(paid["electricity_share"], 0.0);
    assert_eq!(paid["water_share"], 0.0);
    assert_eq!(paid["last_paid_month"], "2026-01");
    assert_eq!(paid["paid_this_period"], true);

    let (status, body) = app.distribute("Room 01", json!(3000), json!(300)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_paid");
    assert_eq!(body["tenant_id"], a.as_str());
    assert_eq!(body["tenant_name"], "Amal");

    // Nobody in the room was touched by the rejected run
    assert_eq!(app.tenant(&b).await["electricity_share"], 1500.0);
    assert_eq!(app.tenant(&c).await["water_share"], 400.0);
    assert_eq!(app.tenant(&a).await["electricity_share"], 0.0);
}

#[tokio::test]
async fn room_02_single_tenant_takes_full_bill() {
    let app = setup_test_app().await;
    let only = app.create_tenant("Dilan", "Room 02").await;

    let (status, split) = app.distribute("Room 02", json!(1000), json!(500)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(split["tenants"][0]["tenant_id"], only.as_str());
    let tenant = app.tenant(&only).await;
    assert_eq!(tenant["electricity_share"], 1000.0);
    assert_eq!(tenant["water_share"], 500.0);
}

#[tokio::test]
async fn clearing_payment_reopens_the_room() {
    let app = setup_test_app().await;
    let a = app.create_tenant("Amal", "Room 03").await;
    app.create_tenant("Bimal", "Room 03").await;
    assert_eq!(app.mark_paid(&a).await, StatusCode::OK);

    let (status, _) = app.distribute("Room 03", json!(100), json!(100)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (name, value) = app.auth();
    let cleared = app
        .server
        .delete(&format!("/api/tenants/{}/payments", a))
        .add_header(name, value)
        .await;
    assert_eq!(cleared.status_code(), StatusCode::OK);
    assert_eq!(cleared.json::<Value>()["last_paid_month"], Value::Null);

    let (status, split) = app.distribute("Room 03", json!(100), json!(100)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(split["electricity_share"], 50.0);
}

#[tokio::test]
async fn new_month_lifts_the_lock() {
    let app = setup_test_app().await;
    let a = app.create_tenant("Amal", "Room 04").await;
    assert_eq!(app.mark_paid(&a).await, StatusCode::OK);

    app.clock
        .set(Utc.with_ymd_and_hms(2026, 2, 15, 12, 0, 0).unwrap());

    let (status, split) = app.distribute("Room 04", json!(800), json!(200)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(split["period"], "2026-02");
    assert_eq!(app.tenant(&a).await["paid_this_period"], false);
}

#[tokio::test]
async fn empty_room_and_bad_amounts_are_rejected() {
    let app = setup_test_app().await;
    let a = app.create_tenant("Amal", "Room 01").await;

    let (status, body) = app.distribute("Room 05", json!(100), json!(100)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no_tenants_in_room");

    let (status, body) = app.distribute("Room 01", json!(-5), json!(100)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");

    let (status, body) = app.distribute("Room 01", json!("lots"), json!(100)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_amount");

    let (status, body) = app.distribute("Room%2099", json!(1), json!(1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    assert_eq!(app.tenant(&a).await["version"], 1);
}

#[tokio::test]
async fn distribution_requires_a_session() {
    let app = setup_test_app().await;
    let response = app
        .server
        .post("/api/rooms/Room%2001/bills")
        .json(&json!({ "total_electricity": 1, "total_water": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "not_authenticated");
}
