//! End-to-end check-in/check-out flows through `AttendanceDesk`.

use attend_client::{
    AttendanceClient, AttendanceDesk, AttendanceEvent, DeskError, Direction, EventBus,
};
use attend_core::{AttendanceStatus, Coordinate, DenyReason, LocationSample};
use chrono::DateTime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn branches_body() -> serde_json::Value {
    serde_json::json!({
        "data": [
            { "_id": "olaya", "name": "Olaya", "latitude": 24.7136, "longitude": 46.6753, "radius": 200 },
            { "_id": "jeddah", "name": "Jeddah", "latitude": 21.4858, "longitude": 39.1925, "radius": 300 }
        ]
    })
}

async fn mount_branches(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/branches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(branches_body()))
        .mount(server)
        .await;
}

/// Serves `first` for the next today-record read, then `rest` afterwards.
async fn mount_today(server: &MockServer, first: serde_json::Value, rest: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/attendance-records/today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": first })))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendance-records/today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": rest })))
        .mount(server)
        .await;
}

async fn ready_desk(server: &MockServer, bus: EventBus) -> AttendanceDesk {
    let client = AttendanceClient::with_base_url(&server.uri(), Some("tok")).unwrap();
    let mut desk = AttendanceDesk::new(client, bus);
    desk.refresh_branches().await.unwrap();
    desk.refresh_record().await.unwrap();
    desk
}

fn near_olaya() -> LocationSample {
    // ~84 m from the Olaya branch.
    LocationSample::new(Coordinate::new(24.7140, 46.6760).unwrap(), Some(15.0))
}

#[tokio::test]
async fn check_in_within_radius_submits_and_refreshes() {
    let server = MockServer::start().await;
    mount_branches(&server).await;
    mount_today(
        &server,
        serde_json::Value::Null,
        serde_json::json!({ "checkIn": "2026-10-19T05:00:00Z" }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/attendance-records/check-in"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let bus = EventBus::new();
    let mut events = bus.subscribe();
    let mut desk = ready_desk(&server, bus).await;
    assert_eq!(
        events.recv().await.unwrap(),
        AttendanceEvent::RecordRefreshed(None)
    );

    let sample = near_olaya();
    let at = DateTime::parse_from_rfc3339("2026-10-19T08:00:00+03:00").unwrap();
    let submission = desk
        .submit_at(Direction::CheckIn, Some(&sample), at)
        .await
        .expect("check-in accepted");

    assert_eq!(submission.branch.branch.id, "olaya");
    assert!(submission.branch.distance_meters < 100.0);
    let record = submission.record.expect("refreshed record");
    assert_eq!(record.status(), AttendanceStatus::CheckedIn);
    assert_eq!(desk.record(), Some(&record));

    assert_eq!(
        events.recv().await.unwrap(),
        AttendanceEvent::CheckedIn {
            branch_id: "olaya".to_owned(),
            at
        }
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        AttendanceEvent::RecordRefreshed(Some(_))
    ));

    // The refreshed record now blocks a second check-in locally.
    assert_eq!(
        desk.admission(Direction::CheckIn, Some(&sample)),
        attend_core::Admission::Deny(DenyReason::AlreadyCheckedIn)
    );
}

#[tokio::test]
async fn out_of_range_is_denied_without_a_request() {
    let server = MockServer::start().await;
    mount_branches(&server).await;
    mount_today(&server, serde_json::Value::Null, serde_json::Value::Null).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut desk = ready_desk(&server, EventBus::new()).await;
    // ~1.1 km north of Olaya.
    let far = LocationSample::new(Coordinate::new(24.7236, 46.6753).unwrap(), Some(5.0));
    let err = desk.check_in(Some(&far)).await.unwrap_err();
    match err {
        DeskError::Denied(DenyReason::OutOfRange { distance, radius }) => {
            assert!(distance > 1000.0);
            assert!((radius - 200.0).abs() < f64::EPSILON);
        }
        other => panic!("expected out-of-range denial, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_location_is_denied() {
    let server = MockServer::start().await;
    mount_branches(&server).await;
    mount_today(&server, serde_json::Value::Null, serde_json::Value::Null).await;

    let mut desk = ready_desk(&server, EventBus::new()).await;
    let err = desk.check_in(None).await.unwrap_err();
    assert!(matches!(
        err,
        DeskError::Denied(DenyReason::LocationUnavailable)
    ));
}

#[tokio::test]
async fn check_out_before_check_in_is_denied() {
    let server = MockServer::start().await;
    mount_branches(&server).await;
    mount_today(&server, serde_json::Value::Null, serde_json::Value::Null).await;

    let mut desk = ready_desk(&server, EventBus::new()).await;
    let err = desk.check_out(Some(&near_olaya())).await.unwrap_err();
    assert!(matches!(err, DeskError::Denied(DenyReason::NotCheckedInYet)));
}

#[tokio::test]
async fn rejected_submission_refreshes_from_backend() {
    let server = MockServer::start().await;
    mount_branches(&server).await;
    // The backend already has a check-in the desk has not seen yet.
    mount_today(
        &server,
        serde_json::Value::Null,
        serde_json::json!({ "checkIn": "2026-10-19T04:55:00Z" }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/attendance-records/check-in"))
        .respond_with(
            ResponseTemplate::new(409)
                .set_body_json(serde_json::json!({ "message": "Already checked in today" })),
        )
        .mount(&server)
        .await;

    let mut desk = ready_desk(&server, EventBus::new()).await;
    let err = desk.check_in(Some(&near_olaya())).await.unwrap_err();
    assert_eq!(err.to_string(), "Already checked in today");
    assert_eq!(
        desk.record().map(attend_core::AttendanceRecord::status),
        Some(AttendanceStatus::CheckedIn)
    );
}
