//! Resource groups against a mock Zoom API.

use chrono::NaiveDate;
use mockito::{Matcher, Server, ServerGuard};
use zoom_api::error::ValidationErrorKind;
use zoom_api::{
    ApiErrorKind, CancellationToken, ClientOptions, CreateMeetingRequest, Credentials,
    DashboardMeetingType, MeetingListType, NewPanelist, PageRequest, ZoomClient,
};

fn client(server: &ServerGuard) -> ZoomClient {
    ZoomClient::with_options(
        Credentials::access_token("session-token"),
        ClientOptions::new()
            .with_api_base_url(server.url())
            .with_token_url(format!("{}/oauth/token", server.url()))
            .with_max_transient_retries(0),
    )
    .unwrap()
}

fn panelists(count: usize) -> Vec<NewPanelist> {
    (0..count)
        .map(|i| NewPanelist {
            name: format!("Panelist {}", i),
            email: format!("panelist{}@example.com", i),
        })
        .collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn create_and_delete_meeting() {
    let mut server = Server::new_async().await;
    let create = server
        .mock("POST", "/users/me/meetings")
        .match_header("authorization", "Bearer session-token")
        .match_body(Matcher::Json(serde_json::json!({
            "topic": "Weekly sync",
            "type": 2,
            "start_time": "2024-05-01T15:00:00Z",
            "duration": 30
        })))
        .with_status(201)
        .with_body(r#"{"id":85746065432,"topic":"Weekly sync","type":2,"join_url":"https://zoom.us/j/85746065432"}"#)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/meetings/85746065432")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server);
    let cancel = CancellationToken::new();
    let meeting = client
        .meetings()
        .create(
            "me",
            &CreateMeetingRequest {
                topic: "Weekly sync".to_string(),
                meeting_type: 2,
                start_time: Some("2024-05-01T15:00:00Z".to_string()),
                duration: Some(30),
                ..Default::default()
            },
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(meeting.id, 85746065432);

    client.meetings().delete(meeting.id, &cancel).await.unwrap();

    create.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn list_meetings_sends_type_and_paging() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/users/jchill%40example.com/meetings")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "upcoming".into()),
            Matcher::UrlEncoded("page_size".into(), "100".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"page_size":100,"total_records":1,"next_page_token":"","meetings":[{"id":1,"topic":"Standup"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let page = client(&server)
        .meetings()
        .list(
            "jchill@example.com",
            MeetingListType::Upcoming,
            &PageRequest::first(100),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    list.assert_async().await;
    assert_eq!(page.records[0].topic.as_deref(), Some("Standup"));
    assert!(!page.more_records_available);
}

#[tokio::test]
async fn add_panelists_validates_count_before_sending() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/webinars/42/panelists")
        .expect(0)
        .create_async()
        .await;

    let client = client(&server);
    let cancel = CancellationToken::new();

    let empty = client.webinars().add_panelists(42, &[], &cancel).await.unwrap_err();
    assert_eq!(
        empty.error_kind,
        ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument)
    );

    let too_many = client
        .webinars()
        .add_panelists(42, &panelists(31), &cancel)
        .await
        .unwrap_err();
    assert_eq!(
        too_many.error_kind,
        ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument)
    );

    add.assert_async().await;
}

#[tokio::test]
async fn add_list_and_remove_panelists() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/webinars/42/panelists")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "panelists": [{"name": "Panelist 0", "email": "panelist0@example.com"}]
        })))
        .with_status(201)
        .with_body(r#"{"id":"42","updated_at":"2024-05-01T12:00:00Z"}"#)
        .expect(1)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/webinars/42/panelists")
        .with_status(200)
        .with_body(r#"{"total_records":1,"panelists":[{"id":"pa1","email":"panelist0@example.com","name":"Panelist 0"}]}"#)
        .expect(1)
        .create_async()
        .await;
    let remove = server
        .mock("DELETE", "/webinars/42/panelists/pa1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let client = client(&server);
    let cancel = CancellationToken::new();
    client
        .webinars()
        .add_panelists(42, &panelists(1), &cancel)
        .await
        .unwrap();
    let listed = client.webinars().list_panelists(42, &cancel).await.unwrap();
    assert_eq!(listed.total_records, 1);
    client
        .webinars()
        .remove_panelist(42, &listed.panelists[0].id, &cancel)
        .await
        .unwrap();

    add.assert_async().await;
    list.assert_async().await;
    remove.assert_async().await;
}

#[tokio::test]
async fn recordings_in_empty_date_range() {
    let mut server = Server::new_async().await;
    let recordings = server
        .mock("GET", "/users/me/recordings")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("from".into(), "2024-01-01".into()),
            Matcher::UrlEncoded("to".into(), "2024-01-31".into()),
            Matcher::UrlEncoded("page_size".into(), "30".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"from":"2024-01-01","to":"2024-01-31","page_size":30,"total_records":0,"next_page_token":"","meetings":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let page = client(&server)
        .cloud_recordings()
        .list_for_user(
            "me",
            date(2024, 1, 1),
            date(2024, 1, 31),
            &PageRequest::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    recordings.assert_async().await;
    assert!(page.records.is_empty());
    assert_eq!(page.from.as_deref(), Some("2024-01-01"));
}

#[tokio::test]
async fn reversed_date_range_is_rejected() {
    let mut server = Server::new_async().await;
    let metrics = server
        .mock("GET", "/metrics/meetings")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server)
        .dashboards()
        .list_meetings(
            DashboardMeetingType::Past,
            date(2024, 2, 1),
            date(2024, 1, 1),
            &PageRequest::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    metrics.assert_async().await;
    assert_eq!(
        err.error_kind,
        ApiErrorKind::Validation(ValidationErrorKind::InvalidArgument)
    );
}

#[tokio::test]
async fn dashboard_participants() {
    let mut server = Server::new_async().await;
    let participants = server
        .mock("GET", "/metrics/meetings/85746065432/participants")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "past".into()),
            Matcher::UrlEncoded("page_size".into(), "300".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"page_size":300,"total_records":1,"next_page_token":"nxt","participants":[{"id":"p1","user_name":"Jill Chill","device":"Mac"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let page = client(&server)
        .dashboards()
        .list_meeting_participants(
            "85746065432",
            DashboardMeetingType::Past,
            &PageRequest::first(300),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    participants.assert_async().await;
    assert_eq!(page.records[0].user_name.as_deref(), Some("Jill Chill"));
    assert!(page.more_records_available);
}
