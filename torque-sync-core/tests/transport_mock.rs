mod common;

use common::{competition, record, toc};
use mockall::Sequence;
use torque_sync_core::contract::{ApiCall, MockWikiTransport, RemotePage};
use torque_sync_core::publish::PageReport;
use torque_sync_core::{PublishError, PublishOptions, TransportError, WikiSession};

#[tokio::test]
async fn test_raw_toc_sends_raw_flag() {
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| {
            call.action == "torquedataconnectuploadtoc"
                && call.params.get("raw_toc").map(String::as_str) == Some("true")
        })
        .times(1)
        .returning(|_| Ok(serde_json::json!({})));
    transport
        .expect_fetch_page()
        .returning(|title| Ok(RemotePage::existing(title, "already there")));

    let session = WikiSession::new(transport, "Comp2024");
    let mut pages = PageReport::default();
    session
        .publish_toc(&toc("Topics", true), &PublishOptions::default(), &mut pages)
        .await
        .expect("toc publish should succeed");
    assert_eq!(pages.existing, vec!["Topics"]);
}

#[tokio::test]
async fn test_non_raw_toc_omits_raw_flag_entirely() {
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| {
            call.params.get("sheet_name").map(String::as_str) == Some("Comp2024")
                && call.params.get("toc_name").map(String::as_str) == Some("Regions")
                && !call.params.contains_key("raw_toc")
                && call.files.contains_key("template")
                && call.files.contains_key("json")
        })
        .times(1)
        .returning(|_| Ok(serde_json::json!({})));
    transport
        .expect_fetch_page()
        .returning(|title| Ok(RemotePage::missing(title)));
    transport
        .expect_save_page()
        .withf(|title, body| {
            title == "Regions" && body.ends_with("{{ #tdcrender:Comp2024/toc/Regions.mwiki }}")
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let session = WikiSession::new(transport, "Comp2024");
    let mut pages = PageReport::default();
    session
        .publish_toc(&toc("Regions", false), &PublishOptions::default(), &mut pages)
        .await
        .expect("toc publish should succeed");
    assert_eq!(pages.created, vec!["Regions"]);
}

#[tokio::test]
async fn test_toc_json_payload_is_grouped_data() {
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| {
            let json: serde_json::Value =
                serde_json::from_slice(&call.files["json"]).unwrap_or_default();
            json["groups"]["North"][0] == "p1"
        })
        .times(1)
        .returning(|_| Ok(serde_json::json!({})));

    let session = WikiSession::new(transport, "Comp2024");
    session
        .publish_toc(
            &toc("Regions", false),
            &PublishOptions::data_only(),
            &mut PageReport::default(),
        )
        .await
        .expect("toc publish should succeed");
}

#[tokio::test]
async fn test_sheet_upload_parameters() {
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| {
            call.action == "torquedataconnectuploadsheet"
                && call.params["object_name"] == "proposal"
                && call.params["sheet_name"] == "Comp2024"
                && call.params["key_column"] == "Key"
                && call.files["data_file"].starts_with(b"Key,MediaWiki Title\n")
        })
        .times(1)
        .returning(|_| Ok(serde_json::json!({})));

    let comp = competition(vec![record("p1", Some("Page One"))]);
    let session = WikiSession::new(transport, "Comp2024");
    let report = session
        .publish_sheet(&comp, &PublishOptions::data_only())
        .await
        .expect("sheet publish should succeed");
    assert!(report.sheet_uploaded);
}

#[tokio::test]
async fn test_sheet_transport_failure_stops_before_tocs() {
    let mut transport = MockWikiTransport::new();
    transport.expect_raw_call().times(1).returning(|_| {
        Err(TransportError::Api {
            code: "internal_api_error".into(),
            info: "reindex failed".into(),
        })
    });
    transport.expect_fetch_page().never();
    transport.expect_save_page().never();

    let comp = competition(vec![record("p1", Some("Page One"))])
        .with_tocs(vec![toc("Regions", false)]);
    let session = WikiSession::new(transport, "Comp2024");
    let err = session
        .publish_sheet(&comp, &PublishOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Transport(TransportError::Api { .. })));
}

#[tokio::test]
async fn test_toc_upload_failure_stops_before_any_page() {
    let mut seq = Sequence::new();
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| call.action == "torquedataconnectuploadsheet")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(serde_json::json!({})));
    transport
        .expect_raw_call()
        .withf(|call: &ApiCall| call.action == "torquedataconnectuploadtoc")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| {
            Err(TransportError::Network("connection reset".into()))
        });
    transport.expect_fetch_page().never();
    transport.expect_save_page().never();

    let comp = competition(vec![record("p1", Some("Page One"))])
        .with_tocs(vec![toc("Regions", false), toc("Topics", false)]);
    let session = WikiSession::new(transport, "Comp2024");
    let err = session
        .publish_sheet(&comp, &PublishOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Transport(TransportError::Network(_))));
}

#[tokio::test]
async fn test_record_pages_follow_toc_uploads() {
    let mut seq = Sequence::new();
    let mut transport = MockWikiTransport::new();
    transport
        .expect_raw_call()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_| Ok(serde_json::json!({})));
    transport
        .expect_fetch_page()
        .withf(|title| title == "Regions")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|title| Ok(RemotePage::existing(title, "")));
    transport
        .expect_fetch_page()
        .withf(|title| title == "Page One")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|title| Ok(RemotePage::missing(title)));
    transport
        .expect_save_page()
        .withf(|title, body| title == "Page One" && body.contains("Comp2024/id/p1.mwiki"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));

    let comp = competition(vec![record("p1", Some("Page One"))])
        .with_tocs(vec![toc("Regions", false)]);
    let session = WikiSession::new(transport, "Comp2024");
    session
        .publish_sheet(&comp, &PublishOptions::default())
        .await
        .expect("sheet publish should succeed");
}

#[tokio::test]
async fn test_audit_listing_failure_propagates() {
    let mut transport = MockWikiTransport::new();
    transport
        .expect_list_all_pages()
        .returning(|| Err(TransportError::Network("timed out".into())));

    let comp = competition(vec![record("p1", Some("Page One"))]);
    let session = WikiSession::new(transport, "Comp2024");
    let err = session.audit(&comp).await.unwrap_err();
    assert!(matches!(err, PublishError::Transport(TransportError::Network(_))));
}
