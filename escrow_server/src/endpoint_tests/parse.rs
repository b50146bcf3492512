use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use escrow_engine::{events::EventProducers, parsers::ParserRegistry, TransferFlowApi};
use serde_json::{json, Value};

use super::mocks::MockEscrowDb;
use crate::routes::{parse_email, parse_info};

async fn call_parse(body: Value) -> (StatusCode, Value) {
    let _ = env_logger::try_init().ok();
    // The parse endpoint never touches the database, so a mock with no expectations suffices
    let api = TransferFlowApi::new(MockEscrowDb::new(), ParserRegistry::default(), EventProducers::default());
    let app = App::new().app_data(web::Data::new(api)).service(
        web::resource("/email/parse")
            .route(web::post().to(parse_email::<MockEscrowDb>))
            .route(web::get().to(parse_info)),
    );
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri("/email/parse").set_json(&body).to_request();
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[actix_web::test]
async fn sample_email_parses_end_to_end() {
    let (status, body) = call_parse(json!({ "useSample": "ticketmaster" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["parsed"]["platform"], json!("TICKETMASTER"));
    assert_eq!(body["parsed"]["transferCode"], json!("TM-ABC123"));
    assert_eq!(body["parsed"]["venue"], json!("SoFi Stadium"));
    assert_eq!(body["parsed"]["section"], json!("101"));
}

#[actix_web::test]
async fn explicit_email_parses_without_a_sample() {
    let body = json!({
        "email": {
            "from": "orders@stubhub.com",
            "to": "escrow+stubhub@escrowtickets.com",
            "subject": "Your tickets for The Weeknd",
            "text": "Event: The Weeknd\nTransfer Code: ST-QWE456",
        }
    });
    let (status, body) = call_parse(body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parsed"]["platform"], json!("STUBHUB"));
    assert_eq!(body["parsed"]["transferCode"], json!("ST-QWE456"));
}

#[actix_web::test]
async fn explicit_platform_overrides_detection() {
    // Neither the sender nor the recipient gives the platform away; the request says AXS and the AXS
    // vocabulary ("Sec:") is applied.
    let body = json!({
        "platform": "AXS",
        "email": {
            "from": "forwarder@gmail.com",
            "to": "inbox@gmail.com",
            "subject": "Fwd: tickets",
            "text": "Sec: 215\nRow: J\nTransfer Code: AX-XYZ789",
        }
    });
    let (status, body) = call_parse(body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], json!("AXS"));
    assert_eq!(body["parsed"]["section"], json!("215"));
    assert_eq!(body["parsed"]["transferCode"], json!("AX-XYZ789"));
}

#[actix_web::test]
async fn unknown_sample_is_a_bad_request() {
    let (status, body) = call_parse(json!({ "useSample": "flashseats" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("flashseats"));
}

#[actix_web::test]
async fn empty_request_is_a_bad_request() {
    let (status, _body) = call_parse(json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn sample_listing_endpoint() {
    let _ = env_logger::try_init().ok();
    let api = TransferFlowApi::new(MockEscrowDb::new(), ParserRegistry::default(), EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .service(web::resource("/email/parse").route(web::get().to(parse_info)));
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri("/email/parse").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["samples"], json!(["ticketmaster", "axs", "stubhub"]));
}
