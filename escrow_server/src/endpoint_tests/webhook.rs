use actix_web::{
    guard,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use escrow_engine::{
    db_types::{Platform, VerificationStatus},
    events::EventProducers,
    parsers::{ParseError, ParsedTransfer, ParserRegistry},
    TransferFlowApi,
};
use serde_json::{json, Value};

use super::mocks::{pending_listing, transfer_record, verified_listing, MockEscrowDb};
use crate::{
    config::ServerConfig,
    routes::{email_webhook, email_webhook_form, is_multipart, transfer_records},
};

async fn call_webhook(db: MockEscrowDb, registry: ParserRegistry, body: Value) -> (StatusCode, Value) {
    let _ = env_logger::try_init().ok();
    let api = TransferFlowApi::new(db, registry, EventProducers::default());
    let app = App::new().app_data(web::Data::new(ServerConfig::default())).app_data(web::Data::new(api)).service(
        web::resource("/email/webhook")
            .route(web::post().guard(guard::fn_guard(is_multipart)).to(email_webhook_form::<MockEscrowDb>))
            .route(web::post().to(email_webhook::<MockEscrowDb>)),
    );
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri("/email/webhook").set_json(&body).to_request();
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

fn ticketmaster_email(code: &str) -> Value {
    json!({
        "from": "noreply@ticketmaster.com",
        "to": "escrow+ticketmaster@escrowtickets.com",
        "subject": "Your Tickets for Taylor Swift have been transferred",
        "text": format!("Event: Taylor Swift\nVenue: SoFi Stadium\nTransfer Code: {code}\nThank you for using Ticketmaster!"),
    })
}

#[actix_web::test]
async fn matching_email_returns_verified_response() {
    let mut db = MockEscrowDb::new();
    db.expect_fetch_listing_by_transfer_code().returning(|code| Ok(Some(pending_listing(42, code.as_str()))));
    db.expect_verify_transfer().returning(|listing, _email, _parsed| {
        Ok((
            verified_listing(listing.id, "TM-ABC123"),
            transfer_record(7, Some(listing.id), "TM-ABC123", VerificationStatus::Verified),
        ))
    });
    let (status, body) = call_webhook(db, ParserRegistry::default(), ticketmaster_email("TM-ABC123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["transferId"], json!(7));
    assert_eq!(body["data"]["listingId"], json!(42));
    assert_eq!(body["data"]["verificationStatus"], json!("VERIFIED"));
}

#[actix_web::test]
async fn unmatched_code_returns_failure_with_audit_id() {
    let mut db = MockEscrowDb::new();
    db.expect_fetch_listing_by_transfer_code().returning(|_| Ok(None));
    db.expect_record_unverified_transfer()
        .withf(|_, parsed, code, notes| {
            parsed.is_some() && code.as_ref().map(|c| c.as_str()) == Some("TM-ZZZ999") && notes.contains("TM-ZZZ999")
        })
        .returning(|_, _, _, _| Ok(transfer_record(8, None, "TM-ZZZ999", VerificationStatus::Failed)));
    let (status, body) = call_webhook(db, ParserRegistry::default(), ticketmaster_email("TM-ZZZ999")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"]["transferId"], json!(8));
    assert_eq!(body["data"]["listingId"], Value::Null);
}

#[actix_web::test]
async fn email_without_code_returns_failure() {
    let mut db = MockEscrowDb::new();
    db.expect_record_unverified_transfer()
        .withf(|_, parsed, code, _| parsed.is_some() && code.is_none())
        .returning(|_, _, _, _| Ok(transfer_record(9, None, "UNKNOWN", VerificationStatus::Failed)));
    let mut email = ticketmaster_email("TM-ABC123");
    email["text"] = json!("Thanks for using Ticketmaster! Nothing else to see.");
    let (status, body) = call_webhook(db, ParserRegistry::default(), email).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("No transfer code found in email"));
}

#[actix_web::test]
async fn parser_fault_is_unprocessable_but_audited() {
    fn broken(_body: &str, _subject: &str) -> Result<ParsedTransfer, ParseError> {
        Err(ParseError::new(Platform::Ticketmaster, "boom"))
    }
    let mut registry = ParserRegistry::default();
    registry.register(Platform::Ticketmaster, broken);
    let mut db = MockEscrowDb::new();
    db.expect_record_unverified_transfer()
        .withf(|_, parsed, _, notes| parsed.is_none() && notes.contains("boom"))
        .returning(|_, _, _, _| Ok(transfer_record(10, None, "UNKNOWN", VerificationStatus::Failed)));
    let (status, body) = call_webhook(db, registry, ticketmaster_email("TM-ABC123")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Failed to parse email"));
    assert_eq!(body["transferId"], json!(10));
}

#[actix_web::test]
async fn multipart_form_delivery_is_accepted() {
    let _ = env_logger::try_init().ok();
    let mut db = MockEscrowDb::new();
    db.expect_fetch_listing_by_transfer_code().returning(|code| Ok(Some(pending_listing(42, code.as_str()))));
    db.expect_verify_transfer().returning(|listing, _email, _parsed| {
        Ok((
            verified_listing(listing.id, "TM-ABC123"),
            transfer_record(7, Some(listing.id), "TM-ABC123", VerificationStatus::Verified),
        ))
    });
    let api = TransferFlowApi::new(db, ParserRegistry::default(), EventProducers::default());
    let app = App::new().app_data(web::Data::new(ServerConfig::default())).app_data(web::Data::new(api)).service(
        web::resource("/email/webhook")
            .route(web::post().guard(guard::fn_guard(is_multipart)).to(email_webhook_form::<MockEscrowDb>))
            .route(web::post().to(email_webhook::<MockEscrowDb>)),
    );
    let service = test::init_service(app).await;
    let boundary = "escrow-test-boundary";
    let mut payload = String::new();
    for (name, value) in [
        ("from", "noreply@ticketmaster.com"),
        ("to", "escrow+ticketmaster@escrowtickets.com"),
        ("subject", "Your Tickets for Taylor Swift have been transferred"),
        ("text", "Event: Taylor Swift\nTransfer Code: TM-ABC123\nThank you for using Ticketmaster!"),
    ] {
        payload.push_str(&format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"));
    }
    payload.push_str(&format!("--{boundary}--\r\n"));
    let req = TestRequest::post()
        .uri("/email/webhook")
        .insert_header((header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}")))
        .set_payload(payload)
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["transferId"], json!(7));
    assert_eq!(body["data"]["listingId"], json!(42));
}

#[actix_web::test]
async fn blank_required_field_is_a_bad_request() {
    let db = MockEscrowDb::new();
    let mut email = ticketmaster_email("TM-ABC123");
    email["subject"] = json!("   ");
    let (status, body) = call_webhook(db, ParserRegistry::default(), email).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("subject"), "unexpected error: {error}");
}

#[actix_web::test]
async fn transfer_review_queue_endpoint() {
    let _ = env_logger::try_init().ok();
    let mut db = MockEscrowDb::new();
    db.expect_fetch_transfer_records().withf(|unmatched_only| *unmatched_only).returning(|_| {
        Ok(vec![
            transfer_record(3, None, "TM-ZZZ999", VerificationStatus::Failed),
            transfer_record(2, None, "UNKNOWN", VerificationStatus::Failed),
        ])
    });
    let api = TransferFlowApi::new(db, ParserRegistry::default(), EventProducers::default());
    let app = App::new()
        .app_data(web::Data::new(api))
        .service(web::resource("/email/transfers").route(web::get().to(transfer_records::<MockEscrowDb>)));
    let service = test::init_service(app).await;
    let req = TestRequest::get().uri("/email/transfers?unmatched=true").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["transferCode"], json!("TM-ZZZ999"));
    assert_eq!(records[0]["listingId"], Value::Null);
}
