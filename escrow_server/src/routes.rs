//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will
//! cause the current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database
//! operations, etc.) must therefore be expressed as futures or asynchronous functions.

use actix_web::{get, guard::GuardContext, http::header, web, HttpRequest, HttpResponse, Responder};
use escrow_engine::{
    db_types::InboundEmail,
    traits::EscrowDatabase,
    TransferFlowApi,
    VerificationOutcome,
};
use log::*;
use serde_json::json;

use actix_multipart::form::MultipartForm;

use crate::{
    config::ServerConfig,
    data_objects::{EmailForm, JsonResponse, ParseRequest, TransferQuery},
    errors::ServerError,
    helpers::get_remote_ip,
    samples::{sample_email, SAMPLE_KINDS},
};

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

/// Matches requests the email relay sends as a form upload rather than JSON.
pub fn is_multipart(ctx: &GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// `GET /email/webhook`. Some relays probe the endpoint before they will deliver to it.
pub async fn email_webhook_info() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "active",
        "accepts": ["application/json", "multipart/form-data"],
    }))
}

/// `POST /email/webhook` with a JSON body.
pub async fn email_webhook<B: EscrowDatabase>(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    api: web::Data<TransferFlowApi<B>>,
    body: web::Json<InboundEmail>,
) -> Result<HttpResponse, ServerError> {
    let peer = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded);
    debug!("🛍️ JSON webhook delivery from {peer:?}");
    process_email(api.get_ref(), body.into_inner()).await
}

/// `POST /email/webhook` with a multipart form body.
pub async fn email_webhook_form<B: EscrowDatabase>(
    req: HttpRequest,
    config: web::Data<ServerConfig>,
    api: web::Data<TransferFlowApi<B>>,
    MultipartForm(form): MultipartForm<EmailForm>,
) -> Result<HttpResponse, ServerError> {
    let peer = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded);
    debug!("🛍️ Form webhook delivery from {peer:?}");
    process_email(api.get_ref(), form.into()).await
}

/// The shared webhook pipeline. Every outcome short of a backend fault produces a response the relay should not
/// retry: 200 for processed emails (verified or not), 422 when a parser faulted. In all of those cases the audit
/// record has already been written.
async fn process_email<B: EscrowDatabase>(
    api: &TransferFlowApi<B>,
    email: InboundEmail,
) -> Result<HttpResponse, ServerError> {
    email.validate().map_err(ServerError::InvalidRequestBody)?;
    debug!("🛍️ Email received from {} to {}", email.from, email.to);
    let response = match api.process_incoming_email(&email).await? {
        VerificationOutcome::Verified { listing, record } => {
            info!("🛍️ Webhook verified listing {}", listing.id);
            HttpResponse::Ok().json(JsonResponse::verified(&listing, &record))
        },
        VerificationOutcome::NoTransferCode { record } => {
            HttpResponse::Ok().json(JsonResponse::unverified("No transfer code found in email", &record))
        },
        VerificationOutcome::NoMatchingListing { code, record } => HttpResponse::Ok()
            .json(JsonResponse::unverified(format!("No pending listing matches transfer code {code}"), &record)),
        VerificationOutcome::ParseFailed { reason, record } => HttpResponse::UnprocessableEntity().json(json!({
            "success": false,
            "error": "Failed to parse email",
            "details": reason,
            "transferId": record.id,
        })),
    };
    Ok(response)
}

/// `GET /email/parse`. Lists the canned samples the parse endpoint accepts.
pub async fn parse_info() -> impl Responder {
    HttpResponse::Ok().json(json!({ "samples": SAMPLE_KINDS }))
}

/// `POST /email/parse`. Runs the parsing pipeline without touching the database, for operators checking what a
/// given email (or one of the canned samples) extracts.
pub async fn parse_email<B: EscrowDatabase>(
    api: web::Data<TransferFlowApi<B>>,
    body: web::Json<ParseRequest>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    let email = match (request.use_sample, request.email) {
        (Some(kind), _) => sample_email(&kind)
            .ok_or_else(|| ServerError::InvalidRequestBody(format!("Unknown sample email: {kind}")))?,
        (None, Some(email)) => email,
        (None, None) => {
            return Err(ServerError::InvalidRequestBody("Provide either an email or a sample name".to_string()))
        },
    };
    email.validate().map_err(ServerError::InvalidRequestBody)?;
    match api.parse_email(&email, request.platform) {
        Ok(parsed) => {
            Ok(HttpResponse::Ok().json(json!({ "success": true, "platform": parsed.platform, "parsed": parsed })))
        },
        Err(e) => Ok(HttpResponse::UnprocessableEntity().json(json!({
            "success": false,
            "error": "Failed to parse email",
            "details": e.to_string(),
        }))),
    }
}

/// `GET /email/transfers`. The audit trail, newest first; `?unmatched=true` restricts to the manual-review queue.
pub async fn transfer_records<B: EscrowDatabase>(
    api: web::Data<TransferFlowApi<B>>,
    query: web::Query<TransferQuery>,
) -> Result<HttpResponse, ServerError> {
    let records = api.fetch_transfer_records(query.unmatched).await?;
    debug!("💻️ Returning {} transfer records (unmatched only: {})", records.len(), query.unmatched);
    Ok(HttpResponse::Ok().json(records))
}
