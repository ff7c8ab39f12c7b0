//! Tests for HTTP error mapping.

use super::*;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;
use serde_json::{Value, json};

async fn response_json(error: &Error) -> (StatusCode, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let body = to_bytes(response.into_body()).await.expect("read body");
    let value = serde_json::from_slice(&body).expect("error payload");
    (status, value)
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no"), StatusCode::UNAUTHORIZED)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

#[rstest]
#[actix_rt::test]
async fn internal_errors_are_redacted() {
    let error = Error::internal("account storage error: relation \"accounts\" does not exist")
        .with_details(json!({ "secret": "x" }));

    let (status, value) = response_json(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({ "code": "internal_error", "message": REDACTED_MESSAGE }));
}

#[rstest]
#[actix_rt::test]
async fn client_errors_keep_message_and_details() {
    let error = Error::invalid_request("email address is invalid.")
        .with_details(json!({ "fields": { "email": { "code": "invalid_format" } } }));

    let (status, value) = response_json(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["message"], "email address is invalid.");
    assert_eq!(value["details"]["fields"]["email"]["code"], "invalid_format");
}

#[rstest]
#[case(AccountError::IncorrectPassword)]
#[case(AccountError::InvalidCredentials)]
#[case(AccountError::NoAccountsAvailable)]
fn login_denials_are_indistinguishable(#[case] denial: AccountError) {
    let error = map_account_error(denial);
    assert_eq!(error, Error::unauthorized("invalid credentials"));
}
