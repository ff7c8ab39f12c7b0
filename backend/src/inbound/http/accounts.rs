//! Account API handlers.
//!
//! ```text
//! GET    /api/all
//! POST   /api/register {"full_name":"Jane Doe","date_of_birth":631152000,...}
//! POST   /api/login    {"email":"jane@example.com","password":"correcthorse"}
//! PATCH  /api/update/{id} {"full_name":"Jane Q. Doe"}
//! DELETE /api/delete/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    AccountId, AccountPatch, AccountView, Error, LoginCredentials, RegistrationCandidate,
    UpdateOutcome,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{json_error_handler, map_account_error};
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/register`.
///
/// Missing fields decode as empty or zero so validation reports them. An
/// `id` supplied by the client is ignored.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub full_name: String,
    pub date_of_birth: i64,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for RegistrationCandidate {
    fn from(value: RegisterRequest) -> Self {
        Self::new(
            value.full_name,
            value.date_of_birth,
            value.phone_number,
            value.email,
            value.password,
        )
    }
}

/// Login body for `POST /api/login`.
#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginResponse {
    pub id: AccountId,
}

/// Partial update body for `PATCH /api/update/{id}`.
///
/// Email and password are not accepted here.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateRequest {
    pub full_name: Option<String>,
    pub date_of_birth: Option<i64>,
    pub phone_number: Option<String>,
}

impl From<UpdateRequest> for AccountPatch {
    fn from(value: UpdateRequest) -> Self {
        Self::new(value.full_name, value.date_of_birth, value.phone_number)
    }
}

fn parse_account_id(raw: &str) -> Result<AccountId, Error> {
    AccountId::parse(raw).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "value": raw, "code": "invalid_format" }))
    })
}

/// Register the account routes under `/api`.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use accounts::inbound::http::accounts::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(list_accounts)
            .service(register)
            .service(login)
            .service(update_account)
            .service(delete_account),
    );
}

/// List every live account.
#[get("/all")]
pub async fn list_accounts(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<AccountView>>> {
    let accounts = state
        .accounts_query
        .list_accounts()
        .await
        .map_err(map_account_error)?;
    Ok(web::Json(accounts.iter().map(|account| account.view()).collect()))
}

/// Register a new account.
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let account = state
        .accounts
        .register(payload.into_inner().into())
        .await
        .map_err(map_account_error)?;
    Ok(HttpResponse::Created().json(account.view()))
}

/// Authenticate credentials and return the account id.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)
        .map_err(|violations| map_account_error(violations.into()))?;
    let id = state
        .login
        .authenticate(&credentials)
        .await
        .map_err(map_account_error)?;
    Ok(web::Json(LoginResponse { id }))
}

/// Apply a partial update.
///
/// Responds `202 Accepted` with the unchanged account when the patch is
/// empty.
#[patch("/update/{id}")]
pub async fn update_account(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_account_id(&path)?;
    let patch = AccountPatch::from(payload.into_inner());
    let outcome = state
        .accounts
        .apply_update(&id, &patch)
        .await
        .map_err(map_account_error)?;
    Ok(match outcome {
        UpdateOutcome::Updated(account) => HttpResponse::Ok().json(account.view()),
        UpdateOutcome::Unchanged(account) => HttpResponse::Accepted().json(account.view()),
    })
}

/// Remove an account.
#[delete("/delete/{id}")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_account_id(&path)?;
    state
        .accounts
        .remove(&id)
        .await
        .map_err(map_account_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
