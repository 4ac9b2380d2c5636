use lending_contracts::{
    ApiError, ApplicationStatus, ApplicationStatusUpdate, BorrowerProfile, LoanApplication,
    LoanMetrics, LoanProduct, LoanProductDraft, LoginRequest, LoginResponse, ToggleStatusRequest,
    User,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

const TOKEN_KEY: &str = "access_token";
const API_UNAVAILABLE: &str =
    "The lending API is unavailable. Check your connection and try again.";

pub fn api_base() -> &'static str {
    option_env!("LENDING_API_URL").unwrap_or("http://localhost:8000")
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn stored_token() -> Option<String> {
    storage()?
        .get_item(TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|token| !token.is_empty())
}

pub fn has_token() -> bool {
    stored_token().is_some()
}

fn store_token(token: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(TOKEN_KEY, token);
    }
}

pub fn clear_token() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

fn js_err(err: JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

async fn send<B>(method: &str, path: &str, body: Option<&B>) -> Result<Response, String>
where
    B: Serialize,
{
    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;

    let init = RequestInit::new();
    init.set_method(method);
    init.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        let json = serde_json::to_string(body).map_err(|e| e.to_string())?;
        init.set_body(&JsValue::from_str(&json));
    }

    let url = format!("{}{path}", api_base());
    let request = Request::new_with_str_and_init(&url, &init).map_err(js_err)?;
    let headers = request.headers();
    headers.set("Accept", "application/json").map_err(js_err)?;
    if body.is_some() {
        headers
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
    }
    if let Some(token) = stored_token() {
        headers
            .set("Authorization", &format!("Bearer {token}"))
            .map_err(js_err)?;
    }

    let value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| API_UNAVAILABLE.to_string())?;
    let response: Response = value.dyn_into().map_err(js_err)?;
    if response.ok() {
        return Ok(response);
    }

    if response.status() == 401 {
        clear_token();
    }
    Err(error_detail(&response).await)
}

async fn error_detail(response: &Response) -> String {
    let fallback = format!("Request failed with status {}", response.status());
    let Ok(promise) = response.json() else {
        return fallback;
    };
    match JsFuture::from(promise).await {
        Ok(value) => serde_wasm_bindgen::from_value::<ApiError>(value)
            .map(|err| err.detail)
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}

pub async fn call<B, R>(method: &str, path: &str, body: Option<&B>) -> Result<R, String>
where
    B: Serialize,
    R: DeserializeOwned,
{
    let response = send(method, path, body).await?;
    let value = JsFuture::from(response.json().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    serde_wasm_bindgen::from_value(value).map_err(|e| e.to_string())
}

async fn get<R: DeserializeOwned>(path: &str) -> Result<R, String> {
    call("GET", path, None::<&()>).await
}

pub async fn login(request: &LoginRequest) -> Result<LoginResponse, String> {
    let response: LoginResponse = call("POST", "/auth/login", Some(request)).await?;
    store_token(&response.access_token);
    Ok(response)
}

pub async fn fetch_me() -> Result<User, String> {
    get("/auth/me").await
}

/// Revokes the session server-side. The stored token is dropped either way.
pub async fn logout() -> Result<(), String> {
    let result = send("POST", "/auth/logout", None::<&()>).await.map(|_| ());
    clear_token();
    result
}

pub async fn fetch_loan_products() -> Result<Vec<LoanProduct>, String> {
    get("/api/loan-products").await
}

pub async fn create_loan_product(draft: &LoanProductDraft) -> Result<LoanProduct, String> {
    call("POST", "/api/loan-products", Some(draft)).await
}

pub async fn update_loan_product(
    id: &str,
    draft: &LoanProductDraft,
) -> Result<LoanProduct, String> {
    call("PUT", &format!("/api/loan-products/{id}"), Some(draft)).await
}

pub async fn delete_loan_product(id: &str) -> Result<(), String> {
    send("DELETE", &format!("/api/loan-products/{id}"), None::<&()>)
        .await
        .map(|_| ())
}

pub async fn set_loan_product_status(id: &str, is_active: bool) -> Result<LoanProduct, String> {
    call(
        "PATCH",
        &format!("/api/loan-products/{id}/status"),
        Some(&ToggleStatusRequest { is_active }),
    )
    .await
}

pub async fn fetch_loan_metrics() -> Result<LoanMetrics, String> {
    get("/api/loan-metrics").await
}

pub async fn fetch_my_profile() -> Result<BorrowerProfile, String> {
    get("/api/me/profile").await
}

pub async fn fetch_borrower_profile(id: &str) -> Result<BorrowerProfile, String> {
    get(&format!("/api/borrowers/{id}")).await
}

/// Staff get the whole queue, borrowers only their own applications.
pub async fn fetch_applications() -> Result<Vec<LoanApplication>, String> {
    get("/api/applications").await
}

pub async fn set_application_status(
    id: &str,
    status: ApplicationStatus,
) -> Result<LoanApplication, String> {
    let update = ApplicationStatusUpdate {
        status,
        priority: None,
        risk_score: None,
        analyst_notes: None,
    };
    call("PATCH", &format!("/api/applications/{id}/status"), Some(&update)).await
}
