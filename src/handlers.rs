use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::Form;

use crate::config::Config;
use crate::cookies::CookieJar;
use crate::error::AppError;
use crate::gateway::GatewayClient;
use crate::render;
use crate::submission::{Outcome, RequestContext};
use crate::types::SubmitForm;

pub struct AppState {
    pub config: Config,
    pub gateway: GatewayClient,
}

/// GET `/`: the form, with stored credentials pre-filled.
pub async fn index(headers: HeaderMap) -> impl IntoResponse {
    let ctx = RequestContext::new(false, SubmitForm::default(), CookieJar::from_headers(&headers));
    Html(render::page(&ctx, &Outcome::NotSubmitted))
}

/// POST `/`: process the submission and render the result on the same page.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut ctx = RequestContext::new(true, form, CookieJar::from_headers(&headers));
    let outcome = ctx
        .handle_submission(&state.gateway, &state.config.fallback_credentials)
        .await;

    let set_cookies = ctx.cookies.set_cookie_headers()?;
    Ok((set_cookies, Html(render::page(&ctx, &outcome))))
}
