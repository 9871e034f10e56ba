//! htmx plumbing: fragment-or-redirect responses and error alerts.
//!
//! Every form posts as plain HTML too. Requests carrying `HX-Request` get a
//! fragment back; everything else gets a redirect (or a full error page).

use askama::Template;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use service_core::error::AppError;
use std::convert::Infallible;

pub const HX_REQUEST: &str = "hx-request";
pub const HX_RETARGET: &str = "hx-retarget";
pub const HX_RESWAP: &str = "hx-reswap";

/// Whether the request was issued by htmx.
#[derive(Debug, Clone, Copy)]
pub struct HxRequest(pub bool);

#[async_trait]
impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        Ok(HxRequest(is_htmx))
    }
}

impl HxRequest {
    /// Render the fragment for htmx, redirect home for plain form posts.
    pub fn fragment_or_redirect<T: Template>(self, fragment: T) -> Result<Response, UiError> {
        if !self.0 {
            return Ok(Redirect::to("/").into_response());
        }
        let html = fragment
            .render()
            .map_err(|e| UiError::new(AppError::InternalError(e.into()), self))?;
        Ok(Html(html).into_response())
    }

    pub fn error(self, err: impl Into<AppError>) -> UiError {
        UiError::new(err.into(), self)
    }
}

#[derive(Template)]
#[template(path = "partials/alert.html")]
pub struct AlertTemplate {
    pub status: u16,
    pub message: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPageTemplate {
    pub status: u16,
    pub message: String,
}

/// [`AppError`] rendered as HTML: an alert fragment swapped into `#alerts`
/// for htmx, a standalone page otherwise.
#[derive(Debug)]
pub struct UiError {
    pub error: AppError,
    pub htmx: bool,
}

impl UiError {
    pub fn new(error: AppError, hx: HxRequest) -> Self {
        Self {
            error,
            htmx: hx.0,
        }
    }
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.error, status = status.as_u16(), "Request failed");
        } else {
            tracing::warn!(error = %self.error, status = status.as_u16(), "Request rejected");
        }

        let message = self.error.public_message();
        let rendered = if self.htmx {
            AlertTemplate {
                status: status.as_u16(),
                message,
            }
            .render()
        } else {
            ErrorPageTemplate {
                status: status.as_u16(),
                message,
            }
            .render()
        };

        let body = match rendered {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error template");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
            }
        };

        let mut response = (status, Html(body)).into_response();
        if self.htmx {
            let headers = response.headers_mut();
            headers.insert(HX_RETARGET, HeaderValue::from_static("#alerts"));
            headers.insert(HX_RESWAP, HeaderValue::from_static("innerHTML"));
        }
        if let AppError::TooManyRequests(_, Some(retry)) = &self.error {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, (*retry).into());
        }
        response
    }
}
