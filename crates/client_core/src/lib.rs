use quiz_forms::Submission;
use reqwest::{
    header::{CONTENT_TYPE, COOKIE, LOCATION, REFERER},
    redirect::Policy,
    Client, Response, StatusCode,
};
use shared::{
    domain::QuizId,
    error::{ApiException, ErrorCode},
    protocol::{save_toggle_path, SaveToggleResponse},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod save_button;

pub use error::{ClientError, ErrorCategory};
pub use save_button::{SaveButton, SaveFeedback};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";
const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
const AJAX_MARKER: &str = "XMLHttpRequest";
const LOGIN_PATH_PREFIX: &str = "/accounts/login/";

/// What the server did with a posted quiz form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; the server redirected to the given location.
    Redirected(String),
    /// The form was re-rendered, i.e. the server found validation errors.
    Rejected { status: u16 },
}

/// HTTP client for the two endpoints the quiz pages call: the quiz form post
/// and the JSON save toggle. Redirects are never followed so the caller can
/// tell a successful save from a re-rendered form or a login bounce.
#[derive(Clone)]
pub struct QuizClient {
    http: Client,
    base_url: Url,
    csrf_token: Option<String>,
    session_id: Option<String>,
}

impl QuizClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|source| ClientError::InvalidUrl {
            raw: base_url.to_string(),
            source,
        })?;
        let http = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|source| ClientError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            csrf_token: None,
            session_id: None,
        })
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidUrl {
                raw: path.to_string(),
                source,
            })
    }

    fn cookie_header(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(session_id) = &self.session_id {
            parts.push(format!("sessionid={session_id}"));
        }
        if let Some(token) = &self.csrf_token {
            parts.push(format!("csrftoken={token}"));
        }
        (!parts.is_empty()).then(|| parts.join("; "))
    }

    fn post(&self, url: &Url) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .post(url.clone())
            .header(REFERER, self.base_url.as_str());
        if let Some(cookie) = self.cookie_header() {
            request = request.header(COOKIE, cookie);
        }
        request
    }

    /// Toggles the saved state of a quiz for the signed-in user. No retries.
    pub async fn toggle_save(&self, quiz_id: QuizId) -> Result<SaveToggleResponse, ClientError> {
        let url = self.endpoint(&save_toggle_path(quiz_id))?;
        let mut request = self
            .post(&url)
            .header(REQUESTED_WITH_HEADER, AJAX_MARKER)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = ensure_success(response)?;
        let body: SaveToggleResponse =
            response
                .json()
                .await
                .map_err(|source| ClientError::Decode {
                    url: url.to_string(),
                    source,
                })?;
        info!(quiz_id = quiz_id.0, saved = body.saved, "quiz save toggled");
        Ok(body)
    }

    /// Posts an encoded formset (plus the CSRF form field) to a quiz form page.
    pub async fn submit_formset(
        &self,
        path: &str,
        submission: &Submission,
    ) -> Result<SubmitOutcome, ClientError> {
        let url = self.endpoint(path)?;
        let mut fields = submission.clone();
        if let Some(token) = &self.csrf_token {
            fields.push(CSRF_FORM_FIELD, token.as_str());
        }

        let response = self
            .post(&url)
            .form(&fields)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_redirection() {
            let location = redirect_location(&response).unwrap_or_default();
            if location.starts_with(LOGIN_PATH_PREFIX) {
                return Err(unauthorized(&location).into());
            }
            info!(path, location = %location, "quiz form accepted");
            return Ok(SubmitOutcome::Redirected(location));
        }
        if status == StatusCode::OK {
            warn!(path, "quiz form re-rendered with errors");
            return Ok(SubmitOutcome::Rejected {
                status: status.as_u16(),
            });
        }
        Err(status_error(status).into())
    }
}

fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // login_required answers a bounce instead of a 401 for plain sessions.
    if status.is_redirection() {
        let location = redirect_location(&response).unwrap_or_default();
        if location.starts_with(LOGIN_PATH_PREFIX) {
            return Err(unauthorized(&location).into());
        }
    }
    debug!(status = status.as_u16(), "request rejected");
    Err(status_error(status).into())
}

fn redirect_location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn unauthorized(location: &str) -> ApiException {
    ApiException::new(
        ErrorCode::Unauthorized,
        format!("authentication required (redirected to {location})"),
    )
}

fn status_error(status: StatusCode) -> ApiException {
    ApiException::new(
        ErrorCode::from_status(status.as_u16()),
        format!("server responded with {status}"),
    )
}

/// Absolute quiz URL from the page origin and the quiz's relative URL.
pub fn share_link(origin: &str, relative: &str) -> Result<Url, ClientError> {
    let origin = Url::parse(origin).map_err(|source| ClientError::InvalidUrl {
        raw: origin.to_string(),
        source,
    })?;
    origin
        .join(relative)
        .map_err(|source| ClientError::InvalidUrl {
            raw: relative.to_string(),
            source,
        })
}

pub fn share_text(title: &str) -> String {
    format!("Take this quiz: {title}")
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
