/// Minimal W3C WebDriver client (Appium flavour) for element geometry.
///
/// Speaks plain HTTP/JSON: create a session, look elements up by resource id,
/// read their rect, grab a screenshot, and delete the session.
use async_trait::async_trait;
use base64::Engine as _;
use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use crate::config::DriverConfig;
use crate::errors::{PillCheckError, PillCheckResult};
use crate::geometry::traits::GeometrySource;
use crate::timeline::Rect;

/// Key under which W3C drivers return element references.
const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52f-4f18f5acb4fb";
/// Pre-W3C (JSON Wire) element key, still returned by older Appium servers.
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

static NULL: Value = Value::Null;

pub struct WebDriverSession {
    base_url: String,
    session_id: String,
    client: reqwest::Client,
}

impl WebDriverSession {
    /// `POST /session` with the configured capabilities.
    pub async fn open(cfg: &DriverConfig) -> PillCheckResult<Self> {
        let client = reqwest::Client::new();
        let base_url = cfg.server_url.trim_end_matches('/').to_string();
        let body = json!({
            "capabilities": {
                "alwaysMatch": Value::Object(cfg.capabilities.clone()),
                "firstMatch": [{}],
            }
        });

        tracing::debug!(server = %base_url, "opening WebDriver session");
        let response = client.post(format!("{base_url}/session")).json(&body).send().await?;
        let payload: Value = response.json().await?;
        let session_id = parse_session_id(&payload)?;
        tracing::info!(session = %session_id, "WebDriver session opened");

        Ok(Self {
            base_url,
            session_id,
            client,
        })
    }

    /// Open a session, run `body` against it, and close the session on every
    /// exit path. A failed close is logged; the body's result wins.
    ///
    /// The body returns a boxed future borrowing the session, e.g.
    /// `|s| async move { s.screenshot().await }.boxed()`.
    pub async fn scoped<T, F>(cfg: &DriverConfig, body: F) -> PillCheckResult<T>
    where
        F: for<'s> FnOnce(&'s WebDriverSession) -> BoxFuture<'s, PillCheckResult<T>>,
    {
        let session = Self::open(cfg).await?;
        let result = body(&session).await;
        if let Err(e) = session.quit().await {
            tracing::warn!(error = %e, "failed to close WebDriver session");
        }
        result
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `DELETE /session/{id}`.
    pub async fn quit(self) -> PillCheckResult<()> {
        let url = self.session_url("");
        let response = self.client.delete(&url).send().await?;
        let payload: Value = response.json().await.unwrap_or(Value::Null);
        check_error(&payload, "")?;
        tracing::info!(session = %self.session_id, "WebDriver session closed");
        Ok(())
    }

    /// Find an element by resource id and return its opaque element reference.
    pub async fn find_element_by_id(&self, element_id: &str) -> PillCheckResult<String> {
        let response = self
            .client
            .post(self.session_url("/element"))
            .json(&json!({ "using": "id", "value": element_id }))
            .send()
            .await?;
        let payload: Value = response.json().await?;
        parse_element_ref(&payload, element_id)
    }

    /// `GET /session/{id}/element/{ref}/rect`.
    pub async fn element_rect_by_ref(&self, element_ref: &str, element_id: &str) -> PillCheckResult<Rect> {
        let response = self
            .client
            .get(self.session_url(&format!("/element/{element_ref}/rect")))
            .send()
            .await?;
        let payload: Value = response.json().await?;
        parse_rect(&payload, element_id)
    }

    /// Current screen as PNG bytes.
    pub async fn screenshot(&self) -> PillCheckResult<Vec<u8>> {
        let response = self.client.get(self.session_url("/screenshot")).send().await?;
        let payload: Value = response.json().await?;
        let value = check_error(&payload, "")?;
        let encoded = value
            .as_str()
            .ok_or_else(|| PillCheckError::Driver("screenshot response is not a string".into()))?;
        // Some drivers wrap the base64 payload at 76 columns.
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        Ok(base64::engine::general_purpose::STANDARD.decode(cleaned)?)
    }

    fn session_url(&self, suffix: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, suffix)
    }
}

#[async_trait]
impl GeometrySource for WebDriverSession {
    async fn element_rect(&self, element_id: &str) -> PillCheckResult<Rect> {
        let element_ref = self.find_element_by_id(element_id).await?;
        let rect = self.element_rect_by_ref(&element_ref, element_id).await?;
        tracing::debug!(
            element = %element_id,
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "element rect"
        );
        Ok(rect)
    }
}

// ── Response decoding ───────────────────────────────────────────────────────

/// Return the `value` member, or map a protocol error into a crate error.
/// `no such element` becomes `ElementNotFound(element_id)`.
fn check_error<'a>(payload: &'a Value, element_id: &str) -> PillCheckResult<&'a Value> {
    let value = payload.get("value").unwrap_or(&NULL);
    if let Some(kind) = value.get("error").and_then(Value::as_str) {
        let message = value.get("message").and_then(Value::as_str).unwrap_or("");
        if kind == "no such element" {
            return Err(PillCheckError::ElementNotFound(element_id.to_string()));
        }
        return Err(PillCheckError::Driver(format!("{kind}: {message}")));
    }
    // JSON Wire status codes: 0 is success, 7 is NoSuchElement.
    match payload.get("status").and_then(Value::as_i64) {
        None | Some(0) => Ok(value),
        Some(7) => Err(PillCheckError::ElementNotFound(element_id.to_string())),
        Some(code) => Err(PillCheckError::Driver(format!("legacy status {code}"))),
    }
}

fn parse_session_id(payload: &Value) -> PillCheckResult<String> {
    let value = check_error(payload, "")?;
    value
        .get("sessionId")
        .or_else(|| payload.get("sessionId"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PillCheckError::Driver("new session response has no sessionId".into()))
}

fn parse_element_ref(payload: &Value, element_id: &str) -> PillCheckResult<String> {
    let value = check_error(payload, element_id)?;
    value
        .get(W3C_ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PillCheckError::ElementNotFound(element_id.to_string()))
}

fn parse_rect(payload: &Value, element_id: &str) -> PillCheckResult<Rect> {
    let value = check_error(payload, element_id)?;
    Ok(serde_json::from_value(value.clone())?)
}
