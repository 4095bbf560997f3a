//! W3C WebDriver implementation of [`PageDriver`].
//!
//! Speaks the `WebDriver` wire protocol (HTTP + JSON) directly against a
//! `chromedriver` endpoint. Element lookups are stateless: every
//! operation resolves its selector fresh, so callers survive player
//! re-renders that replace DOM nodes between ticks.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Method;
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::driver::{PageDriver, PageLink};
use crate::{AppError, Result};

/// W3C element identifier key in `WebDriver` payloads.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for bounded element waits.
const LOCATE_POLL: Duration = Duration::from_millis(250);

/// Extract the element id from a W3C element reference object.
fn element_id(value: &Value) -> Option<String> {
    value.get(ELEMENT_KEY).and_then(Value::as_str).map(str::to_owned)
}

/// Browser session backed by a remote `chromedriver`.
pub struct WebDriverSession {
    http: reqwest::Client,
    session_url: String,
}

impl WebDriverSession {
    /// Create a browser session against a `WebDriver` endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Driver` if the endpoint is unreachable or
    /// refuses to create a session.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        let http = reqwest::Client::new();
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": [
                            "--start-maximized",
                            "--disable-blink-features=AutomationControlled",
                        ],
                    },
                },
            },
        });

        let base = endpoint.trim_end_matches('/');
        let body: Value = http
            .post(format!("{base}/session"))
            .json(&capabilities)
            .send()
            .await?
            .json()
            .await?;

        let session_id = body
            .pointer("/value/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Driver(format!("no session id in response: {body}")))?;
        debug!(session_id, "webdriver session created");

        Ok(Self {
            session_url: format!("{base}/session/{session_id}"),
            http,
        })
    }

    /// Issue one `WebDriver` command and surface protocol-level errors.
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.session_url));
        if let Some(payload) = body {
            request = request.json(&payload);
        }
        let value: Value = request.send().await?.json().await?;

        if let Some(error) = value.pointer("/value/error").and_then(Value::as_str) {
            let message = value
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if error == "no such element" {
                return Err(AppError::NotFound(format!("{error}: {message}")));
            }
            return Err(AppError::Driver(format!("{error}: {message}")));
        }
        Ok(value)
    }

    async fn find_element(&self, selector: &str) -> Result<String> {
        let body = json!({ "using": "css selector", "value": selector });
        let response = self.command(Method::POST, "/element", Some(body)).await?;
        response
            .pointer("/value")
            .and_then(element_id)
            .ok_or_else(|| AppError::NotFound(format!("no element for selector {selector}")))
    }

    async fn find_elements(&self, selector: &str) -> Result<Vec<String>> {
        let body = json!({ "using": "css selector", "value": selector });
        let response = self.command(Method::POST, "/elements", Some(body)).await?;
        let ids = response
            .pointer("/value")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(element_id).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    async fn element_text(&self, element: &str) -> Result<String> {
        let response = self
            .command(Method::GET, &format!("/element/{element}/text"), None)
            .await?;
        Ok(response
            .pointer("/value")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned())
    }

    async fn element_attribute(&self, element: &str, name: &str) -> Result<Option<String>> {
        let response = self
            .command(
                Method::GET,
                &format!("/element/{element}/attribute/{name}"),
                None,
            )
            .await?;
        Ok(response
            .pointer("/value")
            .and_then(Value::as_str)
            .map(str::to_owned))
    }
}

impl PageDriver for WebDriverSession {
    fn navigate(&self, url: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let url = url.to_owned();
        Box::pin(async move {
            self.command(Method::POST, "/url", Some(json!({ "url": url })))
                .await?;
            Ok(())
        })
    }

    fn locate(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + '_>> {
        let selector = selector.to_owned();
        Box::pin(async move {
            let deadline = Instant::now() + timeout;
            loop {
                match self.find_element(&selector).await {
                    Ok(_) => return Ok(true),
                    Err(AppError::NotFound(_)) => {}
                    Err(err) => return Err(err),
                }
                if Instant::now() >= deadline {
                    return Ok(false);
                }
                sleep(LOCATE_POLL).await;
            }
        })
    }

    fn read_text(&self, selector: &str) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        let selector = selector.to_owned();
        Box::pin(async move {
            let element = self.find_element(&selector).await?;
            self.element_text(&element).await
        })
    }

    fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
        let selector = selector.to_owned();
        let name = name.to_owned();
        Box::pin(async move {
            let element = self.find_element(&selector).await?;
            self.element_attribute(&element, &name).await
        })
    }

    fn click(&self, selector: &str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let selector = selector.to_owned();
        Box::pin(async move {
            let element = self.find_element(&selector).await?;
            self.command(
                Method::POST,
                &format!("/element/{element}/click"),
                Some(json!({})),
            )
            .await?;
            Ok(())
        })
    }

    fn type_text(
        &self,
        selector: &str,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let selector = selector.to_owned();
        let text = text.to_owned();
        Box::pin(async move {
            let element = self.find_element(&selector).await?;
            self.command(
                Method::POST,
                &format!("/element/{element}/value"),
                Some(json!({ "text": text })),
            )
            .await?;
            Ok(())
        })
    }

    fn collect_links(
        &self,
        selector: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PageLink>>> + Send + '_>> {
        let selector = selector.to_owned();
        Box::pin(async move {
            let mut links = Vec::new();
            for element in self.find_elements(&selector).await? {
                // Links can vanish between listing and read; skip those.
                let text = match self.element_text(&element).await {
                    Ok(text) => text,
                    Err(AppError::NotFound(_)) => continue,
                    Err(err) => return Err(err),
                };
                let href = match self.element_attribute(&element, "href").await {
                    Ok(Some(href)) => href,
                    Ok(None) | Err(AppError::NotFound(_)) => continue,
                    Err(err) => return Err(err),
                };
                links.push(PageLink { text, href });
            }
            Ok(links)
        })
    }

    fn subdocument_count(&self) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>> {
        Box::pin(async move { Ok(self.find_elements("iframe").await?.len()) })
    }

    fn enter_subdocument(
        &self,
        index: usize,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let frames = self.find_elements("iframe").await?;
            let element = frames
                .get(index)
                .ok_or_else(|| AppError::NotFound(format!("no sub-document at index {index}")))?;
            self.command(
                Method::POST,
                "/frame",
                Some(json!({ "id": { (ELEMENT_KEY): element } })),
            )
            .await?;
            Ok(())
        })
    }

    fn return_to_parent(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.command(Method::POST, "/frame/parent", Some(json!({})))
                .await?;
            Ok(())
        })
    }

    fn teardown(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.command(Method::DELETE, "", None).await?;
            debug!("webdriver session deleted");
            Ok(())
        })
    }
}
