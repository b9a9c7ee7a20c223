use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use xhswatch_core::FetchError;

/// Browser cookie handed to the rendering service before navigation.
/// Field names follow the DevTools cookie parameter shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: String,
}

/// One search-page load: where to navigate, what to collect, and how long
/// each blocking step may take.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub url: String,
    /// Selector to wait for after navigation; a miss is not fatal.
    pub wait_selector: Option<String>,
    /// Anchors to collect from the rendered DOM.
    pub anchor_selector: String,
    /// Substring of the API response URL to capture during page load.
    pub intercept_pattern: String,
    pub navigation_timeout: Duration,
    pub intercept_timeout: Duration,
    pub cookies: Vec<Cookie>,
    pub user_agent: Option<String>,
    pub headless: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

/// Everything captured from one page load. The live page is opened and
/// released inside the renderer call, so holders of this value never own a
/// remote resource.
#[derive(Debug, Default)]
pub struct RenderedPage {
    pub anchors: Vec<Anchor>,
    pub payload: Option<serde_json::Value>,
}

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request: &PageRequest) -> Result<RenderedPage, FetchError>;
}

/// In-page capture routine executed by the rendering service: inject
/// cookies and user agent, navigate, race the API interception against its
/// wait window, and collect matching anchors.
const CAPTURE_FUNCTION: &str = r#"
export default async function ({ page, context }) {
    const {
        url, waitSelector, anchorSelector, interceptPattern,
        navigationTimeoutMs, interceptTimeoutMs, cookies, userAgent,
    } = context;

    if (userAgent) {
        await page.setUserAgent(userAgent);
    }
    if (cookies && cookies.length) {
        await page.setCookie(...cookies);
    }

    const captured = new Promise((resolve) => {
        page.on('response', async (response) => {
            if (!response.url().includes(interceptPattern)) {
                return;
            }
            try {
                resolve(await response.json());
            } catch (err) {
                resolve(null);
            }
        });
    });

    await page.goto(url, { waitUntil: 'networkidle2', timeout: navigationTimeoutMs });
    if (waitSelector) {
        await page.waitForSelector(waitSelector, { timeout: interceptTimeoutMs }).catch(() => {});
    }

    const anchors = await page.$$eval(anchorSelector, (elements) =>
        elements.map((el) => ({
            href: el.getAttribute('href'),
            text: (el.innerText || '').trim(),
        }))
    );

    const windowElapsed = new Promise((resolve) => setTimeout(() => resolve(null), interceptTimeoutMs));
    const payload = await Promise.race([captured, windowElapsed]);

    return {
        data: { anchors: anchors.filter((a) => a.href), payload },
        type: 'application/json',
    };
}
"#;

#[derive(Debug, Deserialize)]
struct CaptureOutcome {
    #[serde(default)]
    anchors: Vec<Anchor>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// HTTP client for a Browserless-style `/function` rendering endpoint.
pub struct BrowserlessRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessRenderer {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    fn endpoint(&self, headless: bool) -> String {
        let mut endpoint = format!("{}/function?launch={{\"headless\":{headless}}}", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("&token={token}"));
        }
        endpoint
    }
}

#[async_trait]
impl Renderer for BrowserlessRenderer {
    async fn render(&self, request: &PageRequest) -> Result<RenderedPage, FetchError> {
        let body = serde_json::json!({
            "code": CAPTURE_FUNCTION,
            "context": {
                "url": request.url,
                "waitSelector": request.wait_selector,
                "anchorSelector": request.anchor_selector,
                "interceptPattern": request.intercept_pattern,
                "navigationTimeoutMs": request.navigation_timeout.as_millis() as u64,
                "interceptTimeoutMs": request.intercept_timeout.as_millis() as u64,
                "cookies": request.cookies,
                "userAgent": request.user_agent,
            },
        });

        // The service needs room for navigation plus the interception wait
        // before this client may give up on the whole call.
        let call_timeout = request.navigation_timeout + request.intercept_timeout
            + Duration::from_secs(10);

        let resp = self
            .client
            .post(self.endpoint(request.headless))
            .timeout(call_timeout)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::NavigationTimeout {
                        url: request.url.clone(),
                        seconds: call_timeout.as_secs(),
                    }
                } else {
                    FetchError::Navigation {
                        url: request.url.clone(),
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(FetchError::RenderService {
                status: status.as_u16(),
                message,
            });
        }

        let outcome: CaptureOutcome = resp.json().await.map_err(|e| {
            FetchError::InvalidResponse {
                detail: e.to_string(),
            }
        })?;

        debug!(
            "Rendered {}: {} anchors, payload captured: {}",
            request.url,
            outcome.anchors.len(),
            outcome.payload.is_some()
        );

        Ok(RenderedPage {
            anchors: outcome.anchors,
            payload: outcome.payload,
        })
    }
}
