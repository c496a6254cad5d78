//! Bot-wall detection via a headless browser.
//!
//! Each check launches an isolated browser, navigates to the site, waits a
//! fixed settle period for client-side challenges to render, then classifies
//! the page with an ordered battery of heuristics. The first matching rule
//! wins:
//!
//! 1. Challenge-widget DOM selectors (reCAPTCHA, hCaptcha, Turnstile, …).
//! 2. Blocking phrases in the rendered body text.
//! 3. DDoS-protection DOM selectors, or protection phrases in the title.
//! 4. HTTP response status 403 or 429.
//!
//! A full-page screenshot is always captured and returned inline; nothing is
//! written to disk. Any failure during launch, navigation, or evaluation is
//! downgraded to a verdict with `error` set and `detected = false`; the
//! detector never raises past the batch boundary.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chromiumoxide::cdp::browser_protocol::network::EventResponseReceived;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::{BROWSER_NAV_TIMEOUT, CHALLENGE_SETTLE_DELAY};

/// Challenge-widget markers: a hit means an interactive challenge is on
/// screen right now.
const CHALLENGE_SELECTORS: &[&str] = &[
    "iframe[src*=\"recaptcha\"]",
    ".g-recaptcha",
    "iframe[src*=\"hcaptcha\"]",
    ".h-captcha",
    "iframe[src*=\"turnstile\"]",
    ".cf-turnstile",
    "#challenge-stage",
    "#challenge-form",
];

/// Phrases in the rendered body text that indicate access is being blocked.
const BLOCKING_PHRASES: &[&str] = &[
    "access denied",
    "verify you are human",
    "verify that you are human",
    "are you a robot",
    "rate limited",
    "too many requests",
    "unusual traffic",
    "has been blocked",
];

/// DDoS-mitigation interstitial markers.
const DDOS_SELECTORS: &[&str] = &[
    "#cf-wrapper",
    ".cf-browser-verification",
    "#cf-challenge-running",
    "#ddos-protection",
    ".sucuri-block",
];

/// Protection-related phrases in the page title.
const TITLE_PHRASES: &[&str] = &[
    "just a moment",
    "attention required",
    "access denied",
    "security check",
    "ddos protection",
];

/// Which rule classified the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BotWallKind {
    Challenge,
    BlockingText,
    DdosProtection,
    HttpStatus,
}

/// The outcome of one bot-wall check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotWallVerdict {
    pub domain: String,
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<BotWallKind>,
    /// PNG screenshot, base64-encoded; absent when capture failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// DOM-selector hits gathered from the rendered page.
#[derive(Debug, Clone, Copy, Default)]
struct SelectorHits {
    challenge: bool,
    ddos: bool,
}

/// What the browser observed after navigation and settle.
#[derive(Debug, Default)]
struct PageObservation {
    hits: SelectorHits,
    body_text: String,
    title: String,
    status: Option<u16>,
    screenshot: Option<Vec<u8>>,
}

/// Applies the classification rules in priority order; first match wins.
fn classify(hits: SelectorHits, body_text: &str, title: &str, status: Option<u16>) -> Option<BotWallKind> {
    if hits.challenge {
        return Some(BotWallKind::Challenge);
    }

    let body_lower = body_text.to_lowercase();
    if BLOCKING_PHRASES.iter().any(|phrase| body_lower.contains(phrase)) {
        return Some(BotWallKind::BlockingText);
    }

    let title_lower = title.to_lowercase();
    if hits.ddos || TITLE_PHRASES.iter().any(|phrase| title_lower.contains(phrase)) {
        return Some(BotWallKind::DdosProtection);
    }

    if matches!(status, Some(403) | Some(429)) {
        return Some(BotWallKind::HttpStatus);
    }

    None
}

/// Builds the JS expression testing whether any selector in the list matches.
fn any_selector_script(selectors: &[&str]) -> String {
    let list = serde_json::to_string(selectors).unwrap_or_else(|_| "[]".into());
    format!(
        "{list}.some(s => {{ try {{ return document.querySelector(s) !== null; }} catch (e) {{ return false; }} }})"
    )
}

async fn evaluate_bool(page: &chromiumoxide::Page, script: String) -> bool {
    match page.evaluate(script).await {
        Ok(result) => result.into_value::<bool>().unwrap_or(false),
        Err(e) => {
            debug!("Selector evaluation failed: {e}");
            false
        }
    }
}

async fn evaluate_string(page: &chromiumoxide::Page, script: &str) -> String {
    match page.evaluate(script).await {
        Ok(result) => result.into_value::<String>().unwrap_or_default(),
        Err(e) => {
            debug!("Page evaluation failed: {e}");
            String::new()
        }
    }
}

/// Drives a fresh browser to the URL and gathers everything the classifier
/// needs. This is the only function that can fail; the public entry point
/// converts its error into a verdict.
async fn observe_page(url: &str, user_agent: &str) -> anyhow::Result<PageObservation> {
    let browser_config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg(format!("--user-agent={user_agent}"))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    let (mut browser, mut handler) = Browser::launch(browser_config).await?;

    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    let result = async {
        let page = browser.new_page("about:blank").await?;

        // Record the main document's response status as it arrives.
        let document_status: Arc<Mutex<Option<u16>>> = Arc::new(Mutex::new(None));
        let status_sink = Arc::clone(&document_status);
        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                if event.r#type == chromiumoxide::cdp::browser_protocol::network::ResourceType::Document {
                    if let Ok(mut slot) = status_sink.lock() {
                        if slot.is_none() {
                            *slot = Some(event.response.status as u16);
                        }
                    }
                }
            }
        });

        debug!("Navigating to {url}");
        tokio::time::timeout(BROWSER_NAV_TIMEOUT, page.goto(url)).await??;

        // Let client-side challenges render before inspecting the DOM.
        tokio::time::sleep(CHALLENGE_SETTLE_DELAY).await;

        let hits = SelectorHits {
            challenge: evaluate_bool(&page, any_selector_script(CHALLENGE_SELECTORS)).await,
            ddos: evaluate_bool(&page, any_selector_script(DDOS_SELECTORS)).await,
        };
        let body_text =
            evaluate_string(&page, "document.body ? document.body.innerText : ''").await;
        let title = page.get_title().await.ok().flatten().unwrap_or_default();

        let screenshot = match page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
        {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Screenshot capture failed for {url}: {e}");
                None
            }
        };

        let status = document_status.lock().ok().and_then(|slot| *slot);

        Ok::<PageObservation, anyhow::Error>(PageObservation {
            hits,
            body_text,
            title,
            status,
            screenshot,
        })
    }
    .await;

    let _ = browser.close().await;
    handler_task.abort();

    result
}

/// Checks one URL for a bot-challenge wall.
///
/// Never fails: launch or navigation errors come back as a verdict with
/// `error` set and `detected = false`.
pub async fn check_bot_wall(url: &str, user_agent: &str) -> BotWallVerdict {
    let started = Instant::now();

    match observe_page(url, user_agent).await {
        Ok(observation) => {
            let classification = classify(
                observation.hits,
                &observation.body_text,
                &observation.title,
                observation.status,
            );
            let latency_ms = started.elapsed().as_millis() as u64;
            info!(
                "Bot-wall check for {url}: {} ({latency_ms}ms)",
                match classification {
                    Some(kind) => format!("detected ({kind:?})"),
                    None => "no challenge detected".to_string(),
                }
            );
            BotWallVerdict {
                domain: url.to_string(),
                detected: classification.is_some(),
                classification,
                screenshot: observation.screenshot.map(|bytes| BASE64.encode(bytes)),
                latency_ms,
                error: None,
            }
        }
        Err(e) => {
            warn!("Bot-wall check failed for {url}: {e}");
            BotWallVerdict {
                domain: url.to_string(),
                detected: false,
                classification: None,
                screenshot: None,
                latency_ms: started.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
            }
        }
    }
}
