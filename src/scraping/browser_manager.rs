//! Attaching to the user's already-running browser over CDP.
//!
//! The harvester never launches or navigates a browser: the user opens the
//! group's member-request queue in a browser started with
//! `--remote-debugging-port`, and this module finds that tab.

use anyhow::{anyhow, bail, Result};
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

/// Default URL fragment identifying the request-queue tab.
pub const DEFAULT_TAB_FRAGMENT: &str = "/requests";

/// A CDP connection plus the task draining its event stream.
pub struct AttachedBrowser {
    pub browser: Browser,
    handler: JoinHandle<()>,
}

impl AttachedBrowser {
    /// Connect to `debug_url` (`http://host:port` or a `ws://` endpoint).
    pub async fn connect(debug_url: &str) -> Result<Self> {
        let debug_url = normalize_debug_url(debug_url)?;
        info!("attaching to browser at {}", debug_url);
        let (browser, mut handler) = Browser::connect(debug_url.as_str())
            .await
            .map_err(|e| anyhow!("failed to attach to {}: {}", debug_url, e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Open tabs with their current URLs.
    pub async fn tabs(&mut self) -> Result<Vec<(Page, String)>> {
        // Tabs that existed before we attached are unknown until discovered.
        if let Err(e) = self.browser.fetch_targets().await {
            warn!("target discovery failed (non-fatal): {}", e);
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        let pages = self
            .browser
            .pages()
            .await
            .map_err(|e| anyhow!("failed to list tabs: {}", e))?;

        let mut tabs = Vec::with_capacity(pages.len());
        for page in pages {
            let url = page.url().await.ok().flatten().unwrap_or_default();
            tabs.push((page, url));
        }
        Ok(tabs)
    }

    /// The first tab whose URL contains `fragment`, else the first tab.
    pub async fn select_tab(&mut self, fragment: &str) -> Result<Page> {
        let tabs = self.tabs().await?;
        let urls: Vec<&str> = tabs.iter().map(|(_, url)| url.as_str()).collect();
        let index = pick_tab(&urls, fragment)
            .ok_or_else(|| anyhow!("the attached browser has no open tabs"))?;

        if !urls[index].contains(fragment) {
            warn!(
                "no tab matches '{}', falling back to {}",
                fragment, urls[index]
            );
        } else {
            info!("using tab {}", urls[index]);
        }
        tabs.into_iter()
            .nth(index)
            .map(|(page, _)| page)
            .ok_or_else(|| anyhow!("tab {} disappeared", index))
    }

    /// Stop listening. The browser itself is left running.
    pub fn detach(self) {
        self.handler.abort();
    }
}

/// Accepts `host:port` shorthand as well as `http(s)://` and `ws(s)://` endpoints.
pub fn normalize_debug_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };
    let parsed =
        Url::parse(&candidate).map_err(|e| anyhow!("invalid debug endpoint '{}': {}", raw, e))?;
    match parsed.scheme() {
        "http" | "https" | "ws" | "wss" => {}
        other => bail!("unsupported debug endpoint scheme '{}'", other),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        bail!("debug endpoint '{}' has no host", raw);
    }
    Ok(candidate.trim_end_matches('/').to_string())
}

fn pick_tab(urls: &[&str], fragment: &str) -> Option<usize> {
    if urls.is_empty() {
        return None;
    }
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Some(0);
    }
    Some(urls.iter().position(|u| u.contains(fragment)).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_debug_url() {
        assert_eq!(
            normalize_debug_url("127.0.0.1:9222").unwrap(),
            "http://127.0.0.1:9222"
        );
        assert_eq!(
            normalize_debug_url(" http://localhost:9333/ ").unwrap(),
            "http://localhost:9333"
        );
        let ws = "ws://127.0.0.1:9222/devtools/browser/4f2c";
        assert_eq!(normalize_debug_url(ws).unwrap(), ws);
        assert!(normalize_debug_url("ftp://127.0.0.1:9222").is_err());
        assert!(normalize_debug_url("http://").is_err());
    }

    #[test]
    fn test_pick_tab_prefers_fragment_match() {
        let urls = [
            "https://www.facebook.com/",
            "https://www.facebook.com/groups/123/member-requests",
        ];
        assert_eq!(pick_tab(&urls, DEFAULT_TAB_FRAGMENT), Some(1));
    }

    #[test]
    fn test_pick_tab_falls_back_to_first() {
        assert_eq!(pick_tab(&["about:blank", "https://example.com"], "/requests"), Some(0));
        assert_eq!(pick_tab(&["https://example.com"], "  "), Some(0));
        assert_eq!(pick_tab(&[], "/requests"), None);
    }
}
