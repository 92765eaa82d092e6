//! The live page the harvester drives: scroll, measure, snapshot.

use crate::extract::dom::{HEIGHT_ATTR, WIDTH_ATTR};
use crate::HarvestError;
use async_trait::async_trait;
use chromiumoxide::Page;

#[async_trait]
pub trait PageHost: Send + Sync {
    /// Current maximum scrollable content height, in px.
    async fn content_extent(&self) -> Result<u64, HarvestError>;

    async fn scroll_to(&self, y: u64) -> Result<(), HarvestError>;

    /// Outer HTML of the document with rendered sizes stamped on every
    /// element (`data-harvest-h` / `data-harvest-w`).
    async fn snapshot_html(&self) -> Result<String, HarvestError>;
}

const EXTENT_SCRIPT: &str =
    "Math.max(document.body ? document.body.scrollHeight : 0, document.documentElement.scrollHeight)";

/// Stamps `offsetHeight` / `offsetWidth` on every element so the static
/// snapshot still knows how big each card was on screen.
pub fn size_annotation_script() -> String {
    format!(
        r#"
(function harvestAnnotateSizes() {{
    'use strict';
    var all = document.body ? document.body.getElementsByTagName('*') : [];
    var n = 0;
    for (var i = 0; i < all.length; i++) {{
        var el = all[i];
        if (typeof el.offsetHeight !== 'number') continue;
        el.setAttribute('{h}', String(el.offsetHeight));
        el.setAttribute('{w}', String(el.offsetWidth));
        n++;
    }}
    return n;
}})();
"#,
        h = HEIGHT_ATTR,
        w = WIDTH_ATTR
    )
}

/// [`PageHost`] over a CDP-attached tab.
pub struct CdpPageHost {
    page: Page,
}

impl CdpPageHost {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

fn host_err(what: &str, e: impl std::fmt::Display) -> HarvestError {
    HarvestError::Host(format!("{}: {}", what, e))
}

#[async_trait]
impl PageHost for CdpPageHost {
    async fn content_extent(&self) -> Result<u64, HarvestError> {
        let value = self
            .page
            .evaluate(EXTENT_SCRIPT)
            .await
            .map_err(|e| host_err("extent read failed", e))?
            .into_value::<serde_json::Value>()
            .map_err(|e| host_err("extent not a value", e))?;
        value
            .as_f64()
            .map(|v| v.max(0.0) as u64)
            .ok_or_else(|| HarvestError::Host(format!("extent not a number: {}", value)))
    }

    async fn scroll_to(&self, y: u64) -> Result<(), HarvestError> {
        self.page
            .evaluate(format!("window.scrollTo(0, {y});"))
            .await
            .map_err(|e| host_err("scroll failed", e))?;
        Ok(())
    }

    async fn snapshot_html(&self) -> Result<String, HarvestError> {
        if let Err(e) = self.page.evaluate(size_annotation_script()).await {
            // Sizes only sharpen the card walk; the walk still ends at its depth bound.
            tracing::warn!("size annotation failed (non-fatal): {}", e);
        }
        self.page
            .content()
            .await
            .map_err(|e| host_err("failed to get page content", e))
    }
}
