//! Error boundary around rendering.
//!
//! A panic inside a guarded region is caught and turned into an
//! [`ErrorPanel`]. The panel sticks until [`ErrorBoundary::reset`], so a
//! broken region doesn't re-run on every render.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

use opsconsole_flux::Translate;

pub const TITLE_KEY: &str = "common.renderError";
pub const RETRY_KEY: &str = "common.retry";
const TITLE_FALLBACK: &str = "界面出现错误";
const RETRY_FALLBACK: &str = "重试";

/// What the user sees in place of a region that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPanel {
    pub region: String,
    pub message: String,
}

impl ErrorPanel {
    pub fn title(&self, i18n: &dyn Translate) -> String {
        i18n.translate(TITLE_KEY, Some(TITLE_FALLBACK))
    }

    pub fn retry_label(&self, i18n: &dyn Translate) -> String {
        i18n.translate(RETRY_KEY, Some(RETRY_FALLBACK))
    }
}

#[derive(Debug, Default)]
pub struct ErrorBoundary {
    panel: Option<ErrorPanel>,
}

impl ErrorBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` for `region`. A panic becomes the boundary's panel; while a
    /// panel is set, `f` is not run at all.
    pub fn render<T, F>(&mut self, region: &str, f: F) -> Result<T, ErrorPanel>
    where
        F: FnOnce() -> T,
    {
        if let Some(panel) = &self.panel {
            return Err(panel.clone());
        }
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(v) => Ok(v),
            Err(payload) => {
                let panel = ErrorPanel {
                    region: region.to_string(),
                    message: panic_message(payload.as_ref()),
                };
                warn!("ErrorBoundary: {} failed: {}", region, panel.message);
                self.panel = Some(panel.clone());
                Err(panel)
            }
        }
    }

    pub fn panel(&self) -> Option<&ErrorPanel> {
        self.panel.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.panel.is_some()
    }

    /// The retry action: clear the panel so the next render runs again.
    pub fn reset(&mut self) {
        self.panel = None;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsconsole_flux::KeyEcho;

    #[test]
    fn passes_through_success() {
        let mut b = ErrorBoundary::new();
        assert_eq!(b.render("table", || 42), Ok(42));
        assert!(!b.has_error());
    }

    #[test]
    fn panic_becomes_sticky_panel() {
        let mut b = ErrorBoundary::new();
        let err = b
            .render("hosts", || -> u32 { panic!("cell renderer blew up") })
            .unwrap_err();
        assert_eq!(err.region, "hosts");
        assert_eq!(err.message, "cell renderer blew up");
        assert_eq!(err.title(&KeyEcho), "界面出现错误");
        assert_eq!(err.retry_label(&KeyEcho), "重试");

        let mut ran = false;
        assert!(b.render("hosts", || ran = true).is_err());
        assert!(!ran);

        b.reset();
        assert_eq!(b.render("hosts", || 1), Ok(1));
    }

    #[test]
    fn formatted_panic_message() {
        let mut b = ErrorBoundary::new();
        let id = 7;
        let err = b.render("logs", || -> u32 { panic!("row {} is broken", id) }).unwrap_err();
        assert_eq!(err.message, "row 7 is broken");
    }
}
