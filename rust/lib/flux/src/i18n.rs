//! Translator: locale-keyed message dictionaries with change broadcast.
//!
//! Rendering code never reaches for a global. It receives a `&dyn Translate`
//! and asks it for strings:
//!
//! ```ignore
//! let i18n = Translator::new("zh-CN");
//! i18n.add_messages("en-US", [("menu.dashboard", "Dashboard")]);
//! i18n.set_locale("en-US");
//! assert_eq!(i18n.translate("menu.dashboard", None), "Dashboard");
//! assert_eq!(i18n.translate("menu.unknown", Some("Fallback")), "Fallback");
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Anything that can turn a message key into display text.
pub trait Translate: Send + Sync {
    /// Look up `key` in the current locale. Missing keys fall back to
    /// `fallback`, then to the key itself.
    fn translate(&self, key: &str, fallback: Option<&str>) -> String;

    fn locale(&self) -> String;
}

/// Callback invoked with the new locale code after `set_locale`.
pub type LocaleListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned by [`Translator::on_locale_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct Translator {
    dictionaries: RwLock<HashMap<String, HashMap<String, String>>>,
    locale: RwLock<String>,
    listeners: RwLock<Vec<(ListenerId, LocaleListener)>>,
    next_id: AtomicU64,
}

impl Translator {
    pub fn new(locale: &str) -> Self {
        Self {
            dictionaries: RwLock::new(HashMap::new()),
            locale: RwLock::new(locale.to_string()),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Merge messages into a locale's dictionary. Later keys win.
    pub fn add_messages<I, K, V>(&self, locale: &str, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut dicts = self.dictionaries.write().unwrap();
        let dict = dicts.entry(locale.to_string()).or_default();
        for (k, v) in messages {
            dict.insert(k.into(), v.into());
        }
    }

    /// Switch the active locale and broadcast the change.
    ///
    /// Listeners run after the locale is updated, so a listener that
    /// translates sees the new strings. Setting the current locale again
    /// still broadcasts.
    pub fn set_locale(&self, locale: &str) {
        *self.locale.write().unwrap() = locale.to_string();
        debug!("Translator: locale -> {}", locale);
        let listeners: Vec<LocaleListener> = self
            .listeners
            .read()
            .unwrap()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(locale);
        }
    }

    pub fn on_locale_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push((id, Arc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners.write().unwrap().retain(|(i, _)| *i != id);
    }

    /// Locales that have at least one message, sorted.
    pub fn locales(&self) -> Vec<String> {
        let mut out: Vec<String> = self.dictionaries.read().unwrap().keys().cloned().collect();
        out.sort();
        out
    }
}

impl Translate for Translator {
    fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        let locale = self.locale.read().unwrap();
        let dicts = self.dictionaries.read().unwrap();
        match dicts.get(locale.as_str()).and_then(|d| d.get(key)) {
            Some(text) if !text.is_empty() => text.clone(),
            _ => match fallback {
                Some(f) if !f.is_empty() => f.to_string(),
                _ => key.to_string(),
            },
        }
    }

    fn locale(&self) -> String {
        self.locale.read().unwrap().clone()
    }
}

/// A translator that returns fallbacks or keys verbatim. Handy for tests of
/// code that only needs some `Translate`.
pub struct KeyEcho;

impl Translate for KeyEcho {
    fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        fallback.unwrap_or(key).to_string()
    }

    fn locale(&self) -> String {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> Translator {
        let t = Translator::new("zh-CN");
        t.add_messages("zh-CN", [("menu.dashboard", "仪表盘"), ("datatable.empty", "暂无数据")]);
        t.add_messages("en-US", [("menu.dashboard", "Dashboard"), ("datatable.empty", "No Data")]);
        t
    }

    // ── lookup ──

    #[test]
    fn translate_current_locale() {
        let t = translator();
        assert_eq!(t.translate("menu.dashboard", None), "仪表盘");
        t.set_locale("en-US");
        assert_eq!(t.translate("menu.dashboard", None), "Dashboard");
        assert_eq!(Translate::locale(&t), "en-US");
    }

    #[test]
    fn missing_key_uses_fallback_then_key() {
        let t = translator();
        assert_eq!(t.translate("menu.nope", Some("Nope")), "Nope");
        assert_eq!(t.translate("menu.nope", None), "menu.nope");
        assert_eq!(t.translate("menu.nope", Some("")), "menu.nope");
    }

    #[test]
    fn unknown_locale_falls_through() {
        let t = translator();
        t.set_locale("fr-FR");
        assert_eq!(t.translate("menu.dashboard", Some("Board")), "Board");
    }

    #[test]
    fn add_messages_merges() {
        let t = translator();
        t.add_messages("zh-CN", [("menu.dashboard", "总览"), ("menu.profile", "个人中心")]);
        assert_eq!(t.translate("menu.dashboard", None), "总览");
        assert_eq!(t.translate("datatable.empty", None), "暂无数据");
        assert_eq!(t.locales(), vec!["en-US", "zh-CN"]);
    }

    // ── broadcast ──

    #[test]
    fn set_locale_broadcasts_to_listeners() {
        let t = Arc::new(translator());
        let seen = Arc::new(RwLock::new(Vec::<String>::new()));

        let (s, tt) = (seen.clone(), t.clone());
        let id = t.on_locale_change(move |code| {
            s.write()
                .unwrap()
                .push(format!("{}:{}", code, tt.translate("datatable.empty", None)));
        });

        t.set_locale("en-US");
        t.remove_listener(id);
        t.set_locale("zh-CN");

        assert_eq!(*seen.read().unwrap(), vec!["en-US:No Data"]);
    }

    #[test]
    fn key_echo() {
        assert_eq!(KeyEcho.translate("a.b", None), "a.b");
        assert_eq!(KeyEcho.translate("a.b", Some("AB")), "AB");
    }
}
