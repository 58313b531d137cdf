//! Flux: the console's state engine.
//!
//! A path-based state store with pub/sub, plus an async request router.
//! Rust owns all state and logic; the presentation layer only renders what
//! it reads and emits requests for user actions.
//!
//! # Path Addressing
//!
//! State and requests share a flat namespace with `/` as separator:
//! - Session: `auth/user`
//! - Navigation: `app/route`, `nav/sidebar`
//! - Data: `resource/hosts`, `resource/logs`
//!
//! # Pattern Matching
//!
//! Subscriptions and request handlers use MQTT-style wildcards:
//! - Exact: `auth/user`
//! - Single-level: `resource/+` matches `resource/hosts`
//! - Multi-level: `nav/#` matches everything under `nav/`
//! - All: `#`

pub mod app;
pub mod i18n;
pub mod pattern;
pub mod router;
pub mod store;
pub mod value;

pub use app::Flux;
pub use i18n::{KeyEcho, ListenerId, LocaleListener, Translate, Translator};
pub use pattern::{Pattern, PatternTable};
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
