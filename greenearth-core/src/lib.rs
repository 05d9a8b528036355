//! Core types and scheduling for the Green Earth site: scroll-triggered animation
//! timelines, page lifecycle scopes, routing and the contact form.

/// Contact form state, request and receipt types, notifications.
pub mod contact;
/// In-memory host document.
pub mod document;
/// Easing curves and their textual names.
pub mod easing;
/// Scopes that collect handles at mount and release them at unmount.
pub mod lifecycle;
/// Geometry, styles and timing shared by every module.
pub mod model;
/// Viewport observer turning scroll positions into threshold crossings.
pub mod observer;
/// Traits describing the host document and the contact backend.
pub mod ports;
/// Timeline registry owning every playhead.
pub mod registry;
/// Routing table and navigator.
pub mod routes;
/// Scroll scene wiring observer, registry and trigger policies together.
pub mod scene;
/// High-level contact service used by clients.
pub mod service;
/// Trigger grammar and the toggle state machine.
pub mod trigger;

pub use contact::*;
pub use document::*;
pub use easing::*;
pub use lifecycle::*;
pub use model::*;
pub use observer::*;
pub use ports::*;
pub use registry::*;
pub use routes::*;
pub use scene::*;
pub use service::*;
pub use trigger::*;
