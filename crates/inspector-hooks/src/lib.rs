//! Instrumentation hook bus (C2) and span enrichment (C3).
//!
//! [`catalogue`] defines the documented hook families/phases and the
//! dynamic payload shape; [`bus`] is the publish/subscribe registry used by
//! the agent framework to fan emissions out to observers; [`enrich`]
//! translates those emissions into attributes on the emitting code path's
//! current span.

pub mod bus;
pub mod catalogue;
pub mod enrich;

pub use bus::{HookBus, Subscriber, SubscriptionId};
pub use catalogue::{family, hook_name, phase, HookName, HookPayload};
pub use enrich::{capture_result, capture_state, enrich, RecordingSpan};
