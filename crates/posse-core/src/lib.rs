//! Core types for the posse syndication stack.
//!
//! This crate carries everything the resilience components and the
//! distributor share:
//! - the normalized content model ([`Post`], [`PostDraft`], [`MediaRef`])
//! - platform identifiers ([`DispatchTarget`])
//! - the downstream sender capability ([`Sender`], [`Receipt`],
//!   [`SenderError`])
//! - the event-listener infrastructure used by every component

pub mod events;
mod post;
mod sender;
mod target;

pub use events::{ComponentEvent, EventListener, EventListeners, FnListener};
pub use post::{MediaRef, Post, PostDraft, PostError};
pub use sender::{Receipt, Sender, SenderError};
pub use target::{DispatchTarget, UnknownTargetError};
