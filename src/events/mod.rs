//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The pipeline never prints. It emits events through a channel and the
//! caller (CLI, GUI, log file) decides what to do with them. Every event
//! renders as a human-readable line through `Display`.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         println!("{}", event);
//!     }
//! });
//!
//! pipeline.process_with_events(&counter, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
