//! # Events Module
//!
//! Event-driven architecture for GUI-ready progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, GUI, web) to subscribe and display progress. There is no shared
//! mutable state between the core and a presentation layer.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Move(MoveEvent::Completed { result }) => println!("{}", result.message),
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the organize pass with the sender
//! pipeline::run(&source, &exclusions, &options, &sender, &cancel);
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
