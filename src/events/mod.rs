//! # Events Module
//!
//! Event-driven progress reporting for batch conversions.
//!
//! ## Design
//! A batch worker never calls back into UI code. It emits events through
//! a channel and any UI (CLI, GUI, service) subscribes to the receiving end.
//! All events of one job come from a single thread, so they arrive in
//! processing order and `Completed` is always last.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let handle = start_batch_conversion(files, template, sender)?;
//!
//! for event in receiver.iter() {
//!     match event {
//!         Event::Batch(BatchEvent::Progress(p)) => println!("{}/{}", p.processed, p.total),
//!         Event::Batch(BatchEvent::Completed { report }) => println!("{}", summary(&report)),
//!         _ => {}
//!     }
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
