//! Typed progress events
//!
//! The pipeline reports progress, and signals that it is waiting on a human,
//! by emitting [`PipelineEvent`]s on a tokio broadcast channel. Consumers
//! subscribe; nothing in the core depends on who is listening.
//!
//! ```rust,ignore
//! let bus = ideanator::events::create_event_bus();
//! let mut rx = bus.subscribe();
//! let emitter = bus.emitter_for("run-1");
//! emitter.status("Scoring vagueness (inverted prompt)...");
//! while let Ok(event) = rx.recv().await {
//!     println!("{}", event.event_type());
//! }
//! ```

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventEmitter, create_event_bus};
pub use types::PipelineEvent;
