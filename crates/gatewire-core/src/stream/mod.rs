//! Backend event stream → inbound-protocol events.
//!
//! [`LineBuffer`] reassembles lines from arbitrarily split byte chunks and
//! [`StreamReencoder`] turns each line into zero or more [`OutputEvent`]s.
//! Neither performs I/O; the transport adapter feeds them.
//!
//! [`OutputEvent`]: crate::domain::OutputEvent

mod lines;
mod reencoder;

pub use lines::LineBuffer;
pub use reencoder::{StreamReencoder, StreamState, ToolCallSlot};
