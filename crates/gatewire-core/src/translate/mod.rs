//! Pure translation between the inbound message protocol and the backend
//! chat-completion protocol. No I/O, no retained state.

mod request;
mod response;

pub use request::to_target_request;
pub use response::to_source_response;
