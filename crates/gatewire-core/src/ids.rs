//! Id synthesis for messages and tool calls the backend did not name.

use chrono::Utc;
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix of a synthesized message id.
const MESSAGE_ID_SUFFIX_LEN: usize = 9;

/// `msg_{epoch-millis}_{9 random base36 chars}`
pub fn message_id() -> String {
    format!(
        "msg_{}_{}",
        Utc::now().timestamp_millis(),
        random_base36(MESSAGE_ID_SUFFIX_LEN)
    )
}

/// `toolu_{epoch-millis}_{backend index}`
pub fn tool_call_id(backend_index: u32) -> String {
    format!("toolu_{}_{backend_index}", Utc::now().timestamp_millis())
}

fn random_base36(len: usize) -> String {
    let mut bits = Uuid::new_v4().as_u128();
    (0..len)
        .map(|_| {
            let digit = (bits % 36) as usize;
            bits /= 36;
            char::from(BASE36[digit])
        })
        .collect()
}
