//! Which messages a given identity may read.

use crate::models::{Message, BROADCAST};

/// A message is visible to `requester` when they sent it, it is broadcast,
/// or it is addressed to them.
pub fn visible_to(message: &Message, requester: &str) -> bool {
    message.from == requester || message.to == BROADCAST || message.to == requester
}

/// Filters `messages` down to what `requester` may see, keeping insertion
/// order. `limit > 0` keeps only the `limit` most recent visible messages,
/// still oldest first.
pub fn select_visible(messages: Vec<Message>, requester: &str, limit: usize) -> Vec<Message> {
    let mut visible: Vec<Message> = messages
        .into_iter()
        .filter(|m| visible_to(m, requester))
        .collect();

    if limit > 0 && visible.len() > limit {
        visible.drain(..visible.len() - limit);
    }

    visible
}
