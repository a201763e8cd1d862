//! Conversational model client
//!
//! The agents only need one capability from the model: take a list of
//! role-tagged messages and return the reply text. [`ChatModel`] is that seam;
//! [`AnthropicChat`] is the network implementation.

pub mod anthropic;
pub mod message;

use std::rc::Rc;

pub use anthropic::AnthropicChat;
pub use message::{Message, Role};

use crate::error::AgentResult;

/// A model that answers a conversation with a single reply
pub trait ChatModel {
    /// Send `messages` and return the reply text
    ///
    /// Generation stops early at any of the `stop` sequences; the sequence
    /// itself is not part of the returned text.
    fn invoke(&self, messages: &[Message], stop: &[String]) -> AgentResult<String>;
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn invoke(&self, messages: &[Message], stop: &[String]) -> AgentResult<String> {
        (**self).invoke(messages, stop)
    }
}

impl<M: ChatModel + ?Sized> ChatModel for Rc<M> {
    fn invoke(&self, messages: &[Message], stop: &[String]) -> AgentResult<String> {
        (**self).invoke(messages, stop)
    }
}
