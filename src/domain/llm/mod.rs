//! Chat message model shared by callers and the remote cache client

mod message;

pub use message::{
    CacheControl, CacheControlType, ContentPart, ImageUrl, Message, MessageContent, MessageRole,
};
