mod chat;
mod errors;

pub use chat::{GenerationParams, Message, Role};
pub use errors::{ProviderError, ProviderErrorCategory};
