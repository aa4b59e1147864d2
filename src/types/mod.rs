// Public modules
pub mod chat_completion;
pub mod message;
pub mod model;
pub mod usage;

// Re-exports
pub use chat_completion::{ChatCompletion, ChatCompletionCreateParams, Choice, ChoiceMessage};
pub use message::{Message, Role};
pub use model::{KnownModel, Model};
pub use usage::Usage;
