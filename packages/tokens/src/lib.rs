pub mod error;
pub mod resolver;
pub mod schema;

pub use error::TokenError;
pub use resolver::TokenResolver;
pub use schema::{TokenEntry, TokenSchema, TokenValue};
