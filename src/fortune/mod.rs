//! Prompt composition for the fortune proxy and decoding of its streamed reply.

pub mod error;
pub mod prompt;
pub mod reading;
pub mod stream;

pub use error::FortuneError;
pub use prompt::{build_prompt, reading_year_pillar, FortuneRequest};
pub use reading::{parse_fortune, Compatibility, FiveElements, Fortune};
pub use stream::SseDecoder;
