pub mod config;
pub mod live;
pub mod token;

pub use config::{EnrichmentMode, PhoneticStyle, SessionConfig, ThrottleConfig};
pub use live::{LiveMessage, ParseError};
pub use token::{END_SENTINEL, Token};
