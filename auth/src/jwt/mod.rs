pub mod errors;
pub mod handler;
pub mod payload;

pub use errors::JwtError;
pub use handler::JwtHandler;
pub use payload::Payload;
