//! Client for a locally hosted Ollama server.
//!
//! Sends one generate request and reassembles the streamed reply.

pub mod client;
pub mod request;
pub mod stream;

pub use client::OllamaClient;
pub use request::GenerateRequest;
pub use stream::read_stream;
