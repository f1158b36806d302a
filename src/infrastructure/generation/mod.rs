//! HTTP-backed generation providers

pub mod http_client;
mod openrouter;

pub use http_client::{HttpClient, HttpClientTrait, HttpError};
pub use openrouter::{OpenRouterProvider, DEFAULT_OPENROUTER_BASE_URL};
