//! quantflow: capa de aplicación sobre el pipeline de `qflow-core`.
//!
//! - `config`: configuración desde `.env` / variables `QUANTFLOW_*`.
//! - `setup`: adquisición del modelo fuente.
//! - `serving`: servicio de inferencia (carga única, generación serializada).
//! - `chat`: sesión de chat con transcript.
//! - `backends`: selección de backends según features.

pub mod backends;
pub mod chat;
pub mod config;
pub mod errors;
pub mod serving;
pub mod setup;

pub use chat::{ChatMessage, ChatSession, Role, QUICK_QUESTIONS};
pub use config::QuantflowConfig;
pub use errors::ConfigError;
pub use serving::{GenerationParams, InferenceService, FALLBACK_RESPONSE};
pub use setup::{prepare_source, SourceStatus};
