//! Unified LLM interface types and providers.
//!
//! This crate provides the shared types used across all LLM providers:
//! `Message`, `StreamChunk`, `FinishReason`, `General`, and the [`LLM`]
//! streaming trait. Concrete providers speak the Anthropic Messages API
//! and the OpenAI-compatible chat completions protocol (which also covers
//! Google's OpenAI-compatible surface and local deployments).

pub use config::{General, MAX_TOKENS};
pub use message::{Message, Role};
pub use noop::NoopProvider;
pub use provider::LLM;
pub use reqwest::{self, Client};
pub use scripted::{Script, ScriptedProvider};
pub use sse::SseBuffer;
pub use stream::{Choice, CompletionMeta, Delta, FinishReason, StreamChunk};

pub use anthropic::Anthropic;
pub use openai::OpenAi;

pub mod anthropic;
mod config;
mod message;
mod noop;
pub mod openai;
mod provider;
mod scripted;
mod sse;
mod stream;
