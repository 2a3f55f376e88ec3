pub mod severity;
pub mod record;
pub mod sink;
pub mod pipeline;
pub mod event;
pub mod host;

pub mod debug_sink;
pub mod file_sink;
pub mod memory_sink;
pub mod noop_sink;
pub mod forward;

#[cfg(feature = "http")]
pub mod http;

pub mod backend;
pub mod config;
pub mod global;
pub mod init;

pub use global::pipeline;
pub use pipeline::LogPipeline;
pub use severity::Severity;
