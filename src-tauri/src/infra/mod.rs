//! Usage: Infrastructure adapters (per-user paths, persisted settings).

pub(crate) mod app_paths;
pub(crate) mod settings;
