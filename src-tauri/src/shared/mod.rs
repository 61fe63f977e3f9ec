//! Usage: Cross-cutting utilities (filesystem helpers, lock recovery).

pub(crate) mod fs;
pub(crate) mod mutex_ext;
