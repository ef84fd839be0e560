//! # nitro-hosts
//!
//! Idempotent editing of the managed `# <nitro>` block in a hosts file.
//!
//! [`merge`] renders the new file contents, [`is_current`] reports whether a
//! merge would be a no-op, and [`write_hosts`] applies a merge to disk.

pub mod error;
pub mod merge;
pub mod writer;

pub use error::HostsError;
pub use merge::{is_current, merge, merge_str, END_MARKER, START_MARKER};
pub use writer::{default_path, write_hosts, HostsWrite};
