//! Applying a merge to disk.
//!
//! The write goes to `<path>.nitro.tmp` and is renamed over the target. Some
//! hosts files cannot be replaced by rename (bind mounts, `/etc` on locked
//! down systems); in that case the merged content is written in place.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::error::{io_err, HostsError};
use crate::merge::{is_current, merge};

/// Outcome of [`write_hosts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostsWrite {
    /// The managed block already matched.
    Unchanged { path: PathBuf },
    /// The file was rewritten.
    Written { path: PathBuf },
    /// Dry run: the unified diff that would have been applied.
    WouldWrite { path: PathBuf, diff: String },
}

/// Platform hosts file location.
pub fn default_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Windows\System32\Drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// Merge `hostnames` into `path` and persist the result.
///
/// The caller is responsible for privilege elevation when `path` is a
/// protected system file.
pub fn write_hosts<S: AsRef<str>>(
    path: &Path,
    address: &str,
    hostnames: &[S],
    dry_run: bool,
) -> Result<HostsWrite, HostsError> {
    if is_current(path, address, hostnames)? {
        tracing::debug!(path = %path.display(), "hosts block unchanged");
        return Ok(HostsWrite::Unchanged {
            path: path.to_path_buf(),
        });
    }

    let merged = merge(path, address, hostnames)?;

    if dry_run {
        let existing = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let diff = TextDiff::from_lines(&existing, &merged)
            .unified_diff()
            .header(&format!("a/{}", path.display()), &format!("b/{}", path.display()))
            .context_radius(3)
            .to_string();
        tracing::info!(path = %path.display(), "[dry-run] would update hosts block");
        return Ok(HostsWrite::WouldWrite {
            path: path.to_path_buf(),
            diff,
        });
    }

    let tmp = PathBuf::from(format!("{}.nitro.tmp", path.display()));
    replace_contents(path, &tmp, &merged)?;

    tracing::info!(path = %path.display(), hostnames = hostnames.len(), "wrote hosts block");
    Ok(HostsWrite::Written {
        path: path.to_path_buf(),
    })
}

fn replace_contents(path: &Path, tmp: &Path, content: &str) -> Result<(), HostsError> {
    let renamed = std::fs::write(tmp, content).and_then(|()| {
        copy_permissions(path, tmp);
        std::fs::rename(tmp, path)
    });

    match renamed {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = std::fs::remove_file(tmp);
            tracing::debug!(error = %err, path = %path.display(), "rename failed, writing in place");
            std::fs::write(path, content).map_err(|e| io_err(path, e))
        }
    }
}

fn copy_permissions(from: &Path, to: &Path) {
    if let Ok(meta) = std::fs::metadata(from) {
        let _ = std::fs::set_permissions(to, meta.permissions());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_then_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost\n").unwrap();

        let first = write_hosts(&path, "127.0.0.1", &["a.nitro"], false).unwrap();
        assert!(matches!(first, HostsWrite::Written { .. }));

        let second = write_hosts(&path, "127.0.0.1", &["a.nitro"], false).unwrap();
        assert!(matches!(second, HostsWrite::Unchanged { .. }));
    }

    #[test]
    fn dry_run_reports_diff_and_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "127.0.0.1 localhost\n").unwrap();

        let result = write_hosts(&path, "127.0.0.1", &["a.nitro"], true).unwrap();
        let HostsWrite::WouldWrite { diff, .. } = result else {
            panic!("expected WouldWrite, got {result:?}");
        };
        assert!(diff.contains("+# <nitro>"));
        assert!(diff.contains("+127.0.0.1\ta.nitro"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost\n");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "").unwrap();
        write_hosts(&path, "127.0.0.1", &["a.nitro"], false).unwrap();
        assert!(!dir.path().join("hosts.nitro.tmp").exists());
    }

    #[test]
    fn in_place_fallback_when_rename_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts");
        fs::write(&path, "x\n").unwrap();
        // A directory at the tmp location makes the tmp write fail.
        let tmp = dir.path().join("blocked");
        fs::create_dir_all(&tmp).unwrap();

        replace_contents(&path, &tmp, "y\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "y\n");
        assert!(tmp.is_dir(), "existing directory must not be removed");
    }

    #[test]
    fn default_path_is_platform_hosts_file() {
        assert!(default_path().ends_with("hosts"));
    }
}
