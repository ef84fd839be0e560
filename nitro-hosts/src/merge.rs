//! Managed block merge.
//!
//! The block is delimited by whole-line markers:
//!
//! ```text
//! # <nitro>
//! 127.0.0.1	a.nitro b.nitro
//! # </nitro>
//! ```
//!
//! Lines outside the block are never touched. After a merge exactly one block
//! exists, holding exactly one mapping line.

use std::path::Path;

use crate::error::{io_err, HostsError};

pub const START_MARKER: &str = "# <nitro>";
pub const END_MARKER: &str = "# </nitro>";

/// Line indices of one start/end marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    start: usize,
    end: usize,
}

/// Render the merged contents of `path` without writing anything.
pub fn merge<S: AsRef<str>>(
    path: &Path,
    address: &str,
    hostnames: &[S],
) -> Result<String, HostsError> {
    let line = mapping_line(address, hostnames)?;
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    render(&content, &line).map_err(|line| HostsError::Malformed {
        path: path.to_path_buf(),
        line,
    })
}

/// `true` when the file already holds exactly the block [`merge`] would write.
///
/// Comparison is literal: hostname order and whitespace must match.
pub fn is_current<S: AsRef<str>>(
    path: &Path,
    address: &str,
    hostnames: &[S],
) -> Result<bool, HostsError> {
    let line = mapping_line(address, hostnames)?;
    let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let segments: Vec<&str> = content.split_inclusive('\n').collect();
    let blocks = find_blocks(&segments).map_err(|line| HostsError::Malformed {
        path: path.to_path_buf(),
        line,
    })?;

    Ok(match blocks.as_slice() {
        [block] if block.end == block.start + 2 => {
            strip_eol(segments[block.start + 1]) == line
        }
        _ => false,
    })
}

/// Merge against in-memory content. Errors carry the 1-based line of a
/// dangling marker.
pub fn merge_str<S: AsRef<str>>(
    content: &str,
    address: &str,
    hostnames: &[S],
) -> Result<String, HostsError> {
    let line = mapping_line(address, hostnames)?;
    render(content, &line).map_err(|line| HostsError::Malformed {
        path: "<memory>".into(),
        line,
    })
}

fn mapping_line<S: AsRef<str>>(address: &str, hostnames: &[S]) -> Result<String, HostsError> {
    if hostnames.is_empty() {
        return Err(HostsError::NoHostnames);
    }
    let joined = hostnames
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(format!("{address}\t{joined}"))
}

fn render(content: &str, line: &str) -> Result<String, usize> {
    let segments: Vec<&str> = content.split_inclusive('\n').collect();
    let blocks = find_blocks(&segments)?;

    let Some(first) = blocks.first().copied() else {
        let mut out = String::with_capacity(content.len() + line.len() + 32);
        out.push_str(content);
        if !content.is_empty() {
            if !content.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }
        out.push_str(START_MARKER);
        out.push('\n');
        out.push_str(line);
        out.push('\n');
        out.push_str(END_MARKER);
        out.push('\n');
        return Ok(out);
    };

    let mut out = String::with_capacity(content.len() + line.len());
    let mut i = 0;
    while i < segments.len() {
        match blocks.iter().find(|b| b.start == i) {
            Some(block) => {
                // Later duplicates are dropped so only one block survives.
                if *block == first {
                    let start = segments[block.start];
                    out.push_str(start);
                    out.push_str(line);
                    out.push_str(if start.ends_with("\r\n") { "\r\n" } else { "\n" });
                    out.push_str(segments[block.end]);
                }
                i = block.end + 1;
            }
            None => {
                out.push_str(segments[i]);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn find_blocks(segments: &[&str]) -> Result<Vec<Block>, usize> {
    let mut blocks = Vec::new();
    let mut open: Option<usize> = None;

    for (i, segment) in segments.iter().enumerate() {
        let trimmed = segment.trim();
        if trimmed == START_MARKER {
            if open.is_some() {
                return Err(i + 1);
            }
            open = Some(i);
        } else if trimmed == END_MARKER {
            let start = open.take().ok_or(i + 1)?;
            blocks.push(Block { start, end: i });
        }
    }

    match open {
        Some(start) => Err(start + 1),
        None => Ok(blocks),
    }
}

fn strip_eol(segment: &str) -> &str {
    segment
        .strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: [&str; 3] = ["one", "two", "three"];

    #[test]
    fn empty_content_gets_block_only() {
        let out = merge_str("", "127.0.0.1", &HOSTS).unwrap();
        assert_eq!(out, "# <nitro>\n127.0.0.1\tone two three\n# </nitro>\n");
    }

    #[test]
    fn missing_trailing_newline_is_added_before_block() {
        let out = merge_str("127.0.0.1 localhost", "127.0.0.1", &HOSTS).unwrap();
        assert_eq!(
            out,
            "127.0.0.1 localhost\n\n# <nitro>\n127.0.0.1\tone two three\n# </nitro>\n"
        );
    }

    #[test]
    fn multi_line_block_collapses_to_one_line() {
        let input = "a\n# <nitro>\n127.0.0.1\told\n127.0.0.1\tolder\n# </nitro>\nb\n";
        let out = merge_str(input, "127.0.0.1", &HOSTS).unwrap();
        assert_eq!(out, "a\n# <nitro>\n127.0.0.1\tone two three\n# </nitro>\nb\n");
    }

    #[test]
    fn duplicate_blocks_are_removed() {
        let input = "# <nitro>\nx\n# </nitro>\nmid\n# <nitro>\ny\n# </nitro>\n";
        let out = merge_str(input, "127.0.0.1", &HOSTS).unwrap();
        assert_eq!(out, "# <nitro>\n127.0.0.1\tone two three\n# </nitro>\nmid\n");
    }

    #[test]
    fn crlf_lines_outside_block_are_preserved() {
        let input = "a\r\n# <nitro>\r\nold\r\n# </nitro>\r\nb\r\n";
        let out = merge_str(input, "127.0.0.1", &HOSTS).unwrap();
        assert_eq!(out, "a\r\n# <nitro>\r\n127.0.0.1\tone two three\r\n# </nitro>\r\nb\r\n");
    }

    #[test]
    fn dangling_start_marker_is_malformed() {
        let err = merge_str("a\n# <nitro>\nx\n", "127.0.0.1", &HOSTS).unwrap_err();
        assert!(matches!(err, HostsError::Malformed { line: 2, .. }), "got: {err}");
    }

    #[test]
    fn stray_end_marker_is_malformed() {
        let err = merge_str("# </nitro>\n", "127.0.0.1", &HOSTS).unwrap_err();
        assert!(matches!(err, HostsError::Malformed { line: 1, .. }), "got: {err}");
    }

    #[test]
    fn empty_hostnames_rejected() {
        let none: [&str; 0] = [];
        let err = merge_str("", "127.0.0.1", &none).unwrap_err();
        assert!(matches!(err, HostsError::NoHostnames));
    }

    #[test]
    fn strip_eol_handles_both_endings() {
        assert_eq!(strip_eol("x\r\n"), "x");
        assert_eq!(strip_eol("x\n"), "x");
        assert_eq!(strip_eol("x"), "x");
    }
}
