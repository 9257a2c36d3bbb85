use std::io::BufRead;

use crate::error::Result;

/// Reads a text source as bounded groups of trimmed lines.
///
/// Yields groups of up to `capacity` lines so that peak memory stays
/// proportional to the group size, independent of the total input length.
/// Lines are read as raw bytes and decoded lossily, so undecodable byte
/// sequences never abort a run. The final group may hold fewer lines than
/// `capacity`; a source that ends exactly on a group boundary yields no
/// trailing empty group.
///
/// The iterator is finite and non-restartable. An IO error is yielded once
/// and the iterator fuses afterwards.
pub struct LineReader<R: BufRead> {
    source: R,
    capacity: usize,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Create a reader yielding groups of up to `capacity` lines.
    ///
    /// `capacity` must be at least 1; this is enforced by
    /// [`PipelineConfig::validate`](crate::PipelineConfig::validate) before
    /// a run, and clamped here so a raw construction cannot loop forever.
    pub fn new(source: R, capacity: usize) -> Self {
        Self {
            source,
            capacity: capacity.max(1),
            done: false,
        }
    }

    fn read_line(&mut self, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
        buf.clear();
        let n = self.source.read_until(b'\n', buf)?;
        if n == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(buf);
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut group = Vec::new();
        let mut raw = Vec::new();
        while group.len() < self.capacity {
            match self.read_line(&mut raw) {
                Ok(Some(line)) => group.push(line),
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }

        if group.is_empty() {
            None
        } else {
            Some(Ok(group))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect_groups(input: &str, capacity: usize) -> Vec<Vec<String>> {
        LineReader::new(Cursor::new(input.to_string()), capacity)
            .map(|g| g.unwrap())
            .collect()
    }

    #[test]
    fn test_groups_bounded_by_capacity() {
        let groups = collect_groups("a\nb\nc\nd\ne\n", 2);
        assert_eq!(groups, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[test]
    fn test_exact_boundary_emits_no_empty_group() {
        let groups = collect_groups("a\nb\nc\nd\n", 2);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.len() == 2));
    }

    #[test]
    fn test_empty_source_yields_nothing() {
        let groups = collect_groups("", 4);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_lines_are_trimmed() {
        let groups = collect_groups("  hello \n\tworld\t\n", 10);
        assert_eq!(groups, vec![vec!["hello", "world"]]);
    }

    #[test]
    fn test_empty_and_whitespace_lines_are_kept() {
        let groups = collect_groups("a\n\n   \nb\n", 10);
        assert_eq!(groups, vec![vec!["a", "", "", "b"]]);
    }

    #[test]
    fn test_missing_final_newline() {
        let groups = collect_groups("a\nb", 10);
        assert_eq!(groups, vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let bytes: &[u8] = b"ok\n\xff\xfe bad \xff\nrest\n";
        let groups: Vec<Vec<String>> = LineReader::new(Cursor::new(bytes.to_vec()), 10)
            .map(|g| g.unwrap())
            .collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[0][0], "ok");
        assert_eq!(groups[0][2], "rest");
        assert!(groups[0][1].contains('\u{FFFD}'));
    }

    #[test]
    fn test_capacity_one() {
        let groups = collect_groups("x\ny\n", 1);
        assert_eq!(groups, vec![vec!["x"], vec!["y"]]);
    }
}
