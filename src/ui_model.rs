use std::collections::HashSet;

/// Char indices of every non-overlapping occurrence of `query` in `name`.
pub fn match_positions(name: &str, query: &str) -> HashSet<usize> {
    let mut out = HashSet::new();
    if query.is_empty() {
        return out;
    }

    let q_len = query.chars().count();
    let mut scanned_bytes = 0usize;
    let mut scanned_chars = 0usize;
    for (byte_start, _) in name.match_indices(query) {
        scanned_chars += name[scanned_bytes..byte_start].chars().count();
        out.extend(scanned_chars..scanned_chars + q_len);
        scanned_bytes = byte_start;
    }
    out
}

/// Keeps the launch target on a valid row after the list changed.
pub fn clamp_row(row: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(row.unwrap_or(0).min(len - 1))
    }
}

pub fn step_row(row: Option<usize>, delta: isize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = row.unwrap_or(0) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(set: HashSet<usize>) -> Vec<usize> {
        let mut out: Vec<usize> = set.into_iter().collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn positions_cover_the_matched_substring() {
        assert_eq!(sorted(match_positions("run_me.sh", "me")), vec![4, 5]);
    }

    #[test]
    fn every_occurrence_is_highlighted() {
        assert_eq!(
            sorted(match_positions("a.sh.sh", ".sh")),
            vec![1, 2, 3, 4, 5, 6]
        );
    }

    #[test]
    fn positions_count_chars_not_bytes() {
        let positions = sorted(match_positions("日本語テスト.sh", "テスト"));
        assert_eq!(positions, vec![3, 4, 5]);
        let name: Vec<char> = "日本語テスト.sh".chars().collect();
        let highlighted: String = positions.iter().map(|i| name[*i]).collect();
        assert_eq!(highlighted, "テスト");
    }

    #[test]
    fn empty_or_missing_query_highlights_nothing() {
        assert!(match_positions("notes.txt", "").is_empty());
        assert!(match_positions("notes.txt", "NOTES").is_empty());
    }

    #[test]
    fn rows_stay_in_bounds() {
        assert_eq!(clamp_row(Some(5), 3), Some(2));
        assert_eq!(clamp_row(None, 3), Some(0));
        assert_eq!(clamp_row(Some(1), 0), None);
        assert_eq!(step_row(Some(0), -1, 3), Some(0));
        assert_eq!(step_row(Some(1), 1, 3), Some(2));
        assert_eq!(step_row(Some(2), 1, 3), Some(2));
        assert_eq!(step_row(None, 1, 0), None);
    }
}
