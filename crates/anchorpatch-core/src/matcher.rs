use crate::config::MatchConfig;
use crate::normalize::{normalize_all, NormalizedLine};
use crate::types::MatchCandidate;
use log::trace;

/// Slides a window of `pattern.len()` lines over `file_lines` and returns every
/// window whose fuzzy score reaches the configured threshold.
///
/// Every accepted window is returned with its exact (byte-equal) overlap so the
/// disambiguator can weigh it after scope and context. Best score first, then
/// by position.
pub fn find_candidates<S: AsRef<str>>(
    file_lines: &[String],
    pattern: &[S],
    config: &MatchConfig,
) -> Vec<MatchCandidate> {
    let m = pattern.len();
    if m == 0 || file_lines.len() < m {
        return Vec::new();
    }

    let src = normalize_all(file_lines);
    let search = normalize_all(pattern);
    let required = config.required_score(m);
    let min_hits = ((required * m as f64) - 1e-9).ceil() as usize;
    let max_misses = m - min_hits.min(m);

    let mut hits: Vec<(usize, usize, usize)> = Vec::new();
    for start in 0..=file_lines.len() - m {
        if let Some((fuzzy, exact)) =
            score_window(&src[start..start + m], &search, max_misses, |k| {
                file_lines[start + k] == pattern[k].as_ref()
            })
        {
            hits.push((start, fuzzy, exact));
        }
    }

    // Every window has the same length, so the fuzzy hit count orders scores.
    hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let candidates: Vec<MatchCandidate> = hits
        .into_iter()
        .map(|(start, fuzzy, exact)| MatchCandidate {
            start_line: start,
            end_line: start + m,
            score: fuzzy as f64 / m as f64,
            exact_overlap: exact,
        })
        .collect();

    trace!(
        "{} candidate(s) for a {}-line pattern over {} lines",
        candidates.len(),
        m,
        file_lines.len()
    );
    candidates
}

/// Counts fuzzy and exact hits, giving up once `max_misses` is exceeded.
fn score_window(
    window: &[NormalizedLine],
    search: &[NormalizedLine],
    max_misses: usize,
    exact_at: impl Fn(usize) -> bool,
) -> Option<(usize, usize)> {
    let mut fuzzy = 0;
    let mut exact = 0;
    let mut misses = 0;
    for (k, (have, want)) in window.iter().zip(search).enumerate() {
        if have == want {
            fuzzy += 1;
            if exact_at(k) {
                exact += 1;
            }
        } else {
            misses += 1;
            if misses > max_misses {
                return None;
            }
        }
    }
    Some((fuzzy, exact))
}

/// Number of positions where the two sequences are fuzzily / exactly equal.
pub fn overlap<A: AsRef<str>, B: AsRef<str>>(have: &[A], want: &[B]) -> (usize, usize) {
    let mut fuzzy = 0;
    let mut exact = 0;
    for (a, b) in have.iter().zip(want) {
        let (a, b) = (a.as_ref(), b.as_ref());
        if a == b {
            fuzzy += 1;
            exact += 1;
        } else if crate::normalize::fuzzy_eq(a, b) {
            fuzzy += 1;
        }
    }
    (fuzzy, exact)
}
