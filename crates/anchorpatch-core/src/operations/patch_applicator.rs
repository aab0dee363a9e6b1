use crate::config::MatchConfig;
use crate::disambiguator::{resolve, Surroundings};
use crate::error::{PatchError, Result};
use crate::file_state::FileState;
use crate::matcher::find_candidates;
use crate::types::{Hunk, HunkLine, MatchCandidate};
use log::{debug, warn};
use std::ops::Range;

/// Cumulative line delta of the hunks applied to one file so far.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTracker {
    delta: isize,
}

impl OffsetTracker {
    pub fn record(&mut self, hunk: &Hunk) {
        self.delta += hunk.new_lines().len() as isize - hunk.old_lines().len() as isize;
    }

    pub fn delta(&self) -> isize {
        self.delta
    }

    /// Whether the recorded delta explains the observed change in length.
    pub fn agrees_with(&self, original_len: usize, current_len: usize) -> bool {
        current_len as isize - original_len as isize == self.delta
    }
}

/// Applies every hunk to `content` in declared order. Any failing hunk fails
/// the whole file and nothing of it is returned.
pub fn apply_hunks(content: &str, hunks: &[Hunk], config: &MatchConfig) -> Result<String> {
    let mut state = FileState::parse(content);
    let original_len = state.len();
    let mut tracker = OffsetTracker::default();
    let mut previous_end: Option<usize> = None;

    for (i, hunk) in hunks.iter().enumerate() {
        let span = locate_hunk(state.lines(), hunk, previous_end, config)
            .map_err(|e| e.for_hunk(i))?;
        debug!(
            "hunk #{} resolved to lines {}..{}",
            i + 1,
            span.start + 1,
            span.end + 1
        );

        let written = apply_hunk(&mut state, span.clone(), hunk);
        tracker.record(hunk);
        previous_end = Some(span.start + written);

        let consistent = tracker.agrees_with(original_len, state.len());
        if !consistent {
            warn!(
                "line delta drifted after hunk #{}: recorded {}, observed {}",
                i + 1,
                tracker.delta(),
                state.len() as isize - original_len as isize
            );
        }
        debug_assert!(consistent, "offset tracker disagrees with file length");
    }

    Ok(state.render())
}

/// Replaces `span` with the hunk's changed region and returns the number of
/// lines written. Context lines inside the region keep the file's own text.
pub fn apply_hunk(state: &mut FileState, span: Range<usize>, hunk: &Hunk) -> usize {
    let mut replacement = Vec::with_capacity(hunk.changed().len());
    let mut cursor = span.start;
    for line in hunk.changed() {
        match line {
            HunkLine::Context(_) => {
                replacement.push(state.lines()[cursor].clone());
                cursor += 1;
            }
            HunkLine::Remove(_) => cursor += 1,
            HunkLine::Add(s) => replacement.push(s.clone()),
        }
    }
    debug_assert_eq!(cursor, span.end);

    let written = replacement.len();
    state.splice(span, replacement);
    written
}

/// Finds the span of the current file that the hunk replaces.
pub fn locate_hunk(
    file_lines: &[String],
    hunk: &Hunk,
    previous_end: Option<usize>,
    config: &MatchConfig,
) -> Result<Range<usize>> {
    let old = hunk.old_lines();
    let leading = hunk.leading_context();
    let trailing = hunk.trailing_context();
    let no_context: &[&str] = &[];

    let search = if !old.is_empty() {
        Search {
            pattern: old,
            before: &leading,
            after: &trailing,
            scope: &hunk.scope,
            insert_offset: None,
        }
    } else if !leading.is_empty() || !trailing.is_empty() {
        let insert_offset = leading.len();
        Search {
            pattern: leading.iter().chain(&trailing).copied().collect(),
            before: no_context,
            after: no_context,
            scope: &hunk.scope,
            insert_offset: Some(insert_offset),
        }
    } else if let Some((last, outer)) = hunk.scope.split_last() {
        Search {
            pattern: vec![last.as_str()],
            before: no_context,
            after: no_context,
            scope: outer,
            insert_offset: Some(1),
        }
    } else {
        let end = file_lines.len();
        return Ok(end..end);
    };

    let mut candidates = find_candidates(file_lines, &search.pattern, config);
    if hunk.at_eof {
        candidates.retain(|c| c.end_line == file_lines.len());
    }

    let around = Surroundings {
        file_lines,
        before: search.before,
        after: search.after,
        scope: search.scope,
        previous_end,
        config,
    };
    let chosen: MatchCandidate = resolve(candidates, &around).map_err(|e| match e {
        PatchError::NoMatch { hunk, .. } => PatchError::NoMatch {
            hunk,
            preview: preview(&search.pattern),
        },
        other => other,
    })?;

    Ok(match search.insert_offset {
        Some(offset) => {
            let at = chosen.start_line + offset;
            at..at
        }
        None => chosen.start_line..chosen.end_line,
    })
}

struct Search<'a> {
    pattern: Vec<&'a str>,
    before: &'a [&'a str],
    after: &'a [&'a str],
    scope: &'a [String],
    /// Set for pure insertions: the empty span sits this many lines into the window.
    insert_offset: Option<usize>,
}

fn preview(pattern: &[&str]) -> String {
    let joined = pattern.join("\\n");
    if joined.chars().count() > 160 {
        let cut: String = joined.chars().take(160).collect();
        format!("{cut}...")
    } else {
        joined
    }
}
