use crate::config::MatchConfig;
use crate::error::{PatchError, Result};
use crate::matcher::overlap;
use crate::normalize::{indent_width, normalize};
use crate::types::MatchCandidate;
use log::debug;

/// What the disambiguator may look at besides the candidates themselves.
///
/// `before` and `after` are the hunk's anchor lines that were not part of the
/// searched pattern, nearest line last / first respectively.
pub struct Surroundings<'a> {
    pub file_lines: &'a [String],
    pub before: &'a [&'a str],
    pub after: &'a [&'a str],
    pub scope: &'a [String],
    pub previous_end: Option<usize>,
    pub config: &'a MatchConfig,
}

/// Reduces the candidates to exactly one. Candidates outside every scope line
/// are dropped first; then best score, best surrounding context, most
/// byte-exact lines, and finally nearest to the previously applied hunk.
pub fn resolve(candidates: Vec<MatchCandidate>, around: &Surroundings) -> Result<MatchCandidate> {
    let mut remaining = candidates;
    if !around.scope.is_empty() {
        let before = remaining.len();
        remaining.retain(|c| scope_hits(c, around) > 0);
        if remaining.len() < before {
            debug!(
                "scope {:?} ruled out {} of {} candidate(s)",
                around.scope,
                before - remaining.len(),
                before
            );
        }
    }
    if remaining.is_empty() {
        return Err(PatchError::NoMatch {
            hunk: 0,
            preview: String::new(),
        });
    }

    let best_score = remaining
        .iter()
        .map(|c| c.score)
        .fold(f64::MIN, f64::max);
    remaining.retain(|c| c.score >= best_score);

    if remaining.len() > 1 {
        let fits: Vec<(usize, usize)> = remaining.iter().map(|c| context_fit(c, around)).collect();
        let best_fit = fits.iter().copied().max().unwrap_or_default();
        debug!(
            "{} tied candidate(s), context fits {:?}, keeping {:?}",
            remaining.len(),
            fits,
            best_fit
        );
        remaining = remaining
            .into_iter()
            .zip(fits)
            .filter(|(_, fit)| *fit == best_fit)
            .map(|(c, _)| c)
            .collect();
    }

    if remaining.len() > 1 {
        let most_exact = remaining
            .iter()
            .map(|c| c.exact_overlap)
            .max()
            .unwrap_or_default();
        remaining.retain(|c| c.exact_overlap == most_exact);
    }

    if remaining.len() > 1 {
        if let Some(anchor) = around.previous_end {
            let distance = |c: &MatchCandidate| c.start_line.abs_diff(anchor);
            let nearest = remaining.iter().map(distance).min().unwrap_or_default();
            remaining.retain(|c| distance(c) == nearest);
            debug!(
                "proximity to line {} left {} candidate(s)",
                anchor + 1,
                remaining.len()
            );
        }
    }

    match remaining.as_slice() {
        [only] => Ok(*only),
        _ => Err(PatchError::AmbiguousMatch {
            hunk: 0,
            candidates: remaining.iter().map(|c| c.start_line + 1).collect(),
        }),
    }
}

/// Fuzzy and exact agreement between the file around `candidate` and the
/// hunk's outer context, plus scope lines found in the enclosing structure.
fn context_fit(candidate: &MatchCandidate, around: &Surroundings) -> (usize, usize) {
    let window = around.config.context_window;
    let lines = around.file_lines;

    let take_above = window.min(around.before.len()).min(candidate.start_line);
    let above: Vec<&str> = (1..=take_above)
        .map(|k| lines[candidate.start_line - k].as_str())
        .collect();
    let wanted_above: Vec<&str> = around.before.iter().rev().take(take_above).copied().collect();
    let (fuzzy_above, exact_above) = overlap(&above, &wanted_above);

    let take_below = window
        .min(around.after.len())
        .min(lines.len() - candidate.end_line);
    let below = &lines[candidate.end_line..candidate.end_line + take_below];
    let (fuzzy_below, exact_below) = overlap(below, &around.after[..take_below]);

    (
        fuzzy_above + fuzzy_below + scope_hits(candidate, around),
        exact_above + exact_below,
    )
}

/// How many scope lines appear in the candidate's enclosing structure.
fn scope_hits(candidate: &MatchCandidate, around: &Surroundings) -> usize {
    if around.scope.is_empty() {
        return 0;
    }
    let lines = around.file_lines;
    let chain = enclosing_structure(lines, candidate.start_line, around.config.tab_width);
    around
        .scope
        .iter()
        .filter(|s| {
            let wanted = normalize(s);
            chain.iter().any(|&i| normalize(&lines[i]) == wanted)
        })
        .count()
}

/// Indices of the lines that structurally enclose `start`: its first non-blank
/// line, then each line above whose indentation is strictly smaller than all
/// indentation seen so far, up to the outermost level.
pub fn enclosing_structure(lines: &[String], start: usize, tab_width: usize) -> Vec<usize> {
    let is_blank = |i: usize| lines[i].trim().is_empty();
    let Some(first) = (start..lines.len()).find(|&i| !is_blank(i)) else {
        return Vec::new();
    };

    let mut chain = vec![first];
    let mut current = indent_width(&lines[first], tab_width);
    let mut i = first;
    while current > 0 && i > 0 {
        i -= 1;
        if is_blank(i) {
            continue;
        }
        let indent = indent_width(&lines[i], tab_width);
        if indent < current {
            chain.push(i);
            current = indent;
        }
    }
    chain
}
