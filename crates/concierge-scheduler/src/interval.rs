//! Cardinality-bounded weighted-interval scheduling.
//!
//! Classic weighted-interval scheduling extended with a session-count
//! dimension. Candidates are sorted by end time (ties by start), each
//! candidate's rightmost compatible predecessor is found by binary search,
//! and a dynamic program over (candidate, remaining-count) picks the
//! maximum-weight non-overlapping subset of size at most K. Touching
//! endpoints (`end == start`) are compatible.

use tracing::debug;

use crate::candidate::ScheduleCandidate;

/// For each candidate, the rightmost earlier candidate whose interval ends
/// at or before this one starts.
///
/// Relies on the end-time sort: every index at or before the found one is
/// also compatible, and only the rightmost matters for the optimal
/// substructure.
fn prev_compatible(sorted: &[ScheduleCandidate]) -> Vec<Option<usize>> {
    (0..sorted.len())
        .map(|index| {
            let start = sorted[index].start_abs;
            let mut left = 0isize;
            let mut right = index as isize - 1;
            let mut best = None;

            while left <= right {
                let mid = (left + right) / 2;
                if sorted[mid as usize].end_abs <= start {
                    best = Some(mid as usize);
                    left = mid + 1;
                } else {
                    right = mid - 1;
                }
            }

            best
        })
        .collect()
}

/// Select the maximum-weight set of pairwise non-overlapping candidates
/// with at most `max_sessions` members.
///
/// When several counts reach the same maximum weight, the smallest count
/// wins: fewer sessions at equal total relevance is the better agenda.
/// The selection comes back sorted by start time. Empty input yields an
/// empty itinerary.
pub fn weighted_interval_schedule(
    items: Vec<ScheduleCandidate>,
    max_sessions: usize,
) -> Vec<ScheduleCandidate> {
    if items.is_empty() {
        return Vec::new();
    }

    let k_max = max_sessions.max(1);

    let mut sorted = items;
    sorted.sort_by(|a, b| {
        a.end_abs
            .cmp(&b.end_abs)
            .then(a.start_abs.cmp(&b.start_abs))
    });

    let n = sorted.len();
    let prev = prev_compatible(&sorted);

    // dp[i][k]: best weight using the first i candidates with at most k picks
    let mut dp = vec![vec![0.0f32; k_max + 1]; n + 1];
    let mut keep = vec![vec![false; k_max + 1]; n + 1];

    for i in 1..=n {
        let candidate = &sorted[i - 1];
        let prev_row = match prev[i - 1] {
            Some(p) => p + 1,
            None => 0,
        };

        for k in 1..=k_max {
            let skip = dp[i - 1][k];
            let take = candidate.weight + dp[prev_row][k - 1];

            if take > skip {
                dp[i][k] = take;
                keep[i][k] = true;
            } else {
                dp[i][k] = skip;
            }
        }
    }

    // Smallest count attaining the maximum wins ties
    let mut best_k = 1;
    for k in 2..=k_max {
        if dp[n][k] > dp[n][best_k] {
            best_k = k;
        }
    }

    let mut picked = Vec::new();
    let mut i = n;
    let mut k = best_k;

    while i > 0 && k > 0 {
        if !keep[i][k] {
            i -= 1;
            continue;
        }

        let candidate = sorted[i - 1].clone();
        i = match prev[i - 1] {
            Some(p) => p + 1,
            None => 0,
        };
        k -= 1;
        picked.push(candidate);
    }

    picked.sort_by(|a, b| a.start_abs.cmp(&b.start_abs));

    debug!(
        candidates = n,
        selected = picked.len(),
        total_weight = dp[n][best_k],
        "Scheduled itinerary"
    );
    picked
}
