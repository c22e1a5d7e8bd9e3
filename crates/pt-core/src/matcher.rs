//! Interval matching of joins against leaves.
//!
//! # Algorithm Summary
//!
//! Inputs are one user's join and leave instants, each sorted ascending.
//!
//! 1. Equal counts where every `starts[i] <= ends[i]`: pair positionally.
//!    The i-th join is assumed to close with the i-th leave. This is a
//!    heuristic, not a causal guarantee: pathological interleavings can
//!    produce overlapping sessions.
//! 2. Otherwise walk both sequences with two cursors. A server restart can
//!    leave a join with no leave, so joins usually outnumber leaves:
//!    - pair the current join with the current leave;
//!    - stop once either the last join or the last leave has been paired;
//!    - re-joins that happen before the paired leave collapse into that
//!      session, and the first join after it pairs with the next leave.
//!
//!    A leave earlier than the current join closes nothing that was seen
//!    (its join is in a log that was not scanned) and is skipped.
//! 3. Every candidate is clipped to the report range; disjoint candidates
//!    are dropped.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::range::ReportRange;
use crate::session::Session;

/// Matches one user's sorted join and leave instants into sessions.
///
/// Sessions come out in nondecreasing start order. No join or no leave
/// yields no sessions.
pub fn match_sessions(
    starts: &[DateTime<Tz>],
    ends: &[DateTime<Tz>],
    range: &ReportRange,
) -> Vec<Session> {
    if starts.is_empty() || ends.is_empty() {
        return Vec::new();
    }

    if starts.len() == ends.len() && starts.iter().zip(ends).all(|(start, end)| start <= end) {
        return starts
            .iter()
            .zip(ends)
            .filter_map(|(&start, &end)| range.clip(start, end))
            .collect();
    }

    walk(starts, ends, range)
}

fn walk(starts: &[DateTime<Tz>], ends: &[DateTime<Tz>], range: &ReportRange) -> Vec<Session> {
    let last_start = starts.len() - 1;
    let last_end = ends.len() - 1;
    let mut sessions = Vec::new();
    let (mut s, mut e) = (0, 0);

    while s <= last_start {
        while e <= last_end && ends[e] < starts[s] {
            tracing::trace!(end = %ends[e], "skipping leave without a preceding join");
            e += 1;
        }
        if e > last_end {
            break;
        }

        sessions.extend(range.clip(starts[s], ends[e]));

        if s == last_start || e == last_end {
            break;
        }

        while s < last_start && starts[s + 1] < ends[e] {
            s += 1;
        }
        s += 1;
        e += 1;
    }

    sessions
}
