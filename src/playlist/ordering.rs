use super::SearchConfig;
use crate::models::CatalogTrack;
use log::debug;
use std::cmp::Ordering;

/// Score gap below which popularity decides the order
pub const SCORE_TIE_THRESHOLD: f64 = 0.05;

/// Stable merge sort driven only by pairwise comparisons.
///
/// The threshold comparators used for ranking are not transitive, so the
/// result must depend on nothing but the comparator and the input order.
pub fn stable_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = stable_sort_by(left, compare);
    let right = stable_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}

/// Higher match score first when the gap is significant, otherwise `tie_break`
pub fn compare_by_score_then<F>(a: &CatalogTrack, b: &CatalogTrack, tie_break: F) -> Ordering
where
    F: FnOnce(&CatalogTrack, &CatalogTrack) -> Ordering,
{
    let diff = b.match_score - a.match_score;
    if diff.abs() > SCORE_TIE_THRESHOLD {
        diff.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
    } else {
        tie_break(a, b)
    }
}

pub fn is_hit(track: &CatalogTrack, config: &SearchConfig) -> bool {
    track.is_current_hit || track.source == config.hit_source_tag
}

/// Spread hits evenly through the list, keeping the relative order of both groups.
///
/// A hit goes at every position that is a multiple of `len / hits` while hits
/// remain; leftovers of either group are appended.
pub fn redistribute_hits<T, F>(items: Vec<T>, is_hit: F) -> Vec<T>
where
    F: Fn(&T) -> bool,
{
    let total = items.len();
    let (hits, others): (Vec<T>, Vec<T>) = items.into_iter().partition(|item| is_hit(item));

    // One group is empty, so the other is the input in its original order
    if hits.is_empty() {
        return others;
    }
    if others.is_empty() {
        return hits;
    }

    let interval = total / hits.len();
    debug!(
        "Redistributing {} hits among {} tracks (every {} positions)",
        hits.len(),
        total,
        interval
    );

    let mut hits = hits.into_iter().peekable();
    let mut others = others.into_iter().peekable();
    let mut redistributed = Vec::with_capacity(total);

    for position in 0..total {
        if position % interval == 0 && hits.peek().is_some() {
            redistributed.extend(hits.next());
        } else if others.peek().is_some() {
            redistributed.extend(others.next());
        }
    }
    redistributed.extend(hits);
    redistributed.extend(others);
    redistributed
}

/// Boost hits, rank by score with popularity as tie-breaker, then spread the hits out
pub fn apply_popularity_sorting(tracks: Vec<CatalogTrack>, config: &SearchConfig) -> Vec<CatalogTrack> {
    let boosted: Vec<CatalogTrack> = tracks
        .into_iter()
        .map(|mut track| {
            if is_hit(&track, config) {
                track.popularity += config.hit_popularity_boost;
                debug!(
                    "Hit boost applied: {} by {} ({} -> {})",
                    track.title,
                    track.artist,
                    track.popularity - config.hit_popularity_boost,
                    track.popularity
                );
            }
            track
        })
        .collect();

    let sorted = stable_sort_by(boosted, &mut |a, b| {
        compare_by_score_then(a, b, |a, b| b.popularity.cmp(&a.popularity))
    });

    redistribute_hits(sorted, |track| is_hit(track, config))
}
