//! Fuzzy similarity between actions.
//!
//! The ratio is the Ratcliff/Obershelp "gestalt" measure: find the longest
//! common block, recurse on both sides of it, and report `2*M / T` where
//! `M` is the number of matched characters and `T` the combined length.

use crate::normalize::normalize_action;

/// Similarity of two actions in `[0, 1]`.
///
/// Both sides are normalized first; identical keys score exactly `1.0`.
pub fn action_similarity(a: &str, b: &str) -> f64 {
    let key_a = normalize_action(a);
    let key_b = normalize_action(b);
    key_similarity(&key_a, &key_b)
}

/// Similarity of two already normalized keys.
pub fn key_similarity(key_a: &str, key_b: &str) -> f64 {
    if key_a == key_b {
        return 1.0;
    }
    // The block search breaks ties by position, so the raw ratio depends on
    // argument order. A fixed order keeps the measure symmetric.
    if key_a <= key_b {
        sequence_ratio(key_a, key_b)
    } else {
        sequence_ratio(key_b, key_a)
    }
}

/// Matching-blocks ratio of two strings, compared character by character.
///
/// Two empty strings are considered identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = matching_blocks(&a, &b).iter().map(|block| block.size).sum();
    2.0 * matched as f64 / total as f64
}

/// A run of `size` equal characters at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchBlock {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Non-overlapping matching blocks, sorted by position.
pub fn matching_blocks(a: &[char], b: &[char]) -> Vec<MatchBlock> {
    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let block = longest_match(a, b, alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.a_start && blo < block.b_start {
            pending.push((alo, block.a_start, blo, block.b_start));
        }
        let a_end = block.a_start + block.size;
        let b_end = block.b_start + block.size;
        if a_end < ahi && b_end < bhi {
            pending.push((a_end, ahi, b_end, bhi));
        }
        blocks.push(block);
    }

    blocks.sort_by_key(|block| (block.a_start, block.b_start));
    blocks
}

/// Longest common block inside `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then the
/// one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> MatchBlock {
    let mut best = MatchBlock {
        a_start: alo,
        b_start: blo,
        size: 0,
    };
    // prev[j + 1] is the length of the common run ending at a[i - 1], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for i in alo..ahi {
        cur.iter_mut().for_each(|v| *v = 0);
        for j in blo..bhi {
            if a[i] != b[j] {
                continue;
            }
            let k = prev[j] + 1;
            cur[j + 1] = k;
            if k > best.size {
                best = MatchBlock {
                    a_start: i + 1 - k,
                    b_start: j + 1 - k,
                    size: k,
                };
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
