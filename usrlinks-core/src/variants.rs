//! Look-alike handle generation.
//!
//! Two passes of the same rule set: leet substitutions, separator
//! removal, letter doubling, adjacent swaps and single-digit affixes.

use std::collections::BTreeSet;

pub const DEFAULT_VARIANT_LIMIT: usize = 500;

fn leet(c: char) -> &'static [char] {
    match c {
        'a' | 'A' => &['4', '@'],
        'e' | 'E' => &['3'],
        'i' | 'I' => &['1'],
        'o' | 'O' => &['0'],
        's' | 'S' => &['5'],
        't' | 'T' => &['7'],
        _ => &[],
    }
}

/// Sorted, deduplicated variants of `handle`, capped at
/// [`DEFAULT_VARIANT_LIMIT`]. The handle itself is never included.
pub fn handle_variants(handle: &str) -> Vec<String> {
    handle_variants_limited(handle, DEFAULT_VARIANT_LIMIT)
}

pub fn handle_variants_limited(handle: &str, limit: usize) -> Vec<String> {
    if handle.is_empty() {
        return Vec::new();
    }

    let mut variants = BTreeSet::new();
    expand(handle, &mut variants);

    let first_generation: Vec<String> = variants.iter().cloned().collect();
    for variant in &first_generation {
        expand(variant, &mut variants);
    }

    variants.remove(handle);
    variants.into_iter().take(limit).collect()
}

fn expand(source: &str, out: &mut BTreeSet<String>) {
    let chars: Vec<char> = source.chars().collect();

    for (index, &c) in chars.iter().enumerate() {
        for &replacement in leet(c) {
            let mut changed = chars.clone();
            changed[index] = replacement;
            out.insert(changed.into_iter().collect());
        }
    }

    for separator in ['_', '.'] {
        if source.contains(separator) {
            out.insert(source.replace(separator, ""));
            out.insert(source.replace(separator, "-"));
        }
    }

    for index in 0..chars.len() {
        let mut doubled = chars.clone();
        doubled.insert(index, chars[index]);
        out.insert(doubled.into_iter().collect());
    }

    for index in 1..chars.len() {
        let mut swapped = chars.clone();
        swapped.swap(index - 1, index);
        out.insert(swapped.into_iter().collect());
    }

    for digit in 1..=9 {
        out.insert(format!("{source}{digit}"));
        out.insert(format!("{digit}{source}"));
    }
}

/// Similarity of two handles as a percentage: twice their longest common
/// subsequence over the combined length. Identical handles score 100.
pub fn similarity(left: &str, right: &str) -> u8 {
    let left: Vec<char> = left.chars().collect();
    let right: Vec<char> = right.chars().collect();
    let total = left.len() + right.len();
    if total == 0 {
        return 100;
    }

    let mut row = vec![0usize; right.len() + 1];
    for &l in &left {
        let mut diagonal = 0;
        for (j, &r) in right.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if l == r {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    let common = row[right.len()];

    ((200 * common) as f64 / total as f64).round() as u8
}
