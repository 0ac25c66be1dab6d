//! Induced sorting over a [`Sequence`].
//!
//! Unfilled suffix array slots hold `I::max_value()`, which never is a valid offset because the
//! input length is checked against it up front.
use bitvec::prelude::*;
use contracts::*;
use log::trace;
use std::cmp::Ordering::*;

use crate::{Char, Sequence};

#[inline]
fn empty<I: Char>() -> I {
    I::max_value()
}

#[inline]
fn is_empty<I: Char>(v: I) -> bool {
    v == empty()
}

#[inline]
fn fill_empty<I: Char>(sa: &mut [I]) {
    sa.iter_mut().for_each(|e| *e = empty());
}

#[inline]
fn clear(l: &mut [usize]) {
    l.iter_mut().for_each(|e| *e = 0);
}

/// Offset stored in `sa[i]`, or `None` if the slot is unfilled.
#[inline]
fn slot<I: Char>(sa: &[I], i: usize) -> Option<usize> {
    let v = sa[i];
    if is_empty(v) {
        None
    } else {
        Some(v.to_u())
    }
}

#[inline]
fn put<I: Char>(sa: &mut [I], pos: usize, idx: usize) {
    debug_assert!(
        is_empty(sa[pos]),
        "slot {} already holds {:?}",
        pos,
        sa[pos]
    );
    sa[pos] = I::of_u(idx);
}

/// S/L type of every position and the LMS positions among them.
pub(crate) struct Types {
    is_s: BitVec,
    is_lms: BitVec,
    lms_count: usize,
}

/// Classify every position in one right to left scan.
///
/// The last position is L-type: nothing is smaller than the virtual sentinel following it.
#[debug_ensures(ret.is_s.len() == s.len() && ret.is_lms.len() == s.len())]
#[debug_ensures(ret.lms_count <= s.len() / 2)]
pub(crate) fn classify<S: Sequence + ?Sized>(s: &S) -> Types {
    let n = s.len();

    let mut is_s = bitvec![0; n];
    let mut is_lms = bitvec![0; n];
    let mut lms_count = 0;

    if n > 1 {
        let mut next = s.symbol(n - 1);
        for i in (0..n - 1).rev() {
            let c = s.symbol(i);
            let s_type = match c.cmp(&next) {
                Less => true,
                Equal => is_s[i + 1],
                Greater => false,
            };
            is_s.set(i, s_type);

            // s[i+1] is LMS
            if !s_type && is_s[i + 1] {
                is_lms.set(i + 1, true);
                lms_count += 1;
            }

            next = c;
        }
    }

    Types {
        is_s,
        is_lms,
        lms_count,
    }
}

/// Histogram of the symbols of `s` over the alphabet `0..=max_symbol`.
fn count_symbols<S: Sequence + ?Sized>(s: &S, max_symbol: usize) -> Vec<usize> {
    let mut counts = vec![0; max_symbol + 1];
    (0..s.len()).for_each(|i| counts[s.symbol(i)] += 1);
    counts
}

/// First and last slot of every symbol's bucket.
///
/// Never mutated by the sorting passes; they keep their own cursors.
pub(crate) struct Buckets {
    head: Vec<usize>,
    tail: Vec<usize>,
}

impl Buckets {
    #[debug_ensures(ret.head.len() == counts.len() && ret.tail.len() == counts.len())]
    pub(crate) fn from_counts(counts: &[usize]) -> Self {
        let mut head = Vec::with_capacity(counts.len());
        let mut tail = Vec::with_capacity(counts.len());

        counts.iter().fold(0usize, |sum, &count| {
            head.push(sum);
            let sum = sum + count;
            // empty bucket before any occupied one wraps, but is never written
            tail.push(sum.wrapping_sub(1));
            sum
        });

        Self { head, tail }
    }
}

/// Put LMS positions at the tails of their first symbol's bucket.
///
/// Also records the LMS positions in text order into `p1`.
fn put_lms_char<S: Sequence + ?Sized, I: Char>(
    s: &S,
    types: &Types,
    buckets: &Buckets,
    cursors: &mut [usize],
    sa: &mut [I],
    p1: &mut [I],
) {
    clear(cursors);

    let mut j = p1.len();
    for i in (0..s.len()).rev() {
        if types.is_lms[i] {
            let c = s.symbol(i);
            put(sa, buckets.tail[c] - cursors[c], i);
            cursors[c] += 1;

            j -= 1;
            p1[j] = I::of_u(i);
        }
    }

    debug_assert_eq!(j, 0);
}

/// Put already sorted LMS positions at the tails of their buckets, keeping their order.
fn put_lms_suffix<S: Sequence + ?Sized, I: Char>(
    s: &S,
    lms: &[I],
    buckets: &Buckets,
    cursors: &mut [usize],
    sa: &mut [I],
) {
    clear(cursors);

    for &p in lms.iter().rev() {
        let p = p.to_u();
        let c = s.symbol(p);
        put(sa, buckets.tail[c] - cursors[c], p);
        cursors[c] += 1;
    }
}

fn sort_l<S: Sequence + ?Sized, I: Char>(
    s: &S,
    types: &Types,
    buckets: &Buckets,
    cursors: &mut [usize],
    sa: &mut [I],
) {
    clear(cursors);

    let n = s.len();

    // the suffix in front of the virtual sentinel comes first
    let c = s.symbol(n - 1);
    put(sa, buckets.head[c], n - 1);
    cursors[c] += 1;

    for i in 0..n {
        match slot(sa, i) {
            // s[j-1] is L-type?
            Some(j) if j > 0 && !types.is_s[j - 1] => {
                let c = s.symbol(j - 1);
                put(sa, buckets.head[c] + cursors[c], j - 1);
                cursors[c] += 1;
            }
            _ => {}
        }
    }
}

fn sort_s<S: Sequence + ?Sized, I: Char>(
    s: &S,
    types: &Types,
    buckets: &Buckets,
    cursors: &mut [usize],
    sa: &mut [I],
) {
    clear(cursors);

    for i in (0..s.len()).rev() {
        match slot(sa, i) {
            // s[j-1] is S-type?
            Some(j) if j > 0 && types.is_s[j - 1] => {
                let c = s.symbol(j - 1);
                // may overwrite an LMS seed
                sa[buckets.tail[c] - cursors[c]] = I::of_u(j - 1);
                cursors[c] += 1;
            }
            _ => {}
        }
    }
}

/// Sort LMS substrings by induction from LMS positions bucketed by their first symbol.
///
/// Returns the LMS positions in the order they appear in `sa`.
#[debug_ensures(ret.len() == types.lms_count)]
fn sort_lms_substrings<S: Sequence + ?Sized, I: Char>(
    s: &S,
    types: &Types,
    buckets: &Buckets,
    cursors: &mut [usize],
    sa: &mut [I],
    p1: &mut [I],
) -> Vec<I> {
    fill_empty(sa);

    put_lms_char(s, types, buckets, cursors, sa, p1);
    sort_l(s, types, buckets, cursors, sa);
    sort_s(s, types, buckets, cursors, sa);

    let mut lms = Vec::with_capacity(types.lms_count);
    for i in 0..sa.len() {
        if let Some(j) = slot(sa, i) {
            if types.is_lms[j] {
                lms.push(sa[i]);
            }
        }
    }
    lms
}

/// Whether the LMS substrings starting at `p0` and `p1` are equal.
///
/// Each substring runs to the next LMS position inclusive, or to the end of `s`.
fn eq_lms_substr<S: Sequence + ?Sized>(s: &S, is_lms: &BitSlice, p0: usize, p1: usize) -> bool {
    let last = s.len() - 1;

    let (mut p0, mut p1) = (p0, p1);
    let mut first = true;
    loop {
        if s.symbol(p0) != s.symbol(p1) {
            return false;
        }

        match (p0 == last, p1 == last) {
            (true, true) => return true,
            (false, false) => {}
            _ => return false,
        }

        // the start of both substrings is LMS
        if !first {
            match (is_lms[p0], is_lms[p1]) {
                (true, true) => return true,
                (false, false) => {}
                _ => return false,
            }
        }

        first = false;
        p0 += 1;
        p1 += 1;
    }
}

/// Name LMS substrings in sorted order; equal substrings get equal names.
///
/// The name of the substring at `p` is stored in `names[p / 2]`, starting from 1. No two LMS
/// positions are adjacent, so the halved positions never collide.
///
/// Returns the largest name.
#[debug_requires(names.len() >= (s.len() + 1) / 2)]
#[debug_ensures(ret <= lms.len())]
fn name_lms_substrings<S: Sequence + ?Sized, I: Char>(
    s: &S,
    lms: &[I],
    types: &Types,
    names: &mut [I],
) -> usize {
    fill_empty(names);

    let mut name = 0;
    let mut prev = None;
    for &p in lms {
        let p = p.to_u();
        if prev.map_or(true, |q| !eq_lms_substr(s, &types.is_lms, q, p)) {
            name += 1;
        }
        names[p / 2] = I::of_u(name);
        prev = Some(p);
    }
    name
}

/// Build the reduced problem in `sa`, whose upper half holds the sparse names.
///
/// The names are packed, in text order, into the last `lms_count` slots, which become the reduced
/// string. The first `lms_count` slots are handed out for its suffix array.
#[debug_requires(lms_count <= sa.len() / 2)]
fn reduce<I: Char>(sa: &mut [I], lms_count: usize) -> (&mut [I], &[I]) {
    let n = sa.len();

    let mut j = n;
    for i in (n / 2..n).rev() {
        if !is_empty(sa[i]) {
            j -= 1;
            sa[j] = sa[i];
        }
    }
    debug_assert_eq!(j, n - lms_count);

    let (sa1, s1) = sa.split_at_mut(n - lms_count);
    (&mut sa1[..lms_count], s1)
}

/// Construct the suffix array of `s`, whose symbols are at most `max_symbol`, into `sa`.
pub(crate) fn sais<S: Sequence + ?Sized, I: Char>(s: &S, max_symbol: usize, sa: &mut [I]) {
    sais_rec(s, max_symbol, 0, sa);
}

#[debug_requires(s.len() == sa.len())]
fn sais_rec<S: Sequence + ?Sized, I: Char>(s: &S, max_symbol: usize, depth: usize, sa: &mut [I]) {
    let n = s.len();
    if n == 0 {
        return;
    }

    // every level at most halves the problem
    debug_assert!(depth <= usize::BITS as usize);

    let types = classify(s);
    let lms_count = types.lms_count;

    let buckets = Buckets::from_counts(&count_symbols(s, max_symbol));
    let mut cursors = vec![0; max_symbol + 1];

    // stage 1: sort LMS substrings
    let mut p1 = vec![I::zero(); lms_count];
    let mut lms = sort_lms_substrings(s, &types, &buckets, &mut cursors, sa, &mut p1);

    let name_count = name_lms_substrings(s, &lms, &types, &mut sa[n / 2..]);

    trace!(
        "level {}: length {}, {} LMS substrings, {} names",
        depth,
        n,
        lms_count,
        name_count
    );

    // stage 2: sort LMS suffixes, recursing unless the names are already unique
    if name_count < lms_count {
        let (sa1, s1) = reduce(sa, lms_count);
        sais_rec(s1, name_count, depth + 1, sa1);

        lms.iter_mut()
            .zip(sa1.iter())
            .for_each(|(e, r)| *e = p1[r.to_u()]);
    }

    // stage 3: induce the suffix array from the sorted LMS suffixes
    fill_empty(sa);
    put_lms_suffix(s, &lms, &buckets, &mut cursors, sa);
    sort_l(s, &types, &buckets, &mut cursors, sa);
    sort_s(s, &types, &buckets, &mut cursors, sa);

    debug_assert!(sa.iter().all(|e| !is_empty(*e)));
}
