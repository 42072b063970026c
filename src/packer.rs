use std::collections::HashSet;

use crate::types::{Piece, Row};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackStats {
    pub nodes: u64,
    pub memo_hits: u64,
    pub backtracks: u64,
}

/// Packs pieces into a fixed set of equal rows, or proves it cannot be done.
#[derive(Debug, Clone, Copy)]
pub struct ExactPacker {
    rows: usize,
    row_length: u32,
}

impl ExactPacker {
    pub fn new(rows: usize, row_length: u32) -> Self {
        Self { rows, row_length }
    }

    pub fn pack(&self, pieces: &[Piece]) -> Option<Vec<Row>> {
        self.pack_with_stats(pieces).0
    }

    pub fn pack_with_stats(&self, pieces: &[Piece]) -> (Option<Vec<Row>>, PackStats) {
        let mut sorted: Vec<&Piece> = pieces.iter().collect();
        sorted.sort_by(|a, b| b.length.cmp(&a.length));

        if sorted.first().is_some_and(|p| p.length > self.row_length) {
            return (None, PackStats::default());
        }

        let mut search = Search {
            pieces: sorted,
            row_length: self.row_length,
            used: vec![0; self.rows],
            contents: vec![Vec::new(); self.rows],
            failed: HashSet::new(),
            stats: PackStats::default(),
        };

        let found = search.dfs(0);
        let stats = search.stats;
        tracing::debug!(
            pieces = pieces.len(),
            rows = self.rows,
            found,
            nodes = stats.nodes,
            memo_hits = stats.memo_hits,
            backtracks = stats.backtracks,
            "exact packing finished"
        );

        if !found {
            return (None, stats);
        }
        let rows = search
            .contents
            .into_iter()
            .map(|content| Row {
                pieces: content.into_iter().cloned().collect(),
            })
            .collect();
        (Some(rows), stats)
    }
}

/// State of one exact packing call. Row usage is mutated on the way down and
/// restored on backtrack.
struct Search<'a> {
    pieces: Vec<&'a Piece>,
    row_length: u32,
    used: Vec<u32>,
    contents: Vec<Vec<&'a Piece>>,
    /// (piece index, remaining capacities sorted descending) known to fail.
    failed: HashSet<(usize, Vec<u32>)>,
    stats: PackStats,
}

impl Search<'_> {
    fn dfs(&mut self, idx: usize) -> bool {
        if idx == self.pieces.len() {
            return true;
        }
        self.stats.nodes += 1;

        let mut remaining: Vec<u32> = self.used.iter().map(|u| self.row_length - u).collect();
        remaining.sort_unstable_by(|a, b| b.cmp(a));
        let key = (idx, remaining);
        if self.failed.contains(&key) {
            self.stats.memo_hits += 1;
            return false;
        }

        let piece = self.pieces[idx];
        let first_empty = self.used.iter().position(|&u| u == 0);

        // (leftover after placing, row), best fit first
        let mut candidates: Vec<(u32, usize)> = self
            .used
            .iter()
            .enumerate()
            .filter(|&(r, &u)| u > 0 || Some(r) == first_empty)
            .filter_map(|(r, &u)| {
                let free = self.row_length - u;
                if free >= piece.length {
                    Some((free - piece.length, r))
                } else {
                    None
                }
            })
            .collect();
        candidates.sort_unstable();

        for (_, r) in candidates {
            self.used[r] += piece.length;
            self.contents[r].push(piece);

            if self.dfs(idx + 1) {
                return true;
            }

            self.used[r] -= piece.length;
            self.contents[r].pop();
            self.stats.backtracks += 1;
        }

        self.failed.insert(key);
        false
    }
}

/// Best-fit decreasing: each piece, longest first, goes to the row it leaves
/// the least room in. Returns `None` as soon as a piece fits nowhere.
pub fn best_fit_decreasing(pieces: &[Piece], rows: usize, row_length: u32) -> Option<Vec<Row>> {
    let mut sorted: Vec<&Piece> = pieces.iter().collect();
    sorted.sort_by(|a, b| b.length.cmp(&a.length));

    let mut used = vec![0u32; rows];
    let mut result = vec![Row::default(); rows];

    for piece in sorted {
        let mut best_row = None;
        let mut best_leftover = None;

        for (r, &u) in used.iter().enumerate() {
            let free = row_length - u;
            if free >= piece.length
                && (best_leftover.is_none() || Some(free - piece.length) < best_leftover)
            {
                best_leftover = Some(free - piece.length);
                best_row = Some(r);
            }
        }

        let r = best_row?;
        used[r] += piece.length;
        result[r].pieces.push(piece.clone());
    }

    Some(result)
}
