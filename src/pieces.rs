use crate::types::Piece;

/// Linear inches of row a crop needs for `count` plants.
///
/// Trellised crops take one slot of `spacing` per plant. Everything else is
/// laid out across a bed of `bed_width`, so as many plants as fit across the
/// bed share one `spacing`-long stretch of row.
///
/// `None` if the length overflows a `u64`.
pub fn required_length(count: u64, spacing: u32, trellised: bool, bed_width: u32) -> Option<u64> {
    let spacing = spacing as u64;
    if trellised {
        return count.checked_mul(spacing);
    }
    let columns = std::cmp::max(1, bed_width as u64 / spacing);
    count.div_ceil(columns).checked_mul(spacing)
}

/// Number of pieces `split_length` would produce.
pub fn piece_count(total_length: u64, capacity: u32) -> u64 {
    total_length.div_ceil(capacity as u64)
}

/// Splits `total_length` into full `capacity` chunks plus at most one
/// remainder. Returns `None` if that takes more than `max_pieces` pieces.
pub fn split_length(total_length: u64, capacity: u32, max_pieces: usize) -> Option<Vec<u32>> {
    if piece_count(total_length, capacity) > max_pieces as u64 {
        return None;
    }
    let full_chunks = (total_length / capacity as u64) as usize;
    let remainder = (total_length % capacity as u64) as u32;

    let mut pieces = vec![capacity; full_chunks];
    if remainder > 0 {
        pieces.push(remainder);
    }
    Some(pieces)
}

/// Labels split lengths for one crop: the bare name for a single piece,
/// `name#1`, `name#2`, ... otherwise.
pub fn label_pieces(crop: &str, lengths: &[u32]) -> Vec<Piece> {
    if let [length] = lengths {
        return vec![Piece::new(*length, crop, crop)];
    }
    lengths
        .iter()
        .enumerate()
        .map(|(i, &length)| Piece::new(length, format!("{crop}#{}", i + 1), crop))
        .collect()
}
