// src/storage/cursor.rs

/// Store key prefix for rotation cursors.
pub const CURSOR_KEY_PREFIX: &str = "rotation-cursor:";

/// Cursor value meaning "nothing issued yet".
pub const UNSET_CURSOR: i64 = -1;

/// Builds the store key holding the cursor of a connection.
pub fn cursor_key(connection_name: &str) -> String {
    format!("{CURSOR_KEY_PREFIX}{connection_name}")
}

/// Interprets a raw stored cursor for a pool of `modulus` keys.
///
/// Absent, non-numeric and out-of-range values (outside `[-1, modulus)`)
/// all collapse to [`UNSET_CURSOR`], so a corrupted cursor restarts the
/// rotation at index 0 instead of failing.
pub fn parse_cursor(raw: Option<&str>, modulus: usize) -> i64 {
    let Some(value) = raw.and_then(|s| s.trim().parse::<i64>().ok()) else {
        return UNSET_CURSOR;
    };
    match usize::try_from(value) {
        Ok(index) if index < modulus => value,
        _ => UNSET_CURSOR,
    }
}

/// Computes the slot following `cursor` in a pool of `modulus` keys.
pub fn next_index(cursor: i64, modulus: usize) -> usize {
    debug_assert!(modulus > 0);
    let next = (cursor + 1).rem_euclid(modulus as i64);
    next as usize
}
