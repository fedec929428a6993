//! Reading-time estimation.

/// Words read per minute when estimating reading time.
pub const WORDS_PER_MINUTE: usize = 160;

/// Minutes needed to read `text`, rounded up and never below one.
pub fn estimate_reading_minutes(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
