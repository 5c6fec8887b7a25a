//! Reading time estimation.

/// Words per minute assumed for reading time.
const WORDS_PER_MINUTE: usize = 200;

/// Estimate reading time in whole minutes for a markdown body.
///
/// Word count divided by 200 wpm, rounded up. Any non-empty body reads in
/// at least one minute; only empty input yields 0.
#[must_use]
pub fn reading_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    if words == 0 {
        return 0;
    }
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE)).unwrap_or(u32::MAX)
}
