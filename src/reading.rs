//! Reading-time estimate.

/// Default reading speed in words per minute.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Minutes needed to read `text`, rounded up, as `"<n> min read"`.
///
/// Words are whitespace-separated tokens. Empty text still reads as one
/// minute so listings never show "0 min read".
///
/// ```
/// use pressroom::reading::reading_time;
///
/// let text = "word ".repeat(400);
/// assert_eq!(reading_time(&text, 200), "2 min read");
/// ```
pub fn reading_time(text: &str, words_per_minute: u32) -> String {
    format!("{} min read", reading_minutes(text, words_per_minute))
}

pub fn reading_minutes(text: &str, words_per_minute: u32) -> u32 {
    let words = text.split_whitespace().count() as u32;
    words.div_ceil(words_per_minute.max(1)).max(1)
}
