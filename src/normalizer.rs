use unicode_normalization::UnicodeNormalization;

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Canonical form used to compare free-text ingredient names.
///
/// Lower-cases, decomposes (NFD) and drops the combining diacritics, then drops every
/// character outside `[a-z0-9]` and whitespace. The trim runs last so that
/// `normalize(normalize(x)) == normalize(x)` holds even for input like `"! tomate"`.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    folded.trim().to_string()
}

/// Splits a dictated transcript into ingredient tokens on runs of commas and whitespace.
pub fn split_transcript(transcript: &str) -> Vec<String> {
    transcript
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}
