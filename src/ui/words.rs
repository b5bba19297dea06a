use std::ops::Range;

use unicode_width::UnicodeWidthStr;

/// Split `words` into display lines no wider than `width` columns with one
/// space between words. A word wider than a whole line gets a line of its own.
pub fn wrap_words(words: &[String], width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut used = 0;

    for (i, word) in words.iter().enumerate() {
        let word_width = word.width();
        let needed = if used == 0 {
            word_width
        } else {
            used + 1 + word_width
        };

        if used > 0 && needed > width {
            lines.push(start..i);
            start = i;
            used = word_width;
        } else {
            used = needed;
        }
    }

    if start < words.len() {
        lines.push(start..words.len());
    }
    lines
}

/// First line to draw so the line holding `current` is visible, with one
/// line of already-typed words above it when the panel has room.
pub fn first_visible_line(lines: &[Range<usize>], current: usize, height: usize) -> usize {
    if height == 0 || lines.is_empty() {
        return 0;
    }

    let current_line = lines
        .iter()
        .position(|r| r.contains(&current))
        .unwrap_or(lines.len() - 1);

    let context = usize::from(height > 1);
    current_line
        .saturating_sub(context)
        .min(lines.len().saturating_sub(height))
}
