//! Game title extraction from disc image filenames
//!
//! Turns names like `Super Game (USA) [v1.1].iso` into a search-friendly
//! title (`Super Game`) for the metadata lookup.

use regex::Regex;
use std::sync::LazyLock;

// Tag patterns for filename cleanup
static PAREN_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\([^)]+\)").unwrap()
});

static BRACKET_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]+\]").unwrap()
});

static NON_ALNUM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9 ]").unwrap()
});

static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").unwrap()
});

/// Build a normalized game title from a file name or full path
///
/// Region/version tags in parentheses or brackets are dropped, every
/// character other than ASCII letters, digits and spaces becomes a space,
/// whitespace is collapsed and the result is title-cased.
///
/// The result may be empty when the name holds nothing but tags and
/// punctuation.
pub fn normalize_title(file_name: &str) -> String {
    let stem = strip_extension(base_name(file_name));

    let name = PAREN_TAG_PATTERN.replace_all(stem, "");
    let name = BRACKET_TAG_PATTERN.replace_all(&name, "");
    let name = NON_ALNUM_PATTERN.replace_all(&name, " ");
    let name = WHITESPACE_PATTERN.replace_all(&name, " ");

    title_case(name.trim())
}

/// Final path component, accepting both `/` and `\` separators
fn base_name(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Drop the last extension unless the name is only dots before it (`.iso`)
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if name[..pos].chars().any(|c| c != '.') => &name[..pos],
        _ => name,
    }
}

/// Upper-case letters that follow a non-letter, lower-case the rest
fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            result.push(c);
            prev_is_letter = false;
        }
    }

    result
}
