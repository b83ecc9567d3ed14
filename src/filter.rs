//! Substring filter over the rule hierarchy

use crate::hierarchy::{CategoryEntry, Hierarchy, LanguageEntry};
use std::ops::Range;

/// True for empty or whitespace-only queries
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Substring test against an already lowercased needle
fn matches(text: &str, needle: &str) -> bool {
    text.to_lowercase().contains(needle)
}

/// Filter a hierarchy by a search string.
///
/// A language whose display name matches keeps all of its categories; a
/// category whose name matches keeps all of its rules; otherwise only rules
/// whose description matches survive. Empty categories and languages are
/// dropped. A blank query returns the hierarchy unchanged.
pub fn filter(hierarchy: &Hierarchy, query: &str) -> Hierarchy {
    if is_blank(query) {
        return hierarchy.clone();
    }

    let needle = query.to_lowercase();
    let languages = hierarchy
        .languages
        .iter()
        .filter_map(|entry| filter_language(entry, &needle))
        .collect();

    Hierarchy { languages }
}

fn filter_language(entry: &LanguageEntry, needle: &str) -> Option<LanguageEntry> {
    if matches(&entry.language.display_name, needle) {
        return (!entry.categories.is_empty()).then(|| entry.clone());
    }

    let categories: Vec<CategoryEntry> = entry
        .categories
        .iter()
        .filter_map(|category| filter_category(category, needle))
        .collect();

    if categories.is_empty() {
        return None;
    }

    Some(LanguageEntry {
        language: entry.language.clone(),
        categories,
    })
}

fn filter_category(entry: &CategoryEntry, needle: &str) -> Option<CategoryEntry> {
    let rules = if matches(&entry.category.name, needle) {
        entry.rules.clone()
    } else {
        entry
            .rules
            .iter()
            .filter(|rule| matches(&rule.description, needle))
            .cloned()
            .collect()
    };

    if rules.is_empty() {
        return None;
    }

    Some(CategoryEntry {
        category: entry.category.clone(),
        rules,
    })
}

/// Byte ranges of every non-overlapping case-insensitive occurrence of
/// `query` in `text`, for emphasising matched fragments when rendering
pub fn highlight_ranges(text: &str, query: &str) -> Vec<Range<usize>> {
    if is_blank(query) {
        return Vec::new();
    }

    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    let mut ranges = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        match match_len(&text[pos..], &needle) {
            Some(len) => {
                ranges.push(pos..pos + len);
                pos += len;
            }
            None => {
                pos += text[pos..].chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    ranges
}

/// Byte length of the prefix of `haystack` that matches `needle`
fn match_len(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (idx, c) in haystack.char_indices() {
        for lower in c.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(idx + c.len_utf8());
        }
    }
    None
}
