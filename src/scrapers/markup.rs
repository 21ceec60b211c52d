use scraper::{ElementRef, Html, Selector};

/// Element text with whitespace runs collapsed
pub fn text_of(element: ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of every element matching `selector`, in document order
pub fn texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(text_of).collect()
}

/// Text of all matches joined by a space, empty if nothing matches
pub fn joined_text(document: &Html, selector: &Selector) -> String {
    texts(document, selector)
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(text_of)
}

/// Digits of the first match parsed as a count; 0 when absent or non-numeric
pub fn first_count(document: &Html, selector: &Selector) -> u32 {
    first_text(document, selector)
        .map(|text| text.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

pub fn count(document: &Html, selector: &Selector) -> u32 {
    saturating_u32(document.select(selector).count())
}

/// Number of elements whose text, descendants included, contains `marker`
/// ignoring case. Ancestors of a matching element match as well.
pub fn count_containing(document: &Html, marker: &str) -> u32 {
    let marker = marker.to_lowercase();
    let matches = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| text_of(*element).to_lowercase().contains(&marker))
        .count();
    saturating_u32(matches)
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
