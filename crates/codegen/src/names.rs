//! Identifier spelling: union-case casing and keyword escaping.

use phf::phf_set;
use tarn_core::ast::CaseStyle;

/// Target hard keywords that are ordinary identifiers in the source language.
static KEYWORDS: phf::Set<&'static str> = phf_set! {
    "as", "fun", "in", "interface", "is", "object", "typealias", "typeof", "val", "when",
};

/// `circle` → `Circle`, `lineTo` → `LineTo`.
pub fn capitalized_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `north` → `NORTH`, `northEast` → `NORTH_EAST`, `utf8Text` → `UTF8_TEXT`.
pub fn upper_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        previous = Some(c);
    }
    out
}

/// Spell a union-case name the way its style requires.
pub fn case_name(name: &str, style: CaseStyle) -> String {
    match style {
        CaseStyle::Payload => capitalized_camel(name),
        CaseStyle::PayloadFree => upper_snake(name),
    }
}

/// Backtick-quote identifiers that collide with target keywords.
pub fn escape_identifier(name: &str) -> String {
    if KEYWORDS.contains(name) {
        format!("`{}`", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_casing() {
        assert_eq!(case_name("circle", CaseStyle::Payload), "Circle");
        assert_eq!(case_name("north", CaseStyle::PayloadFree), "NORTH");
        assert_eq!(case_name("northEast", CaseStyle::PayloadFree), "NORTH_EAST");
        assert_eq!(upper_snake("utf8Text"), "UTF8_TEXT");
        assert_eq!(upper_snake("URL"), "URL");
    }

    #[test]
    fn test_keywords_are_quoted() {
        assert_eq!(escape_identifier("in"), "`in`");
        assert_eq!(escape_identifier("value"), "value");
    }
}
