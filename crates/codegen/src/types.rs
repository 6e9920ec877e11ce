//! Type-name translation.
//!
//! Types arrive as the source compiler printed them (`[String: Int]?`,
//! `(Int, Bool) -> Void`) and leave spelled the way the target expects them.

use phf::phf_map;

static SIMPLE_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "Bool" => "Boolean",
    "Character" => "Char",
    "Void" => "Unit",
    "AnyObject" => "Any",
    "Int8" => "Byte",
    "Int16" => "Short",
    "Int32" => "Int",
    "Int64" => "Long",
    "UInt8" => "UByte",
    "UInt16" => "UShort",
    "UInt32" => "UInt",
    "UInt64" => "ULong",
    "Float32" => "Float",
    "Float64" => "Double",
    "Error" => "Exception",
    "Substring" => "String",
};

/// Split `text` at every top-level `separator`, ignoring separators nested in
/// brackets and the `>` of a `->` arrow.
pub(crate) fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut previous = '\0';
    for (index, c) in text.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' if previous != '-' => depth -= 1,
            ']' | ')' => depth -= 1,
            _ if c == separator && depth == 0 => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
        previous = c;
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset of the top-level `->` of a function type.
fn top_level_arrow(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (index, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'[' | b'(' => depth += 1,
            b']' | b')' => depth -= 1,
            b'>' if index > 0 && bytes[index - 1] == b'-' => {
                if depth == 0 {
                    return Some(index - 1);
                }
            }
            b'>' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Whether the whole of `text` is enclosed by the bracket pair starting it.
fn wrapped_in(text: &str, open: char, close: char) -> bool {
    if !text.starts_with(open) || !text.ends_with(close) {
        return false;
    }
    let mut depth = 0i32;
    for (index, c) in text.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return index + c.len_utf8() == text.len();
            }
        }
    }
    false
}

fn translate_list(items: &str) -> Vec<String> {
    split_top_level(items, ',')
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(translate_type)
        .collect()
}

/// A tuple element may carry a label (`(x: Int, y: Int)`); types never
/// contain a top-level colon otherwise.
fn strip_element_label(element: &str) -> &str {
    match split_top_level(element, ':').as_slice() {
        [_, ty] => ty.trim(),
        _ => element.trim(),
    }
}

/// Translate one source type name to its target spelling.
pub fn translate_type(source: &str) -> String {
    let mut text = source.trim();
    for prefix in ["inout ", "@escaping ", "@autoclosure ", "some ", "any "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = rest.trim_start();
        }
    }

    if let Some(arrow) = top_level_arrow(text) {
        let parameters = text[..arrow].trim().trim_end_matches("throws").trim_end();
        let result = translate_type(&text[arrow + 2..]);
        let parameters = if wrapped_in(parameters, '(', ')') {
            translate_list(&parameters[1..parameters.len() - 1])
        } else {
            vec![translate_type(parameters)]
        };
        return format!("({}) -> {}", parameters.join(", "), result);
    }

    if let Some(inner) = text.strip_suffix('?').or_else(|| text.strip_suffix('!')) {
        let inner = translate_type(inner);
        // A nullable function type needs its own parentheses.
        return if inner.contains("->") {
            format!("({})?", inner)
        } else {
            format!("{}?", inner)
        };
    }

    if wrapped_in(text, '[', ']') {
        let inner = &text[1..text.len() - 1];
        return match split_top_level(inner, ':').as_slice() {
            [key, value] => format!("MutableMap<{}, {}>", translate_type(key), translate_type(value)),
            _ => format!("MutableList<{}>", translate_type(inner)),
        };
    }

    if wrapped_in(text, '(', ')') {
        let inner = &text[1..text.len() - 1];
        let elements: Vec<String> = split_top_level(inner, ',')
            .into_iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| translate_type(strip_element_label(e)))
            .collect();
        return match elements.as_slice() {
            [] => "Unit".to_string(),
            [single] => single.clone(),
            [a, b] => format!("Pair<{}, {}>", a, b),
            [a, b, c] => format!("Triple<{}, {}, {}>", a, b, c),
            _ => "List<Any?>".to_string(),
        };
    }

    if let Some(open) = text.find('<')
        && text.ends_with('>')
    {
        let base = &text[..open];
        let arguments = translate_list(&text[open + 1..text.len() - 1]);
        return match (base, arguments.as_slice()) {
            ("Array", [element]) => format!("MutableList<{}>", element),
            ("Dictionary", [key, value]) => format!("MutableMap<{}, {}>", key, value),
            ("Set", [element]) => format!("MutableSet<{}>", element),
            ("Optional", [wrapped]) => format!("{}?", wrapped),
            _ => format!("{}<{}>", translate_type(base), arguments.join(", ")),
        };
    }

    match SIMPLE_TYPES.get(text) {
        Some(target) => target.to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(translate_type("Bool"), "Boolean");
        assert_eq!(translate_type("Character"), "Char");
        assert_eq!(translate_type("Void"), "Unit");
        assert_eq!(translate_type("AnyObject"), "Any");
        assert_eq!(translate_type("Shape"), "Shape");
    }

    #[test]
    fn test_collections_and_optionals() {
        assert_eq!(translate_type("[Int]"), "MutableList<Int>");
        assert_eq!(translate_type("[String: [Bool]]?"), "MutableMap<String, MutableList<Boolean>>?");
        assert_eq!(translate_type("Array<Character>"), "MutableList<Char>");
        assert_eq!(translate_type("Optional<Int>"), "Int?");
        assert_eq!(translate_type("Int!"), "Int?");
    }

    #[test]
    fn test_tuples() {
        assert_eq!(translate_type("()"), "Unit");
        assert_eq!(translate_type("(Int, Bool)"), "Pair<Int, Boolean>");
        assert_eq!(translate_type("(x: Int, y: Int)"), "Pair<Int, Int>");
        assert_eq!(translate_type("(Int)"), "Int");
    }

    #[test]
    fn test_function_types() {
        assert_eq!(translate_type("(Int, Bool) -> Void"), "(Int, Boolean) -> Unit");
        assert_eq!(translate_type("@escaping () -> [Int]"), "() -> MutableList<Int>");
        assert_eq!(translate_type("((Int) -> Bool)?"), "((Int) -> Boolean)?");
        assert_eq!(translate_type("(Int) throws -> Int"), "(Int) -> Int");
    }

    #[test]
    fn test_split_ignores_arrows() {
        assert_eq!(split_top_level("(Int) -> Bool, String", ','), vec!["(Int) -> Bool", " String"]);
        assert_eq!(split_top_level("Dictionary<K, V>, Int", ','), vec!["Dictionary<K, V>", " Int"]);
    }
}
