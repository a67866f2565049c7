//! English inflection for the default key and join table names.
//!
//! Rules apply to the trailing word, so camel and snake cased names work:
//! `todoItems` -> `todoItem`, `order_lines` -> `order_line`.

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
];

const UNCOUNTABLE: &[&str] = &["data", "information", "media", "metadata", "news", "series"];

/// Singular form of `word`, `word` itself when already singular.
pub fn singular(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.iter().any(|v| lower.ends_with(v)) {
        return word.to_owned();
    }
    for (one, many) in IRREGULAR {
        if lower.ends_with(many) {
            return replace_tail(word, many.len(), one);
        }
        if lower.ends_with(one) {
            return word.to_owned();
        }
    }
    if lower.ends_with("ies") && word.len() > 3 {
        return replace_tail(word, 3, "y");
    }
    for suffix in ["sses", "shes", "ches", "xes", "zzes"] {
        if lower.ends_with(suffix) {
            return replace_tail(word, 2, "");
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_owned();
    }
    if lower.ends_with('s') && word.len() > 1 {
        return replace_tail(word, 1, "");
    }
    word.to_owned()
}

/// Plural form of `word`, `word` itself when already plural.
pub fn plural(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.iter().any(|v| lower.ends_with(v)) {
        return word.to_owned();
    }
    for (one, many) in IRREGULAR {
        if lower.ends_with(many) {
            return word.to_owned();
        }
        if lower.ends_with(one) {
            return replace_tail(word, one.len(), many);
        }
    }
    if singular(word) != word {
        return word.to_owned();
    }
    let consonant_y = lower.ends_with('y')
        && lower
            .chars()
            .rev()
            .nth(1)
            .is_some_and(|c| !"aeiou".contains(c));
    if consonant_y {
        return replace_tail(word, 1, "ies");
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|v| lower.ends_with(v)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}

fn replace_tail(word: &str, len: usize, with: &str) -> String {
    let mut result = word[..word.len() - len].to_owned();
    let tail_upper = word[word.len() - len..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase());
    if tail_upper {
        let mut chars = with.chars();
        if let Some(first) = chars.next() {
            result.push(first.to_ascii_uppercase());
            result.extend(chars);
        }
    } else {
        result.push_str(with);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{plural, singular};

    #[test]
    fn singulars() {
        assert_eq!(singular("users"), "user");
        assert_eq!(singular("user"), "user");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("todoItems"), "todoItem");
        assert_eq!(singular("data"), "data");
    }

    #[test]
    fn plurals() {
        assert_eq!(plural("user"), "users");
        assert_eq!(plural("users"), "users");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("day"), "days");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("person"), "people");
        assert_eq!(plural("salesPerson"), "salesPeople");
        assert_eq!(plural("projects"), "projects");
    }
}
