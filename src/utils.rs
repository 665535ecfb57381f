//! Text helpers shared by the record builder and the corpus tables.

use crate::constants::separators::{MAJOR_SEP, MINOR_SEP};

/// Split text into ASCII alphanumeric runs; everything else is a boundary.
pub fn words(text: &str) -> Vec<&str> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Number of alphanumeric runs in `text`.
pub fn word_count(text: &str) -> usize {
    words(text).len()
}

/// Join values that share one column key.
pub fn join_minor<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join_with(values, MINOR_SEP)
}

/// Join values taken from different column keys.
pub fn join_major<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    join_with(values, MAJOR_SEP)
}

fn join_with<I, S>(values: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (idx, value) in values.into_iter().enumerate() {
        if idx > 0 {
            joined.push_str(sep);
        }
        joined.push_str(value.as_ref());
    }
    joined
}

/// Empty strings become missing values.
pub fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_non_alphanumeric_runs() {
        assert_eq!(
            words("What's your e-mail? (Optional)"),
            vec!["What", "s", "your", "e", "mail", "Optional"]
        );
        assert_eq!(word_count("  --  "), 0);
        assert_eq!(word_count("Période 2015"), 3);
    }

    #[test]
    fn joins_use_published_separators() {
        assert_eq!(join_minor(["a", "b"]), "a | b");
        assert_eq!(join_major(vec!["x".to_string()]), "x");
        assert_eq!(join_major(Vec::<String>::new()), "");
        assert_eq!(join_major(["s0", "s1", "q"]), "s0 ||| s1 ||| q");
    }

    #[test]
    fn empty_text_is_missing() {
        assert_eq!(non_empty(String::new()), None);
        assert_eq!(non_empty("x".into()).as_deref(), Some("x"));
    }
}
