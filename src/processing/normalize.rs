use std::sync::LazyLock;

use regex::Regex;

/// Leading enumerator tokens such as `q.3)`, `12.` or `a)`. Matched after
/// lowercasing, anchored to the start of the string only.
static LEADING_ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:q\s*\.?\s*\d{1,3}\s*[.)]?|\d{1,3}\s*[.)]|[a-z]\s*\))\s*")
        .expect("valid enumerator regex")
});

/// Parenthesized sub-spans. Non-greedy, so nested parentheses are only
/// partially removed (known limitation).
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("valid parentheses regex"));

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid charset regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Boilerplate question openers, checked by prefix match in this order.
/// The first match wins and only one phrase is removed.
const QUESTION_OPENERS: &[&str] = &[
    "explain the working of",
    "explain the concept of",
    "write a short note on",
    "write short notes on",
    "what do you mean by",
    "what is meant by",
    "differentiate between",
    "distinguish between",
    "compare and contrast",
    "briefly explain",
    "what are",
    "what is",
    "explain",
    "describe",
    "discuss",
    "define",
];

/// Reduces a raw question to its canonical comparison form.
///
/// The canonical form is used only for similarity comparison and is never
/// shown to the user. The result may be empty when the input was pure
/// boilerplate or punctuation; callers must treat an empty canonical form
/// like any other string.
pub fn canonical_form(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let stripped = LEADING_ENUMERATOR.replace(&lowered, "");

    let mut text = stripped.trim_start();
    for opener in QUESTION_OPENERS {
        if let Some(rest) = text.strip_prefix(opener) {
            text = rest.trim_start();
            break;
        }
    }

    let text = PARENTHESIZED.replace_all(text, " ");
    let text = NON_ALPHANUMERIC.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::canonical_form;

    #[test]
    fn lowercases_and_collapses_whitespace() {
        assert_eq!(canonical_form("Normalization   IN\tDBMS"), "normalization in dbms");
    }

    #[test]
    fn strips_leading_enumerators() {
        assert_eq!(canonical_form("Q.3) ACID properties"), "acid properties");
        assert_eq!(canonical_form("12. ACID properties"), "acid properties");
        assert_eq!(canonical_form("a) ACID properties"), "acid properties");
    }

    #[test]
    fn enumerator_matches_start_only() {
        assert_eq!(canonical_form("list 3. things"), "list 3 things");
    }

    #[test]
    fn strips_one_boilerplate_opener() {
        assert_eq!(canonical_form("What is a deadlock?"), "a deadlock");
        assert_eq!(
            canonical_form("Explain the working of two phase locking"),
            "two phase locking"
        );
        assert_eq!(
            canonical_form("Differentiate between DDL and DML"),
            "ddl and dml"
        );
    }

    #[test]
    fn removes_parenthesized_spans() {
        assert_eq!(
            canonical_form("Normalization (with examples) in DBMS"),
            "normalization in dbms"
        );
    }

    #[test]
    fn drops_punctuation_and_symbols() {
        assert_eq!(canonical_form("What is DBMS??"), "dbms");
        assert_eq!(canonical_form("B+-tree index!"), "btree index");
    }

    #[test]
    fn pure_boilerplate_collapses_to_empty() {
        assert_eq!(canonical_form("Q.1) What is"), "");
        assert_eq!(canonical_form("??!"), "");
    }

    #[test]
    fn keeps_embedded_newlines_as_single_spaces() {
        assert_eq!(
            canonical_form("Define normalization.\na) 1NF\nb) 2NF"),
            "normalization a 1nf b 2nf"
        );
    }

    #[test]
    fn is_idempotent_on_question_text() {
        let samples = [
            "Q.3) Explain the working of B+ trees (with diagram).",
            "What is DBMS??",
            "12. Differentiate between DDL and DML commands.",
            "Describe the ACID properties of a transaction.",
            "",
        ];
        for sample in samples {
            let once = canonical_form(sample);
            assert_eq!(canonical_form(&once), once, "input: {sample:?}");
        }
    }
}
