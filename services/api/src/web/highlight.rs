//! services/api/src/web/highlight.rs
//!
//! Render-time keyword highlighting for the notes preview. A pure function
//! of the output text and the keyword list; the stored output is never
//! mutated and the same inputs always produce the same result.

use regex::RegexBuilder;

/// Wraps every case-insensitive occurrence of the comma-separated keywords
/// in `<mark>` markers.
///
/// All keywords are matched in a single alternation pass, so a marker
/// inserted for one keyword can never be re-matched by another. Longer
/// keywords take precedence over shorter ones regardless of their position
/// in the list. An empty or all-blank keyword list returns the input
/// unchanged.
pub fn highlight(text: &str, keywords: &str) -> String {
    let mut terms: Vec<String> = keywords
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return text.to_string();
    }

    // Longest term first, so overlapping keywords match greedily no matter
    // how the user ordered the list.
    terms.sort_by(|a, b| b.len().cmp(&a.len()));

    let regex = match RegexBuilder::new(&terms.join("|")).case_insensitive(true).build() {
        Ok(regex) => regex,
        // An absurdly long keyword list can exceed the compiled-size limit;
        // highlighting then degrades to the unmarked text.
        Err(_) => return text.to_string(),
    };

    regex.replace_all(text, "<mark>${0}</mark>").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_case_insensitive_matches() {
        let out = highlight("TODO: fix the todo list", "todo");
        assert_eq!(out, "<mark>TODO</mark>: fix the <mark>todo</mark> list");
    }

    #[test]
    fn empty_keyword_list_returns_input_unchanged() {
        assert_eq!(highlight("nothing to mark", ""), "nothing to mark");
        assert_eq!(highlight("nothing to mark", "  ,  , "), "nothing to mark");
    }

    #[test]
    fn is_deterministic_for_identical_arguments() {
        let first = highlight("Important idea, important Deadline", "Important, Deadline");
        let second = highlight("Important idea, important Deadline", "Important, Deadline");
        assert_eq!(first, second);
    }

    #[test]
    fn keyword_list_entries_are_trimmed() {
        let out = highlight("an idea appears", " Idea , ");
        assert_eq!(out, "an <mark>idea</mark> appears");
    }

    #[test]
    fn regex_metacharacters_are_matched_literally() {
        let out = highlight("cost is $5 (net)", "$5, (net)");
        assert_eq!(out, "cost is <mark>$5</mark> <mark>(net)</mark>");
    }

    #[test]
    fn inserted_markers_are_never_rematched() {
        // "mark" as a keyword must not match the tags added for "plan".
        let out = highlight("the plan is set", "plan, mark");
        assert_eq!(out, "the <mark>plan</mark> is set");
    }

    #[test]
    fn overlapping_keywords_are_order_insensitive() {
        let forward = highlight("a Deadline looms", "Dead, Deadline");
        let backward = highlight("a Deadline looms", "Deadline, Dead");
        assert_eq!(forward, backward);
        assert_eq!(forward, "a <mark>Deadline</mark> looms");
    }

    #[test]
    fn no_keywords_present_leaves_text_alone() {
        assert_eq!(highlight("plain text", "absent"), "plain text");
    }
}
