//! Splitting an onboarding document into topical sections

/// Sections used when a document has no recognizable headers
const FALLBACK_SECTIONS: [(&str, usize, Option<usize>); 4] = [
    ("Welcome & Introduction", 0, Some(1000)),
    ("Core Information", 1000, Some(2000)),
    ("Policies & Procedures", 2000, Some(3000)),
    ("Resources & Support", 3000, None),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSection {
    pub title: String,
    pub body: String,
}

/// A header is a non-blank line that is all upper-case or starts with a digit
pub fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let upper = line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase);
    upper || trimmed.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Split on header lines. Text before the first header is the `Introduction`.
///
/// A repeated title replaces the earlier body in place. With one section or
/// fewer, the document is cut into four fixed character ranges instead.
pub fn split_sections(content: &str) -> Vec<DocumentSection> {
    let mut sections: Vec<DocumentSection> = Vec::new();
    let mut title = "Introduction".to_string();
    let mut body: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if is_header(line) {
            if !body.is_empty() {
                record(&mut sections, &title, &body);
            }
            title = line.trim().to_string();
            body.clear();
        } else {
            body.push(line);
        }
    }
    if !body.is_empty() {
        record(&mut sections, &title, &body);
    }

    if sections.len() <= 1 {
        return fallback_sections(content);
    }
    sections
}

fn record(sections: &mut Vec<DocumentSection>, title: &str, body: &[&str]) {
    let body = body.join("\n");
    match sections.iter_mut().find(|s| s.title == title) {
        Some(existing) => existing.body = body,
        None => sections.push(DocumentSection {
            title: title.to_string(),
            body,
        }),
    }
}

fn fallback_sections(content: &str) -> Vec<DocumentSection> {
    FALLBACK_SECTIONS
        .iter()
        .map(|(title, start, end)| {
            let chars = content.chars().skip(*start);
            let body: String = match end {
                Some(end) => chars.take(end - start).collect(),
                None => chars.collect(),
            };
            DocumentSection {
                title: (*title).to_string(),
                body,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_header_detection() {
        assert!(is_header("BENEFITS"));
        assert!(is_header("  CORE VALUES & MISSION  "));
        assert!(is_header("1. Getting Started"));
        assert!(is_header("  2 Benefits"));
        assert!(!is_header("Benefits overview"));
        assert!(!is_header("   "));
        assert!(!is_header("---"));
        // A leading digit is enough, whatever follows
        assert!(is_header("401(k) is great"));
    }

    #[test]
    fn test_split_sections() {
        let doc = "ACME handbook intro\n\nBENEFITS\nHealth insurance\n401(k)\n2. Policies\nBe nice\n";
        let sections = split_sections(doc);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "BENEFITS", "2. Policies"]);
        assert_eq!(sections[0].body, "ACME handbook intro\n");
        assert_eq!(sections[1].body, "Health insurance");
        assert_eq!(sections[2].body, "Be nice\n");
    }

    #[test]
    fn test_duplicate_title_keeps_position() {
        let doc = "INTRO\na\nBENEFITS\nb\nINTRO\nc";
        let sections = split_sections(doc);
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["INTRO", "BENEFITS"]);
        assert_eq!(sections[0].body, "c");
    }

    #[test]
    fn test_header_without_body_is_skipped() {
        let sections = split_sections("PART ONE\nPART TWO\nbody two\nPART THREE\nbody three");
        let titles: Vec<_> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["PART TWO", "PART THREE"]);
    }

    #[test]
    fn test_fallback_slices() {
        let doc = "x".repeat(2500);
        let sections = split_sections(&doc);
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].title, "Welcome & Introduction");
        assert_eq!(sections[0].body.len(), 1000);
        assert_eq!(sections[1].body.len(), 1000);
        assert_eq!(sections[2].body.len(), 500);
        assert!(sections[3].body.is_empty());
    }

    #[test]
    fn test_single_header_falls_back() {
        let sections = split_sections("BENEFITS\nonly one section");
        assert_eq!(sections[0].title, "Welcome & Introduction");
        assert_eq!(sections[0].body, "BENEFITS\nonly one section");
    }

    proptest! {
        #[test]
        fn split_never_panics_and_is_nonempty(doc in "(?s).{0,3000}") {
            let sections = split_sections(&doc);
            prop_assert!(sections.len() >= 2);
            let mut titles: Vec<_> = sections.iter().map(|s| s.title.clone()).collect();
            titles.dedup();
            prop_assert_eq!(titles.len(), sections.len());
        }

        #[test]
        fn fallback_slices_cover_document(doc in "[a-z ]{0,5000}") {
            let sections = split_sections(&doc);
            let joined: String = sections.iter().map(|s| s.body.as_str()).collect();
            prop_assert_eq!(joined, doc);
        }
    }
}
