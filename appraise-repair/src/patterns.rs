//! Literal substitutions that neutralize known bad character sequences
//!
//! Order matters: specific phrases come before the generic fallbacks that
//! would otherwise double-encode them.

use tracing::debug;

/// `(pattern, replacement)` pairs applied in order, each to all occurrences
pub const XML_REPAIR_PATTERNS: &[(&str, &str)] = &[
    ("& ", "&amp; "),
    ("&amp ", "&amp; "),
    ("&quot ", "&quot; "),
    ("R&D", "R&amp;D"),
    ("R & D", "R &amp; D"),
    ("A&E", "A&amp;E"),
    ("CD&V", "CD&amp;V"),
    ("CD & V", "CD &amp; V"),
    (">Grub<", "&gt;Grub&lt;"),
    ("S&P", "S&amp;P"),
    ("S & P", "S &amp; P"),
    ("&Poor ", "&amp;Poor "),
    ("&.", "&amp;."),
    ("<службе", "&lt;службе"),
    ("<security", "&lt;security"),
    ("< ", "&lt; "),
    ("B&Q", "B&amp;Q"),
    ("B&F", "B&amp;F"),
    ("Q&A", "Q&amp;A"),
    ("</p >", "&lt;/p &gt;"),
    ("<dollar-symbol>", "&lt;dollar-symbol&gt;"),
    ("Б&", "Б&amp;"),
    ("B&S", "B&amp;S"),
    ("b&", "b&amp;"),
    ("B & Q", "B &amp; Q"),
];

/// Run one full pass of the pattern table over `text`
pub fn apply_repair_patterns(text: &str) -> String {
    XML_REPAIR_PATTERNS
        .iter()
        .fold(text.to_string(), |current, (pattern, replacement)| {
            let hits = current.matches(pattern).count();
            if hits == 0 {
                return current;
            }
            debug!("{:?} --> {:?} ({} occurrences)", pattern, replacement, hits);
            current.replace(pattern, replacement)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_pattern_applies() {
        assert_eq!(apply_repair_patterns("Die R&D Abteilung"), "Die R&amp;D Abteilung");
        assert_eq!(apply_repair_patterns("S&P 500"), "S&amp;P 500");
    }

    #[test]
    fn test_generic_ampersand_runs_first() {
        // "& " is rewritten before "R & D" is looked at
        assert_eq!(apply_repair_patterns("R & D"), "R &amp; D");
    }

    #[test]
    fn test_stray_angle_brackets() {
        assert_eq!(apply_repair_patterns("a < b"), "a &lt; b");
        assert_eq!(
            apply_repair_patterns("cost <dollar-symbol> 5"),
            "cost &lt;dollar-symbol&gt; 5"
        );
        assert_eq!(apply_repair_patterns("в <службе"), "в &lt;службе");
    }

    #[test]
    fn test_clean_text_is_untouched() {
        let clean = "<seg id=\"1\"><source>Tom &amp; Jerry</source></seg>";
        assert_eq!(apply_repair_patterns(clean), clean);
    }

    #[test]
    fn test_table_has_no_empty_patterns() {
        assert_eq!(XML_REPAIR_PATTERNS.len(), 25);
        assert!(XML_REPAIR_PATTERNS.iter().all(|(p, r)| !p.is_empty() && p != r));
    }
}
