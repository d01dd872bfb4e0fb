//! Title sanitization for filesystem-safe names.

/// Characters that are invalid in filenames on at least one platform.
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Fallback title when sanitization leaves nothing.
pub const DEFAULT_TITLE: &str = "audio";

/// Turn an arbitrary name into a filesystem-safe title.
///
/// Illegal characters become `_`, every run of whitespace and underscores
/// collapses to a single `_`, and leading/trailing `_` or spaces are
/// trimmed. Applying it twice gives the same result as applying it once.
///
/// ```
/// use stems_core::acquire::sanitize_title;
///
/// assert_eq!(sanitize_title("My: Song / Mix"), "My_Song_Mix");
/// ```
pub fn sanitize_title(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.chars() {
        let c = if ILLEGAL_CHARS.contains(&c) { '_' } else { c };
        if c == '_' || c.is_whitespace() {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }

    out.trim_matches(|c| c == '_' || c == ' ').to_string()
}

/// Sanitize a name, falling back to [`DEFAULT_TITLE`] when nothing is left.
pub fn title_or_default(name: &str) -> String {
    let title = sanitize_title(name);
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_illegal_characters() {
        assert_eq!(sanitize_title("My: Song / Mix"), "My_Song_Mix");
        assert_eq!(sanitize_title(r#"a<b>c:d"e/f\g|h?i*j"#), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn collapses_whitespace_and_underscore_runs() {
        assert_eq!(sanitize_title("Artist  -  Track\t(Live)"), "Artist_-_Track_(Live)");
        assert_eq!(sanitize_title("a__ __b"), "a_b");
    }

    #[test]
    fn trims_edges() {
        assert_eq!(sanitize_title("  __Intro__  "), "Intro");
        assert_eq!(sanitize_title("???"), "");
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "My: Song / Mix",
            "  spaced   out  ",
            "__x__y__",
            "Beyoncé - Halo (Official Video)",
            "***",
            "",
        ];
        for s in samples {
            let once = sanitize_title(s);
            assert_eq!(sanitize_title(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn keeps_unicode_and_punctuation() {
        assert_eq!(sanitize_title("Déjà Vu, pt. 2"), "Déjà_Vu,_pt._2");
    }

    #[test]
    fn empty_title_falls_back() {
        assert_eq!(title_or_default("???"), DEFAULT_TITLE);
        assert_eq!(title_or_default("song"), "song");
    }
}
