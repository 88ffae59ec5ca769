// Macrokeys Identifier Synthesis
// Deterministic callable names for lifted script fragments

use crate::config::{Edge, Layer};

/// Synthesize the callable name for one binding edge.
///
/// The name is derived purely from the
/// (program, profile, layer, key, edge) tuple, so recompiling the
/// same model always yields the same identifiers.
pub fn macro_ident(program: &str, profile: &str, layer: Layer, key_name: &str, edge: Edge) -> String {
    format!(
        "Macro_{}_{}_{}_{}_{}",
        sanitize(program),
        sanitize(profile),
        layer.token(),
        sanitize(key_name),
        edge.token()
    )
}

/// Map one identifier-hostile character to a descriptive token.
///
/// Covers every punctuation key name in the key-code table; anything
/// else unsafe falls through to `_` in [`sanitize`].
fn char_token(ch: char) -> Option<&'static str> {
    Some(match ch {
        '`' => "Backtick",
        '-' => "Hyphen",
        '=' => "Equal",
        '[' => "LBracket",
        ']' => "RBracket",
        '\\' => "Backslash",
        ';' => "Semicolon",
        '\'' => "Apostrophe",
        ',' => "Comma",
        '.' => "Period",
        '/' => "Slash",
        ' ' => "Space",
        '_' => "Underscore",
        _ => return None,
    })
}

/// Reduce an arbitrary name component to a valid identifier chunk.
///
/// `_` is reserved as the component joint: a literal underscore in a
/// component (program keys carry them from dedup suffixes) becomes
/// the `Underscore` token, and characters outside the table become a
/// `U{codepoint}` marker. The only `_` a component can contribute is
/// the leading-digit guard, which sits directly after a joint.
pub fn sanitize(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for ch in component.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if let Some(token) = char_token(ch) {
            out.push_str(token);
        } else {
            out.push_str(&format!("U{}", ch as u32));
        }
    }
    if out.is_empty() {
        return "Empty".to_string();
    }
    if out.as_bytes()[0].is_ascii_digit() {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KEY_TABLE;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_punctuation_maps_to_tokens() {
        assert_eq!(sanitize("-"), "Hyphen");
        assert_eq!(sanitize("`"), "Backtick");
        assert_eq!(sanitize("["), "LBracket");
        assert_eq!(sanitize("NumpadDiv"), "NumpadDiv");
    }

    #[test]
    fn test_digit_start_is_prefixed() {
        assert_eq!(sanitize("1"), "_1");
        assert_eq!(sanitize("7zip"), "_7zip");
    }

    #[test]
    fn test_unmapped_chars_get_codepoint_markers() {
        assert_eq!(sanitize("a b!c"), "aSpacebU33c");
        assert_eq!(sanitize(""), "Empty");
    }

    #[test]
    fn test_component_joints_are_unambiguous() {
        // An underscore inside a component must not read as a joint.
        let split_program = macro_ident("a_b", "c", Layer::Base, "A", Edge::Down);
        let split_profile = macro_ident("a", "b_c", Layer::Base, "A", Edge::Down);
        assert_ne!(split_program, split_profile);
        assert_eq!(split_program, "Macro_aUnderscoreb_c_Base_A_Down");

        // Dedup-suffixed program keys stay distinct from their base.
        assert_eq!(
            macro_ident("notepad_2", "Default", Layer::Base, "A", Edge::Down),
            "Macro_notepadUnderscore2_Default_Base_A_Down"
        );
    }

    #[test]
    fn test_idents_are_unique_across_key_table() {
        for layer in Layer::iter() {
            for edge in [Edge::Down, Edge::Up] {
                let mut seen = HashSet::new();
                for entry in KEY_TABLE {
                    let ident = macro_ident("Notepad", "Default", layer, entry.name, edge);
                    assert!(seen.insert(ident.clone()), "identifier collision: {ident}");
                }
            }
        }
    }

    #[test]
    fn test_edges_and_layers_do_not_collide() {
        let mut seen = HashSet::new();
        for layer in Layer::iter() {
            for edge in [Edge::Down, Edge::Up] {
                assert!(seen.insert(macro_ident("P", "Default", layer, "A", edge)));
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let a = macro_ident("Notepad", "Work", Layer::Ctrl, "-", Edge::Up);
        let b = macro_ident("Notepad", "Work", Layer::Ctrl, "-", Edge::Up);
        assert_eq!(a, b);
        assert_eq!(a, "Macro_Notepad_Work_Ctrl_Hyphen_Up");
    }
}
