//! Canonical type names
//!
//! The declaration macros hand over `module_path!()` and the stringified type
//! tokens; this module turns them into the fully-qualified name that seeds a
//! class id. Any other scheme works as long as it is deterministic and unique
//! across the program's classes.

/// Build the canonical name of a declared class.
///
/// `dyn` is dropped from trait object types so that `dyn Animal` declared in
/// `zoo::model` becomes `zoo::model::Animal`. A leading `crate::` is resolved
/// against the crate root of `module_path`. Whitespace around punctuation is
/// removed, so `Pair < u8 , u16 >` and `Pair<u8,u16>` name the same class.
pub fn canonical_name(module_path: &str, type_tokens: &str) -> String {
    let tokens = type_tokens.trim();
    let tokens = tokens.strip_prefix("dyn ").unwrap_or(tokens).trim_start();
    let tokens = compact(tokens);

    if let Some(rest) = tokens.strip_prefix("crate::") {
        let root = module_path.split("::").next().unwrap_or(module_path);
        return format!("{}::{}", root, rest);
    }
    if let Some(rest) = tokens.strip_prefix("::") {
        return rest.to_string();
    }
    if module_path.is_empty() {
        tokens
    } else {
        format!("{}::{}", module_path, tokens)
    }
}

fn compact(tokens: &str) -> String {
    let mut out = String::with_capacity(tokens.len());
    let mut pending_space = false;

    for ch in tokens.chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_is_word = out.chars().last().is_some_and(is_word_char);
            if prev_is_word && is_word_char(ch) {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(ch);
    }
    out
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '\''
}
