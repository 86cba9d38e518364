//! Identifier escaping.
//!
//! Labels, relationship types, property keys and parameter names all come from
//! schema data. Anything that is not a plain identifier is backtick-quoted so it
//! can never terminate the surrounding pattern or inject a clause.

use std::borrow::Cow;
use std::fmt;

/// Returns `name` unchanged if it is a plain identifier, otherwise backtick-quoted
/// with embedded backticks doubled.
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if is_plain_identifier(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("`{}`", name.replace('`', "``")))
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Display adapter that escapes on write.
#[derive(Debug, Clone, Copy)]
pub struct Ident<'a>(pub &'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_identifier(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifiers_untouched() {
        assert_eq!(escape_identifier("AWSAccount"), "AWSAccount");
        assert_eq!(escape_identifier("_sub_resource_id"), "_sub_resource_id");
        assert_eq!(escape_identifier("field2"), "field2");
    }

    #[test]
    fn test_special_characters_quoted() {
        assert_eq!(escape_identifier("my-label"), "`my-label`");
        assert_eq!(escape_identifier("2fa"), "`2fa`");
        assert_eq!(escape_identifier(""), "``");
    }

    #[test]
    fn test_backticks_doubled() {
        assert_eq!(
            escape_identifier("x`}) DETACH DELETE n //"),
            "`x``}) DETACH DELETE n //`"
        );
    }
}
