//! ASCII case folding for tag names and attribute keys.

use std::borrow::Cow;

/// Return `input` with ASCII capitals lowercased. Other bytes are untouched.
/// Borrows when there is nothing to fold.
pub fn to_lower_ascii(input: &str) -> Cow<'_, str> {
    if input.bytes().any(|byte| byte.is_ascii_uppercase()) {
        Cow::Owned(input.to_ascii_lowercase())
    } else {
        Cow::Borrowed(input)
    }
}
