//! Maps an extracted label token to a [`Label`]

use verdict_core::{Error, Label, Result};

/// Resolve a display label or canonical-form token.
///
/// Unknown tokens are an error, never `Unsure`: they mean a catalog template
/// extracted the wrong slice.
pub fn resolve(token: &str) -> Result<Label> {
    match token {
        "Response A" | "responsea" | "responseisa" => Ok(Label::A),
        "Response B" | "responseb" | "responseisb" | "secondresponse" => Ok(Label::B),
        _ if is_first_response(token) => Ok(Label::A),
        _ => Err(Error::unrecognized_label(token)),
    }
}

/// `firstresponse` plus exactly one trailing character.
///
/// Custom-offset templates cut "first response ..." to the same length as
/// "secondresponse", which leaves one character of whatever followed.
fn is_first_response(token: &str) -> bool {
    token.strip_prefix("firstresponse").is_some_and(|rest| {
        let mut chars = rest.chars();
        matches!(chars.next(), Some(c) if c != '\n') && chars.next().is_none()
    })
}
