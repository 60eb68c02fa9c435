//! Conversions between display class names (`int[][]`, `java.lang.String[]`) and
//! the bracket-encoded names JVM dumps store (`[[I`, `[Ljava.lang.String;`).

use std::borrow::Cow;

use hprof_core::PrimitiveType;

use crate::error::{HeapGraphError, Result};

/// Display name to bracket-encoded storage name. Non-array names, and names whose
/// suffix is not made only of `[]` pairs, are returned as is.
pub fn to_storage_class_name(name: &str) -> Cow<'_, str> {
    let Some(bracket) = name.find('[') else {
        return Cow::Borrowed(name);
    };
    let (component, suffix) = name.split_at(bracket);
    let well_formed = suffix.len() % 2 == 0
        && suffix.as_bytes().chunks(2).all(|pair| pair == b"[]")
        && !component.is_empty();
    if !well_formed {
        return Cow::Borrowed(name);
    }
    let dimensions = suffix.len() / 2;
    let prefix = "[".repeat(dimensions);
    Cow::Owned(match PrimitiveType::from_java_name(component) {
        Some(primitive) => format!("{prefix}{}", primitive.descriptor_char()),
        None => format!("{prefix}L{component};"),
    })
}

/// Bracket-encoded storage name to display name. Names that do not start with
/// `[` are returned as is; an unknown type tag means the dump is corrupt.
pub fn to_display_class_name(stored: &str) -> Result<Cow<'_, str>> {
    if !stored.starts_with('[') {
        return Ok(Cow::Borrowed(stored));
    }
    let dimensions = stored.len() - stored.trim_start_matches('[').len();
    let rest = &stored[dimensions..];
    let brackets = "[]".repeat(dimensions);

    let tag = rest.chars().next();
    let component = match tag {
        Some('L') => rest[1..].strip_suffix(';').unwrap_or(&rest[1..]),
        Some(c) => match PrimitiveType::from_descriptor_char(c) {
            Some(primitive) if rest.len() == 1 => primitive.java_name(),
            _ => return Err(unexpected_tag(stored, tag)),
        },
        None => return Err(unexpected_tag(stored, tag)),
    };
    Ok(Cow::Owned(format!("{component}{brackets}")))
}

fn unexpected_tag(stored: &str, tag: Option<char>) -> HeapGraphError {
    HeapGraphError::UnexpectedArrayTypeTag {
        class_name: stored.to_string(),
        tag,
    }
}
