use serde::{Deserialize, Serialize};

use foodgram_core::{DomainError, DomainResult};

pub const MAX_TAG_NAME_LEN: usize = 32;
pub const MAX_SLUG_LEN: usize = 15;

/// Recipe tag (breakfast, dinner, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    color: String,
    slug: String,
}

impl Tag {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        slug: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let color = color.into();
        let slug = slug.into();

        if name.trim().is_empty() || name.chars().count() > MAX_TAG_NAME_LEN {
            return Err(DomainError::validation(format!(
                "tag name must be 1..={MAX_TAG_NAME_LEN} characters"
            )));
        }
        if !is_hex_color(&color) {
            return Err(DomainError::validation("color must be in HEX format (#RRGGBB)"));
        }
        if slug.is_empty()
            || slug.len() > MAX_SLUG_LEN
            || !slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(format!(
                "slug must be 1..={MAX_SLUG_LEN} characters of [-a-zA-Z0-9_]"
            )));
        }

        Ok(Self { name, color, slug })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_tag() {
        let tag = Tag::new("Breakfast", "#E26C2D", "breakfast").unwrap();
        assert_eq!(tag.slug(), "breakfast");
    }

    #[test]
    fn rejects_non_hex_color() {
        assert!(Tag::new("Lunch", "orange", "lunch").is_err());
        assert!(Tag::new("Lunch", "#12345G", "lunch").is_err());
    }

    #[test]
    fn rejects_slug_with_spaces() {
        assert!(Tag::new("Late dinner", "#000000", "late dinner").is_err());
    }
}
