use rand::{RngCore, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::LazyLock;

pub type Slug = String;

pub const MAX_SLUG_LEN: usize = 128;
pub const TEMP_SUFFIX_BYTES: usize = 8;

// `new` would shadow /posts/admin/new, `admin` would shadow /posts/admin
const RESERVED_SLUGS: &[&str] = &["new", "admin"];

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern should compile"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: Slug,
    pub title: String,
    pub markdown: String,

    #[serde(default)]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The fields of a stored post that `PostStore::update` may change.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    pub title: String,
    pub markdown: String,
}

impl Post {
    pub fn new(slug: Slug, title: String, markdown: String) -> Post {
        Post {
            slug,
            title,
            markdown,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Slugs double as file names, so only a conservative ASCII set is allowed.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LEN && SLUG_PATTERN.is_match(slug) && !is_reserved_slug(slug)
}

pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

pub fn get_random_hex_string<const LEN: usize>() -> String {
    let mut bytes = [0u8; LEN];
    rand_chacha::ChaCha20Rng::from_entropy().fill_bytes(&mut bytes);

    bytes.iter().fold(String::new(), |mut output, b| {
        let _ = write!(output, "{b:02x}");
        output
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_slugs() {
        assert!(is_valid_slug("my-first-post"));
        assert!(is_valid_slug("Post_2"));
    }

    #[test]
    fn rejects_slugs_unsafe_as_file_names() {
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../etc"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(&"a".repeat(MAX_SLUG_LEN + 1)));
    }

    #[test]
    fn rejects_reserved_slugs() {
        assert!(!is_valid_slug("new"));
        assert!(!is_valid_slug("admin"));
        assert!(is_reserved_slug("admin"));
        assert!(is_valid_slug("admin-notes"));
    }

    #[test]
    fn accepts_slug_at_length_limit() {
        assert!(is_valid_slug(&"a".repeat(MAX_SLUG_LEN)));
    }

    #[test]
    fn missing_timestamp_defaults_to_epoch() {
        let post: Post =
            serde_json::from_str(r##"{"slug":"a","title":"A","markdown":"# A"}"##).unwrap();
        assert_eq!(post.updated_at, chrono::DateTime::<chrono::Utc>::default());
    }

    #[test]
    fn random_hex_has_two_chars_per_byte() {
        let hex = get_random_hex_string::<TEMP_SUFFIX_BYTES>();
        assert_eq!(hex.len(), TEMP_SUFFIX_BYTES * 2);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
