//! Post models

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use super::frontmatter::FrontMatter;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref HYPHENS: Regex = Regex::new(r"-+").unwrap();
    static ref VALID_SLUG: Regex = Regex::new(r"^[\w-]+$").unwrap();
}

/// Keywords arrive either as "a, b, c" from the form or as a JSON list
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct CommaList;

    impl<'de> Visitor<'de> for CommaList {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a comma-separated string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(split_keywords(value))
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                let item = item.trim();
                if !item.is_empty() {
                    vec.push(item.to_string());
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(CommaList)
}

/// Split a comma-separated keyword list, dropping empty entries
pub fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derive a URL-safe slug from a title.
///
/// Lowercases, drops everything but word characters, whitespace and hyphens,
/// turns whitespace runs into single hyphens and collapses repeated hyphens.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let stripped = NON_WORD.replace_all(&lower, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    HYPHENS.replace_all(&hyphenated, "-").into_owned()
}

/// Title fallback for posts without frontmatter: "hello-world" -> "hello world"
pub fn humanize_slug(slug: &str) -> String {
    slug.replace('-', " ")
}

/// Whether `slug` is acceptable for a new post: word characters and hyphens
pub fn is_valid_slug(slug: &str) -> bool {
    VALID_SLUG.is_match(slug)
}

/// Whether `slug` names a file directly inside the posts directory.
///
/// Looser than [`is_valid_slug`]: stored files may carry dots or spaces in
/// their names, only separators and the dot entries are refused.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Storage key, the file name without `.md`
    pub slug: String,

    pub title: String,

    pub description: Option<String>,

    pub author: Option<String>,

    pub publish_date: Option<String>,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub og_image: Option<String>,

    pub canonical_url: Option<String>,

    /// Markdown body, trimmed
    pub content: String,
}

impl Post {
    /// Build a post from a stored file's text
    pub fn from_source(slug: &str, source: &str) -> Self {
        let fm = FrontMatter::parse(source);
        let body = fm.body(source);

        Self {
            slug: slug.to_string(),
            title: fm
                .get("title")
                .map(str::to_string)
                .unwrap_or_else(|| humanize_slug(slug)),
            description: fm.get("description").map(str::to_string),
            author: fm.get("author").map(str::to_string),
            publish_date: fm
                .get("publishDate")
                .or_else(|| fm.get("date"))
                .map(str::to_string),
            keywords: fm.get("keywords").map(split_keywords).unwrap_or_default(),
            og_image: fm.get("ogImage").map(str::to_string),
            canonical_url: fm.get("canonicalUrl").map(str::to_string),
            content: body.trim().to_string(),
        }
    }

    /// Header fields in the order they are written to storage
    pub fn front_matter(&self) -> FrontMatter {
        let mut fm = FrontMatter::default();
        fm.insert("title", &self.title);
        fm.insert_opt("description", self.description.as_deref());
        fm.insert_opt("author", self.author.as_deref());
        fm.insert_opt("publishDate", self.publish_date.as_deref());
        if !self.keywords.is_empty() {
            fm.insert("keywords", &self.keywords.join(", "));
        }
        fm.insert_opt("ogImage", self.og_image.as_deref());
        fm.insert_opt("canonicalUrl", self.canonical_url.as_deref());
        fm
    }

    /// Full file text: frontmatter block, blank line, body
    pub fn to_source(&self) -> String {
        format!("{}\n{}\n", self.front_matter().render(), self.content)
    }

}

/// Payload of the create-post endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPost {
    /// Derived from the title when missing or blank
    pub slug: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    #[serde(deserialize_with = "comma_list")]
    pub keywords: Vec<String>,
    pub og_image: Option<String>,
    pub canonical_url: Option<String>,
    pub content: String,
}

impl NewPost {
    /// Explicit slug if given, otherwise one derived from the title
    pub fn resolved_slug(&self) -> String {
        match self.slug.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => slugify(&self.title),
        }
    }

    /// Convert into the stored representation, blank optionals become absent
    pub fn into_post(self) -> Post {
        let slug = self.resolved_slug();
        let opt = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        Post {
            slug,
            title: self.title.trim().to_string(),
            description: opt(self.description),
            author: opt(self.author),
            publish_date: opt(self.publish_date),
            keywords: self.keywords,
            og_image: opt(self.og_image),
            canonical_url: opt(self.canonical_url),
            content: self.content.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust: Ownership & Borrowing!  "), "rust-ownership-borrowing");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
    }

    #[test]
    fn test_humanize_slug() {
        assert_eq!(humanize_slug("hello-world"), "hello world");
    }

    #[test]
    fn test_valid_slug() {
        assert!(is_valid_slug("hello-world"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("../secrets"));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("release-1.0"));
    }

    #[test]
    fn test_safe_slug() {
        assert!(is_safe_slug("release-1.0"));
        assert!(is_safe_slug("my notes"));
        assert!(is_safe_slug(".hidden"));
        assert!(!is_safe_slug(""));
        assert!(!is_safe_slug("."));
        assert!(!is_safe_slug(".."));
        assert!(!is_safe_slug("../secrets"));
        assert!(!is_safe_slug("a/b"));
        assert!(!is_safe_slug("a\\b"));
    }

    #[test]
    fn test_from_source_with_frontmatter() {
        let post = Post::from_source("hello-world", "---\ntitle: Hello\n---\nBody text");
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "Body text");
        assert_eq!(post.description, None);
    }

    #[test]
    fn test_from_source_without_frontmatter() {
        let post = Post::from_source("plain-notes", "Just some text.\nSecond line.\n");
        assert_eq!(post.title, "plain notes");
        assert_eq!(post.content, "Just some text.\nSecond line.");
    }

    #[test]
    fn test_from_source_metadata() {
        let source = r#"---
title: "Quoted Title"
author: Ada
date: 2024-05-01
keywords: rust, web , , blog
canonicalUrl: https://example.com/a:b
description:
---

Body
"#;
        let post = Post::from_source("x", source);
        assert_eq!(post.title, "Quoted Title");
        assert_eq!(post.author.as_deref(), Some("Ada"));
        assert_eq!(post.publish_date.as_deref(), Some("2024-05-01"));
        assert_eq!(post.keywords, vec!["rust", "web", "blog"]);
        assert_eq!(post.canonical_url.as_deref(), Some("https://example.com/a:b"));
        assert_eq!(post.description, None);
        assert_eq!(post.content, "Body");
    }

    #[test]
    fn test_source_roundtrip_keeps_metadata() {
        let post = Post {
            slug: "round-trip".into(),
            title: "Round Trip".into(),
            description: Some("About things".into()),
            author: None,
            publish_date: Some("2024-01-02".into()),
            keywords: vec!["one".into(), "two".into()],
            og_image: Some("https://example.com/og.png".into()),
            canonical_url: None,
            content: "First\n\nSecond".into(),
        };

        let reparsed = Post::from_source("round-trip", &post.to_source());
        assert_eq!(reparsed, post);
    }

    #[test]
    fn test_new_post_keywords_string_or_list() {
        let a: NewPost =
            serde_json::from_str(r#"{"title":"T","content":"c","keywords":"a, b"}"#).unwrap();
        let b: NewPost =
            serde_json::from_str(r#"{"title":"T","content":"c","keywords":["a"," b "]}"#).unwrap();
        assert_eq!(a.keywords, vec!["a", "b"]);
        assert_eq!(b.keywords, vec!["a", "b"]);
    }

    #[test]
    fn test_new_post_into_post() {
        let new: NewPost = serde_json::from_str(
            r#"{"title":"My First Post","description":"","author":"Ada","content":" hi \n","ogImage":""}"#,
        )
        .unwrap();
        let post = new.into_post();
        assert_eq!(post.slug, "my-first-post");
        assert_eq!(post.description, None);
        assert_eq!(post.og_image, None);
        assert_eq!(post.author.as_deref(), Some("Ada"));
        assert_eq!(post.content, "hi");
    }

    #[test]
    fn test_explicit_slug_wins() {
        let new = NewPost {
            slug: Some("custom".into()),
            title: "Other Title".into(),
            ..Default::default()
        };
        assert_eq!(new.resolved_slug(), "custom");
    }
}
