//! # Manifest Reader
//!
//! Steam describes every installed game with an `appmanifest_<appid>.acf` file in the
//! library root. The format is Valve's text KeyValues:
//!
//! ```text
//! "AppState"
//! {
//!     "appid"         "220"
//!     "name"          "Half-Life 2"
//!     "installdir"    "Half-Life 2"
//!     "SizeOnDisk"    "6442450944"
//!     "InstalledDepots"
//!     {
//!         "221"
//!         {
//!             "manifest"  "1234"
//!             "size"      "6442450944"
//!         }
//!     }
//! }
//! ```
//!
//! Nesting carries no meaning for the fields this tool reads, so the parser is a flat,
//! line-oriented tokenizer: every line made of exactly two quoted strings becomes a
//! `key -> value` pair, whatever its indentation. Section headers (`"AppState"`), braces
//! and `//` comments are ignored. The first occurrence of a key wins, which keeps the
//! top-level fields ahead of same-named fields inside nested sections.

use crate::error::{Result, StorageError};

pub const MANIFEST_EXTENSION: &str = ".acf";

pub const KEY_APP_ID: &str = "appid";
pub const KEY_NAME: &str = "name";
pub const KEY_INSTALL_DIR: &str = "installdir";
pub const KEY_SIZE_ON_DISK: &str = "SizeOnDisk";

/// Parsed key/value view of a single manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    file_name: String,
    fields: Vec<(String, String)>,
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Quoted(String),
    OpenBrace,
    CloseBrace,
    /// An unquoted word; its text is never used.
    Bare,
}

impl Manifest {
    pub fn parse(file_name: impl Into<String>, text: &str) -> Self {
        let fields = text
            .lines()
            .filter_map(|line| match tokenize_line(line).as_slice() {
                [Token::Quoted(key), Token::Quoted(value)] => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect();

        Self {
            file_name: file_name.into(),
            fields,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the value of the first line whose key is exactly `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| StorageError::MissingField {
            manifest: self.file_name.clone(),
            key: key.to_string(),
        })
    }

    pub fn require_u64(&self, key: &str) -> Result<u64> {
        let raw = self.require(key)?;
        raw.trim()
            .parse::<u64>()
            .map_err(|_| StorageError::InvalidField {
                manifest: self.file_name.clone(),
                key: key.to_string(),
                value: raw.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn is_manifest_file(name: &str) -> bool {
    name.ends_with(MANIFEST_EXTENSION)
}

fn tokenize_line(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '{' => tokens.push(Token::OpenBrace),
            '}' => tokens.push(Token::CloseBrace),
            '/' if chars.peek() == Some(&'/') => break,
            '"' => {
                let mut value = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(other) => value.push(other),
                            None => value.push('\\'),
                        },
                        other => value.push(other),
                    }
                }
                if !closed {
                    // An unterminated quote makes the whole line unusable.
                    return Vec::new();
                }
                tokens.push(Token::Quoted(value));
            }
            _ => {
                while chars
                    .next_if(|&next| !next.is_whitespace() && !matches!(next, '"' | '{' | '}'))
                    .is_some()
                {}
                tokens.push(Token::Bare);
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_LIFE: &str = "\"AppState\"\n{\n\t\"appid\"\t\t\"220\"\n\t\"Universe\"\t\t\"1\"\n\t\"name\"\t\t\"Half-Life 2\"\n\t\"installdir\"\t\t\"Half-Life 2\"\n\t\"SizeOnDisk\"\t\t\"6442450944\"\n\t\"InstalledDepots\"\n\t{\n\t\t\"221\"\n\t\t{\n\t\t\t\"manifest\"\t\t\"4047004309608881181\"\n\t\t\t\"size\"\t\t\"6442450944\"\n\t\t}\n\t}\n\t\"UserConfig\"\n\t{\n\t\t\"name\"\t\t\"Ignored Nested Name\"\n\t\t\"language\"\t\t\"english\"\n\t}\n}\n";

    #[test]
    fn reads_top_level_fields() {
        let manifest = Manifest::parse("appmanifest_220.acf", HALF_LIFE);
        assert_eq!(manifest.get(KEY_APP_ID), Some("220"));
        assert_eq!(manifest.get(KEY_NAME), Some("Half-Life 2"));
        assert_eq!(manifest.get(KEY_INSTALL_DIR), Some("Half-Life 2"));
        assert_eq!(manifest.get(KEY_SIZE_ON_DISK), Some("6442450944"));
    }

    #[test]
    fn nested_fields_are_found_regardless_of_depth() {
        let manifest = Manifest::parse("appmanifest_220.acf", HALF_LIFE);
        assert_eq!(manifest.get("manifest"), Some("4047004309608881181"));
        assert_eq!(manifest.get("language"), Some("english"));
    }

    #[test]
    fn first_occurrence_wins() {
        let manifest = Manifest::parse("appmanifest_220.acf", HALF_LIFE);
        assert_eq!(manifest.get(KEY_NAME), Some("Half-Life 2"));
    }

    #[test]
    fn absent_key_returns_none() {
        let manifest = Manifest::parse("appmanifest_220.acf", HALF_LIFE);
        assert_eq!(manifest.get("LastOwner"), None);
        assert_eq!(manifest.get("AppState"), None);
        assert_eq!(manifest.get("sizeondisk"), None);
    }

    #[test]
    fn indentation_style_is_irrelevant() {
        let text = "\"appid\" \"1\"\n        \"name\"    \"Spaces\"\n\t\t\t\t\t\t\"installdir\"\t\"deep\"";
        let manifest = Manifest::parse("m.acf", text);
        assert_eq!(manifest.get("appid"), Some("1"));
        assert_eq!(manifest.get("name"), Some("Spaces"));
        assert_eq!(manifest.get("installdir"), Some("deep"));
        assert_eq!(manifest.len(), 3);
    }

    #[test]
    fn values_may_contain_spaces_and_escapes() {
        let text = "\t\"name\"\t\t\"Tom Clancy's \\\"Rainbow\\\" Six\"\n\t\"path\"\t\"C:\\\\Games\"";
        let manifest = Manifest::parse("m.acf", text);
        assert_eq!(manifest.get("name"), Some("Tom Clancy's \"Rainbow\" Six"));
        assert_eq!(manifest.get("path"), Some("C:\\Games"));
    }

    #[test]
    fn empty_value_is_present() {
        let manifest = Manifest::parse("m.acf", "\t\"BetaKey\"\t\t\"\"");
        assert_eq!(manifest.get("BetaKey"), Some(""));
    }

    #[test]
    fn ignores_lines_that_are_not_pairs() {
        let text = "\"AppState\"\n{\n\"a\" \"b\" \"c\"\n\"key\" value\n\"broken \"x\"\n// \"comment\" \"pair\"\n}";
        let manifest = Manifest::parse("m.acf", text);
        assert!(manifest.is_empty());
    }

    #[test]
    fn unquoted_words_end_at_quotes_and_braces() {
        assert_eq!(
            tokenize_line("\"key\" value{x}\"after\""),
            vec![
                Token::Quoted("key".into()),
                Token::Bare,
                Token::OpenBrace,
                Token::Bare,
                Token::CloseBrace,
                Token::Quoted("after".into()),
            ]
        );
    }

    #[test]
    fn trailing_comment_does_not_break_pair() {
        let manifest = Manifest::parse("m.acf", "\"appid\"  \"7\"  // the id");
        assert_eq!(manifest.get("appid"), Some("7"));
    }

    #[test]
    fn require_u64_parses_sizes() {
        let manifest = Manifest::parse("appmanifest_220.acf", HALF_LIFE);
        assert_eq!(manifest.require_u64(KEY_SIZE_ON_DISK).unwrap(), 6_442_450_944);
    }

    #[test]
    fn require_reports_missing_field() {
        let manifest = Manifest::parse("appmanifest_1.acf", "\"appid\" \"1\"");
        let err = manifest.require(KEY_INSTALL_DIR).unwrap_err();
        assert!(matches!(
            err,
            StorageError::MissingField { ref manifest, ref key }
                if manifest == "appmanifest_1.acf" && key == "installdir"
        ));
    }

    #[test]
    fn require_u64_rejects_non_numeric() {
        let manifest = Manifest::parse("m.acf", "\"SizeOnDisk\" \"12GB\"");
        let err = manifest.require_u64(KEY_SIZE_ON_DISK).unwrap_err();
        assert!(matches!(err, StorageError::InvalidField { ref value, .. } if value == "12GB"));
    }

    #[test]
    fn manifest_extension_check() {
        assert!(is_manifest_file("appmanifest_220.acf"));
        assert!(!is_manifest_file("appmanifest_220.acf.bak"));
        assert!(!is_manifest_file("libraryfolders.vdf"));
    }
}
