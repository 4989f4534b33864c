//! Typed projections of CONTENTdm responses and download requests.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Which collection set a listing targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Published,
    Unpublished,
}

/// Segment sent when no visibility is given. The service has always received
/// this literal for the unfiltered listing.
pub(crate) const UNSPECIFIED_VISIBILITY_SEGMENT: &str = "undefined";

impl Visibility {
    /// Positional wire value.
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Published => "0",
            Self::Unpublished => "1",
        }
    }
}

/// One entry of `dmGetCollectionList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    pub alias: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub secondary_alias: String,
}

/// One metadata field of a collection, from `dmGetCollectionFieldInfo`.
///
/// The server encodes flags as `0`/`1`; they are exposed as booleans here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub nick: String,
    /// Dublin Core mapping, e.g. `title`; empty when unmapped.
    #[serde(rename = "dc", default)]
    pub dc_mapping: String,
    #[serde(rename = "type", default)]
    pub field_type: String,
    #[serde(deserialize_with = "flag", default)]
    pub admin: bool,
    #[serde(rename = "hide", deserialize_with = "flag", default)]
    pub hidden: bool,
    #[serde(deserialize_with = "flag", default)]
    pub readonly: bool,
    #[serde(rename = "req", deserialize_with = "flag", default)]
    pub required: bool,
    #[serde(rename = "search", deserialize_with = "flag", default)]
    pub searchable: bool,
    /// Find-index marker assigned by the server.
    #[serde(default)]
    pub find: String,
    #[serde(default)]
    pub size: u32,
    #[serde(rename = "vocab", deserialize_with = "flag", default)]
    pub vocabulary: bool,
    #[serde(rename = "vocdb", default)]
    pub vocabulary_db: String,
}

impl FieldDescriptor {
    #[must_use]
    pub fn is_indexed_for_find(&self) -> bool {
        !self.find.is_empty()
    }
}

/// A single downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    pub alias: String,
    pub pointer: String,
    /// Name the file is published under in the destination directory.
    pub filename: String,
}

impl AssetReference {
    pub fn new(
        alias: impl Into<String>,
        pointer: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            alias: alias.into(),
            pointer: pointer.into(),
            filename: filename.into(),
        }
    }
}

/// Accepts `0`/`1` integers, booleans, or numeric strings.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("0/1 flag or boolean")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim() {
                "" | "0" | "false" => Ok(false),
                "1" | "true" => Ok(true),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
