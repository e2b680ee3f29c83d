#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use serde::Serialize;

/// Canonical tag name → value. Fields the file does not carry (or the
/// caller did not request) are absent, never null placeholders.
pub type TagMap = BTreeMap<String, TagValue>;

/// One decoded tag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Picture(Picture),
    /// Files can embed several pictures; they accumulate in reading order.
    Pictures(Vec<Picture>),
}

/// Embedded picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Picture {
    /// MIME type, e.g. `image/jpeg`.
    pub format: String,
    /// Picture-type label, e.g. `Cover (front)`.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub data: Vec<u8>,
}

/// Everything read out of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags {
    /// Name of the tag format found, e.g. `Vorbis` or `Opus`.
    pub format: String,
    pub tags: TagMap,
}

impl Tags {
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            tags: TagMap::new(),
        }
    }

    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), TagValue::Text(value.into()));
    }

    /// Add a picture under `key`, growing an existing entry into a list.
    pub fn insert_picture(&mut self, key: impl Into<String>, picture: Picture) {
        let key = key.into();
        match self.tags.remove(&key) {
            None => {
                self.tags.insert(key, TagValue::Picture(picture));
            }
            Some(TagValue::Picture(first)) => {
                self.tags.insert(key, TagValue::Pictures(vec![first, picture]));
            }
            Some(TagValue::Pictures(mut list)) => {
                list.push(picture);
                self.tags.insert(key, TagValue::Pictures(list));
            }
            Some(other) => {
                // A text value under a picture key cannot happen with the
                // shipped readers; last write wins.
                let _ = other;
                self.tags.insert(key, TagValue::Picture(picture));
            }
        }
    }

    /// Text value under `key`, when present.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.tags.get(key) {
            Some(TagValue::Text(value)) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picture(description: &str) -> Picture {
        Picture {
            format: "image/png".into(),
            kind: "Cover (front)".into(),
            description: description.into(),
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn second_picture_grows_a_list() {
        let mut tags = Tags::new("Vorbis");
        tags.insert_picture("picture", picture("front"));
        tags.insert_picture("picture", picture("back"));
        tags.insert_picture("picture", picture("leaflet"));

        match tags.tags.get("picture") {
            Some(TagValue::Pictures(list)) => {
                assert_eq!(list.len(), 3);
                assert_eq!(list[0].description, "front");
                assert_eq!(list[2].description, "leaflet");
            }
            other => panic!("expected picture list, got {other:?}"),
        }
    }

    #[test]
    fn serializes_to_flat_json() {
        let mut tags = Tags::new("Vorbis");
        tags.insert_text("title", "Foo");

        let json = serde_json::to_value(&tags).unwrap();
        assert_eq!(json["format"], "Vorbis");
        assert_eq!(json["tags"]["title"], "Foo");
    }
}
