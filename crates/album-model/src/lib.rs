//! Album data model shared by the viewer and its tooling.
//!
//! An album arrives as an [`AlbumDescriptor`] (usually deserialized from YAML
//! or JSON), is validated into an immutable [`Album`], and is then addressed
//! through [`Album::resolve`], which turns any requested index into one that
//! is safe to display.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use thiserror::Error;

pub use entry::{EntryKind, ImageCollection, ImageEntry};
pub use resolve::resolve_index;

/// Field holding the file name of structured entries unless the album says otherwise.
pub const DEFAULT_IMAGE_NAME_FIELD: &str = "name";

/// Reasons an album descriptor is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlbumError {
    #[error("album name is missing")]
    MissingName,

    #[error("album must contain at least one image")]
    NoImages,

    #[error("album images are all empty placeholders")]
    NoDefinedImages,

    #[error("album location must be a string")]
    LocationNotString,

    #[error("image {index} does not match the representation of the first image")]
    MixedEntries { index: usize },

    #[error("image {index} has no string field '{field}'")]
    MissingNameField { index: usize, field: String },
}

mod entry {
    use super::*;

    /// Representation shared by every defined entry of an album.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum EntryKind {
        Name,
        Record,
    }

    /// One image of an album: a bare file name or a record of properties.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    #[serde(untagged)]
    pub enum ImageEntry {
        Name(String),
        Record(BTreeMap<String, YamlValue>),
    }

    impl ImageEntry {
        pub fn record<K, V, I>(fields: I) -> Self
        where
            K: Into<String>,
            V: Into<YamlValue>,
            I: IntoIterator<Item = (K, V)>,
        {
            Self::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            )
        }

        pub fn kind(&self) -> EntryKind {
            match self {
                Self::Name(_) => EntryKind::Name,
                Self::Record(_) => EntryKind::Record,
            }
        }

        /// File name of this entry; `field` is only consulted for records.
        pub fn file_name<'a>(&'a self, field: &str) -> Option<&'a str> {
            match self {
                Self::Name(name) => Some(name.as_str()),
                Self::Record(fields) => fields.get(field).and_then(YamlValue::as_str),
            }
        }

        /// Converts a raw value; `Null` is a hole and yields `None`.
        pub(crate) fn from_value(value: YamlValue) -> Result<Option<Self>, String> {
            match value {
                YamlValue::Null => Ok(None),
                YamlValue::String(name) => Ok(Some(Self::Name(name))),
                YamlValue::Mapping(mapping) => {
                    let mut fields = BTreeMap::new();
                    for (key, value) in mapping {
                        let key = match key {
                            YamlValue::String(key) => key,
                            other => {
                                return Err(format!(
                                    "image record keys must be strings, found {other:?}"
                                ));
                            }
                        };
                        fields.insert(key, value);
                    }
                    Ok(Some(Self::Record(fields)))
                }
                other => Err(format!(
                    "image entries must be file names or records, found {other:?}"
                )),
            }
        }
    }

    impl From<&str> for ImageEntry {
        fn from(name: &str) -> Self {
            Self::Name(name.to_string())
        }
    }

    impl From<String> for ImageEntry {
        fn from(name: String) -> Self {
            Self::Name(name)
        }
    }

    impl<'de> Deserialize<'de> for ImageEntry {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = YamlValue::deserialize(deserializer)?;
            Self::from_value(value)
                .map_err(de::Error::custom)?
                .ok_or_else(|| de::Error::custom("image entry must not be null"))
        }
    }

    /// Images as supplied by the author, before normalization.
    ///
    /// Keyed collections enumerate like object keys: integer-like keys first in
    /// ascending numeric order, then every other key in written order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ImageCollection {
        Sequence(Vec<Option<ImageEntry>>),
        Keyed(Vec<(String, Option<ImageEntry>)>),
    }

    impl ImageCollection {
        pub fn len(&self) -> usize {
            match self {
                Self::Sequence(items) => items.len(),
                Self::Keyed(items) => items.len(),
            }
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub(crate) fn into_ordered(self) -> Vec<Option<ImageEntry>> {
            match self {
                Self::Sequence(items) => items,
                Self::Keyed(items) => items.into_iter().map(|(_, entry)| entry).collect(),
            }
        }

        fn from_value(value: YamlValue) -> Result<Self, String> {
            match value {
                YamlValue::Sequence(items) => items
                    .into_iter()
                    .map(ImageEntry::from_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Sequence),
                YamlValue::Mapping(mapping) => {
                    let mut items = Vec::with_capacity(mapping.len());
                    for (key, value) in mapping {
                        let key = match key {
                            YamlValue::String(key) => key,
                            YamlValue::Number(n) => n.to_string(),
                            other => return Err(format!("unsupported image key {other:?}")),
                        };
                        items.push((key, ImageEntry::from_value(value)?));
                    }
                    // stable, so non-index keys keep their written order
                    items.sort_by_key(|(key, _)| match array_index(key) {
                        Some(n) => (0, n),
                        None => (1, 0),
                    });
                    Ok(Self::Keyed(items))
                }
                other => Err(format!(
                    "images must be a list or a map, found {}",
                    value_kind(&other)
                )),
            }
        }
    }

    impl<'de> Deserialize<'de> for ImageCollection {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = YamlValue::deserialize(deserializer)?;
            Self::from_value(value).map_err(de::Error::custom)
        }
    }

    /// Canonical array index (`"7"`, not `"07"` or `"+7"`).
    fn array_index(key: &str) -> Option<u32> {
        key.parse::<u32>()
            .ok()
            .filter(|n| *n != u32::MAX && n.to_string() == key)
    }

    fn value_kind(value: &YamlValue) -> &'static str {
        match value {
            YamlValue::Null => "null",
            YamlValue::Bool(_) => "a boolean",
            YamlValue::Number(_) => "a number",
            YamlValue::String(_) => "a string",
            YamlValue::Sequence(_) => "a list",
            YamlValue::Mapping(_) => "a map",
            YamlValue::Tagged(_) => "a tagged value",
        }
    }
}

mod resolve {
    /// Clamps or wraps `requested` into `0..len`.
    ///
    /// Past the end yields the first index when wrapping and the last one
    /// otherwise; before the start yields the last index when wrapping and the
    /// first one otherwise. An empty album resolves everything to 0.
    pub fn resolve_index(requested: isize, len: usize, wrap: bool) -> usize {
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        if requested < 0 {
            return if wrap { last } else { 0 };
        }
        let requested = requested as usize;
        if requested >= len {
            return if wrap { 0 } else { last };
        }
        requested
    }
}

/// Album as handed to `load_album`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AlbumDescriptor {
    pub name: Option<String>,
    pub images: Option<ImageCollection>,
    /// Base location prepended to file names. Anything but a string or null is rejected.
    pub location: Option<YamlValue>,
    #[serde(alias = "imageNameField")]
    pub image_name_field: Option<String>,
}

impl AlbumDescriptor {
    pub fn new<I, E>(name: impl Into<String>, images: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ImageEntry>,
    {
        Self {
            name: Some(name.into()),
            images: Some(ImageCollection::Sequence(
                images.into_iter().map(|e| Some(e.into())).collect(),
            )),
            location: None,
            image_name_field: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(YamlValue::String(location.into()));
        self
    }

    pub fn with_image_name_field(mut self, field: impl Into<String>) -> Self {
        self.image_name_field = Some(field.into());
        self
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }
}

/// Validated, immutable album.
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    name: String,
    images: Vec<Option<ImageEntry>>,
    location: Option<String>,
    image_name_field: String,
    kind: EntryKind,
}

impl Album {
    /// Validates `descriptor` without touching any viewer state.
    pub fn from_descriptor(descriptor: AlbumDescriptor) -> Result<Self, AlbumError> {
        let name = descriptor
            .name
            .filter(|name| !name.is_empty())
            .ok_or(AlbumError::MissingName)?;
        let images = descriptor
            .images
            .filter(|images| !images.is_empty())
            .ok_or(AlbumError::NoImages)?
            .into_ordered();
        let location = match descriptor.location {
            None | Some(YamlValue::Null) => None,
            Some(YamlValue::String(raw)) => normalize_location(&raw),
            Some(_) => return Err(AlbumError::LocationNotString),
        };
        let image_name_field = descriptor
            .image_name_field
            .unwrap_or_else(|| DEFAULT_IMAGE_NAME_FIELD.to_string());

        let kind = images
            .iter()
            .flatten()
            .map(ImageEntry::kind)
            .next()
            .ok_or(AlbumError::NoDefinedImages)?;
        for (index, entry) in images.iter().enumerate() {
            let Some(entry) = entry else { continue };
            if entry.kind() != kind {
                return Err(AlbumError::MixedEntries { index });
            }
            if entry.file_name(&image_name_field).is_none() {
                return Err(AlbumError::MissingNameField {
                    index,
                    field: image_name_field.clone(),
                });
            }
        }

        Ok(Self {
            name,
            images,
            location,
            image_name_field,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized base location, always ending in `/`.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn image_name_field(&self) -> &str {
        &self.image_name_field
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&ImageEntry> {
        self.images.get(index).and_then(Option::as_ref)
    }

    pub fn is_present(&self, index: usize) -> bool {
        self.entry(index).is_some()
    }

    pub fn file_name(&self, index: usize) -> Option<&str> {
        self.entry(index)
            .and_then(|entry| entry.file_name(&self.image_name_field))
    }

    /// Resolves `requested` to the index of a defined entry.
    ///
    /// Out-of-range requests follow [`resolve_index`]. Landing on a hole scans
    /// forward for the next defined entry, restarting from the first index
    /// when the end is reached.
    pub fn resolve(&self, requested: isize, wrap: bool) -> usize {
        let index = resolve_index(requested, self.len(), wrap);
        if self.is_present(index) {
            return index;
        }
        (index..self.len())
            .chain(0..index)
            .find(|&candidate| self.is_present(candidate))
            .unwrap_or(0)
    }

    /// Index of the first entry whose file name equals `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.images.iter().position(|entry| {
            entry
                .as_ref()
                .and_then(|entry| entry.file_name(&self.image_name_field))
                == Some(name)
        })
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} images)", self.name, self.images.len())
    }
}

/// Converts backslashes to `/` and enforces a trailing separator.
///
/// An empty location means "no location".
pub fn normalize_location(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let mut location = raw.replace('\\', "/");
    if !location.ends_with('/') {
        location.push('/');
    }
    Some(location)
}
