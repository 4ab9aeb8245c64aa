//! Version tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
  #[error("version tag is empty")]
  Empty,

  /// The tag is used verbatim as a directory name under the destination root.
  #[error("version tag {0:?} is not usable as a path component")]
  NotAPathComponent(String),
}

/// Identifier of a release to build documentation for (e.g. `1.9.3`).
///
/// Tags are opaque: whether the tag exists upstream is only discovered when the
/// version-control tool is asked to check it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionTag(String);

impl VersionTag {
  pub fn new(tag: impl Into<String>) -> Result<Self, TagError> {
    let tag = tag.into();
    if tag.is_empty() {
      return Err(TagError::Empty);
    }
    if tag == "." || tag == ".." || tag.contains(['/', '\\']) {
      return Err(TagError::NotAPathComponent(tag));
    }
    Ok(Self(tag))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for VersionTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for VersionTag {
  type Err = TagError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for VersionTag {
  type Error = TagError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(value)
  }
}

impl From<VersionTag> for String {
  fn from(tag: VersionTag) -> Self {
    tag.0
  }
}
