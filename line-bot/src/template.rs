//! Flex message template loaded once at startup.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::{info, warn};

use crate::line::ReplyMessage;

/// Default template location, relative to the working directory.
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/comment_template.json";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A pre-authored flex message.
///
/// `contents` keeps the original JSON text so replies carry it unchanged.
#[derive(Debug, Clone, Deserialize)]
pub struct FlexTemplate {
    #[serde(rename = "altText")]
    pub alt_text: String,
    pub contents: Box<RawValue>,
}

impl FlexTemplate {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the template at `path`.
    ///
    /// A missing file is not an error and yields `None`; an unreadable or
    /// malformed file is.
    pub fn load(path: &Path) -> Result<Option<Self>, TemplateError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "flex_template_not_found");
                return Ok(None);
            }
            Err(source) => {
                return Err(TemplateError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let template = Self::from_json(&raw).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            path = %path.display(),
            alt_text = %template.alt_text,
            contents_length = template.contents.get().len(),
            "flex_template_loaded"
        );

        Ok(Some(template))
    }

    pub fn to_reply(&self) -> ReplyMessage {
        ReplyMessage::Flex {
            alt_text: self.alt_text.clone(),
            contents: self.contents.clone(),
        }
    }
}
