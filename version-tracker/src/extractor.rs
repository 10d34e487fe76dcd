//! Version extraction from raw file content.
//!
//! Two independent parsers, neither doing I/O:
//!   * [`extract_manifest_version`] reads a POM-style project descriptor and
//!     falls back to the parent version, then to [`UNKNOWN_VERSION`].
//!   * [`extract_spec_version`] reads `info.version` from an OpenAPI-style
//!     YAML or JSON document and fails when it is missing or not a string.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::errors::{ExtractionResult, VersionExtractionError};

/// Placeholder for a version that could not be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

const PROJECT: &[u8] = b"project";
const PARENT: &[u8] = b"parent";
const VERSION: &[u8] = b"version";

const INFO_FIELD: &str = "info";
const VERSION_FIELD: &str = "version";

/// Which version element the reader is currently inside.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Own,
    Parent,
}

fn slot_of(stack: &[Vec<u8>]) -> Option<Slot> {
    match stack {
        [root, v] if root == PROJECT && v == VERSION => Some(Slot::Own),
        [root, p, v] if root == PROJECT && p == PARENT && v == VERSION => Some(Slot::Parent),
        _ => None,
    }
}

/// Version declared by a project manifest.
///
/// Only `project/version` and `project/parent/version` are considered;
/// namespace prefixes are ignored. A manifest that declares neither yields
/// [`UNKNOWN_VERSION`], which is not an error.
pub fn extract_manifest_version(content: &str) -> ExtractionResult<String> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut text = String::new();
    let mut own: Option<String> = None;
    let mut parent: Option<String> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            VersionExtractionError::ManifestParse(format!(
                "{e} at position {}",
                reader.error_position()
            ))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if stack.is_empty() {
                    check_root(&name, seen_root)?;
                    seen_root = true;
                }
                stack.push(name);
                text.clear();
            }
            Event::Empty(e) => {
                if stack.is_empty() {
                    check_root(e.local_name().as_ref(), seen_root)?;
                    seen_root = true;
                }
            }
            Event::Text(t) => {
                if slot_of(&stack).is_some() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| VersionExtractionError::ManifestParse(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if slot_of(&stack).is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let value = text.trim();
                if !value.is_empty() {
                    match slot_of(&stack) {
                        Some(Slot::Own) if own.is_none() => own = Some(value.to_string()),
                        Some(Slot::Parent) if parent.is_none() => {
                            parent = Some(value.to_string())
                        }
                        _ => {}
                    }
                }
                text.clear();
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(VersionExtractionError::ManifestParse(format!(
            "unexpected end of document inside <{}>",
            String::from_utf8_lossy(stack.last().map(Vec::as_slice).unwrap_or_default())
        )));
    }
    if !seen_root {
        return Err(VersionExtractionError::ManifestParse(
            "no <project> root element".to_string(),
        ));
    }

    Ok(own
        .or(parent)
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string()))
}

fn check_root(name: &[u8], seen_root: bool) -> ExtractionResult<()> {
    if seen_root {
        return Err(VersionExtractionError::ManifestParse(
            "multiple root elements".to_string(),
        ));
    }
    if name != PROJECT {
        return Err(VersionExtractionError::ManifestParse(format!(
            "expected <project> root element, found <{}>",
            String::from_utf8_lossy(name)
        )));
    }
    Ok(())
}

/// `info.version` of an API spec document.
///
/// Every spec is read as YAML, which also covers JSON documents. The version
/// is returned verbatim; no semantic-version check is applied.
pub fn extract_spec_version(content: &str, path: &str) -> ExtractionResult<String> {
    let root: serde_yml::Value =
        serde_yml::from_str(content).map_err(|e| VersionExtractionError::SpecParse {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    let info = root
        .get(INFO_FIELD)
        .ok_or_else(|| missing_info(path))?;
    info.get(VERSION_FIELD)
        .and_then(serde_yml::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid_version(path))
}

fn missing_info(path: &str) -> VersionExtractionError {
    VersionExtractionError::SpecStructure {
        path: path.to_string(),
        reason: "missing info field",
    }
}

fn invalid_version(path: &str) -> VersionExtractionError {
    VersionExtractionError::SpecStructure {
        path: path.to_string(),
        reason: "missing or invalid version field",
    }
}
