//! The line-oriented `key = value` dialect with `[Section]` headers used by the
//! TES3MP client and server `.cfg` files, plus OpenMW's flat `openmw.cfg`.
//!
//! Writes never re-emit the file from a model. They walk the original text and
//! replace only the value of lines that match, so comments, ordering, unknown
//! keys and line endings survive untouched.

pub mod client;
pub mod openmw;
pub mod server;

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

pub use client::{parse_client_config, update_client_values, ClientConnection};
pub use openmw::{load_openmw_config, parse_openmw_config, OpenMwConfig};
pub use server::{
    parse_server_config, update_server_config_values, GeneralConfig, GeneralPatch,
    MasterServerConfig, MasterServerPatch, PluginsConfig, PluginsPatch, ServerConfigPatch,
    ServerTextConfig,
};

pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Skip,
    Section(&'a str),
    Entry { key: &'a str, value: &'a str },
    Other,
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Skip;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        return Line::Section(trimmed[1..trimmed.len() - 1].trim());
    }
    match trimmed.split_once('=') {
        Some((key, value)) => Line::Entry {
            key: key.trim(),
            value: value.trim(),
        },
        None => Line::Other,
    }
}

/// Calls `visit(section, key, value)` for every entry that sits under a
/// section header. Entries before the first header are not reported.
fn for_each_entry<'a>(content: &'a str, mut visit: impl FnMut(&'a str, &'a str, &'a str)) {
    let mut section: Option<&str> = None;
    for line in content.lines() {
        match classify(line) {
            Line::Section(name) => section = Some(name),
            Line::Entry { key, value } => {
                if let Some(section) = section {
                    visit(section, key, value);
                }
            }
            Line::Skip | Line::Other => {}
        }
    }
}

pub fn parse(content: &str) -> Sections {
    let mut sections = Sections::new();
    for_each_entry(content, |section, key, value| {
        sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    });
    sections
}

/// Rewrites the value of each entry for which `replacement(section, key)`
/// returns `Some`. The line keeps its indentation and terminator. Fails with
/// [`CoreError::NoKeysUpdated`] when nothing matched, and with a parse error
/// when a replacement would span more than one line.
pub(crate) fn rewrite_values(
    content: &str,
    mut replacement: impl FnMut(&str, &str) -> Option<String>,
) -> CoreResult<String> {
    let mut out = String::with_capacity(content.len());
    let mut section: Option<String> = None;
    let mut updated = 0usize;

    for raw in content.split_inclusive('\n') {
        let (body, terminator) = split_terminator(raw);
        match classify(body) {
            Line::Section(name) => section = Some(name.to_string()),
            Line::Entry { key, .. } => {
                if let Some(value) = section.as_deref().and_then(|s| replacement(s, key)) {
                    if value.contains(['\n', '\r']) {
                        return Err(CoreError::parse(key, value, "single-line value"));
                    }
                    let indent = &body[..body.len() - body.trim_start().len()];
                    out.push_str(indent);
                    out.push_str(key);
                    out.push_str(" = ");
                    out.push_str(&value);
                    out.push_str(terminator);
                    updated += 1;
                    continue;
                }
            }
            Line::Skip | Line::Other => {}
        }
        out.push_str(raw);
    }

    if updated == 0 {
        return Err(CoreError::NoKeysUpdated);
    }
    tracing::debug!(updated, "rewrote config lines");
    Ok(out)
}

fn split_terminator(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
