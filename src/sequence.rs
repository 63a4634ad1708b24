//! Part sequencing: making staged names multi-part-codec compatible.
//!
//! A multi-part rar codec expects its volumes to share one base name and
//! differ only by part index. The fetcher stages each part under its
//! remote-derived name prefixed with the part ordinal, so this step always
//! renames: either the ordinal prefix is dropped to restore remote names
//! that are already codec-compatible, or the whole set is canonicalized to
//! a `download.part{n}.rar` series in original fetch order.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

/// Characters of the filename compared when deciding whether staged names
/// already share a codec-compatible base. The leading ordinal digits written
/// by the fetcher are skipped first.
const ALIGNMENT_WIDTH: usize = 4;

fn alignment_key(name: &str) -> &str {
    let rest = ordinal_prefix(name).1;
    let end = rest
        .char_indices()
        .nth(ALIGNMENT_WIDTH)
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Splits a staged name into the numeric ordinal the fetcher prefixed and
/// the remote-derived remainder. Names without a digit prefix come back
/// whole.
fn ordinal_prefix(name: &str) -> (Option<u64>, &str) {
    let digits_end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    match name[..digits_end].parse::<u64>() {
        Ok(ordinal) => (Some(ordinal), &name[digits_end..]),
        Err(_) => (None, name),
    }
}

/// Ensures the staged files are named so that a multi-part codec
/// concatenates them correctly.
///
/// With a single staged file sequencing is skipped entirely. Otherwise the
/// files are put in fetch order by their parsed numeric ordinal prefix
/// (plain lexicographic sorting would place ordinal 10 before 2), and the
/// two first names are compared past that prefix. A match means the remote
/// names are codec-compatible, so each file is renamed to its remote name
/// with the ordinal prefix dropped; a mismatch renames every file to
/// `download.part{n}.rar`, where `n` is its 1-based fetch position.
pub fn sequence(staging_dir: &Path, staged_names: &[String]) -> Result<Vec<String>> {
    if staged_names.len() < 2 {
        return Ok(staged_names.to_vec());
    }

    let mut ordered: Vec<&str> = staged_names.iter().map(String::as_str).collect();
    ordered.sort_by_key(|name| {
        let (ordinal, rest) = ordinal_prefix(name);
        (ordinal.unwrap_or(u64::MAX), rest.to_string())
    });

    let compatible = alignment_key(ordered[0]) == alignment_key(ordered[1]);
    if compatible {
        debug!("remote names are codec-compatible; dropping ordinal prefixes");
    }

    let mut renamed = Vec::with_capacity(ordered.len());
    for (index, name) in ordered.iter().enumerate() {
        let target = if compatible {
            ordinal_prefix(name).1.to_string()
        } else {
            format!("download.part{}.rar", index + 1)
        };
        if target != *name {
            let from = staging_dir.join(name);
            let to = staging_dir.join(&target);
            std::fs::rename(&from, &to).map_err(|source| Error::Rename {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            debug!(from = %from.display(), to = %to.display(), "part renamed");
        }
        renamed.push(target);
    }

    info!(parts = renamed.len(), "staged parts sequenced");
    Ok(renamed)
}
