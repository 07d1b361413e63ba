//! Ref selection and advertisement rewriting.

use crate::advertisement::{RefAdvertisement, RefRecord};
use crate::version::Version;

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

fn candidate_version(record: &RefRecord) -> Option<Version> {
    let rest = record
        .name
        .strip_prefix(HEADS_PREFIX)
        .or_else(|| record.name.strip_prefix(TAGS_PREFIX))?;
    Some(Version::parse(rest))
}

/// Picks the record whose version best satisfies `requested`, per the
/// major/minor/patch/dev banding rules. Ties go to the first occurrence.
pub fn choose_ref<'a>(records: &'a [RefRecord], requested: Version) -> Option<&'a RefRecord> {
    if requested.is_invalid() {
        return None;
    }

    let mut best: Option<(&'a RefRecord, Version)> = None;
    for record in records {
        let Some(v) = candidate_version(record) else { continue };
        if v.is_invalid() {
            continue;
        }
        if v.major != requested.major || v.dev != requested.dev {
            continue;
        }
        if requested.minor != -1 && v.minor != requested.minor {
            continue;
        }
        if requested.patch != -1 && v.patch != requested.patch {
            continue;
        }
        match &best {
            Some((_, best_v)) if *best_v >= v => {}
            _ => best = Some((record, v)),
        }
    }
    best.map(|(r, _)| r)
}

/// Top-level selection: parses `version_token`, delegates to [`choose_ref`]
/// when it parses, otherwise falls back to an exact `refs/heads/<token>` match.
pub fn select_ref<'a>(records: &'a [RefRecord], version_token: &str) -> Option<&'a RefRecord> {
    let parsed = Version::parse(version_token);
    if !parsed.is_invalid() {
        return choose_ref(records, parsed);
    }
    let target = format!("{HEADS_PREFIX}{version_token}");
    records.iter().find(|r| r.name == target)
}

/// Mutates `adv` so that `HEAD` and its symref target point at `chosen_hash`.
///
/// The symref target is read from a `symref=HEAD:<refname>` capability if
/// present, else defaults to `refs/heads/master`.
pub fn rewrite_advertisement(adv: &mut RefAdvertisement, chosen_hash: &str) {
    adv.main_id = chosen_hash.to_string();

    let target = symref_target(adv).unwrap_or_else(|| HEADS_PREFIX.to_string() + "master");
    if let Some(record) = adv.records.iter_mut().find(|r| r.name == target) {
        record.hash = chosen_hash.to_string();
        record.peeled_hash = None;
    }
}

fn symref_target(adv: &RefAdvertisement) -> Option<String> {
    for cap in &adv.capabilities {
        if let Some(rest) = cap.strip_prefix("symref=HEAD:") {
            return Some(rest.to_string());
        }
    }
    None
}
