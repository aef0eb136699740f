//! Build-time helpers for rendering the `wbemcli` manual page.
//!
//! Build scripts cannot share code with the crate they build, so the date
//! derivation and output placement live here where they can be tested.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use time::{OffsetDateTime, format_description::well_known::Iso8601};

const FALLBACK_DATE: &str = "1970-01-01";

enum SourceDateError {
    Missing,
    InvalidInteger { raw: String },
    InvalidTimestamp { raw: String },
}

/// Derives the manual page date from a `SOURCE_DATE_EPOCH` value.
///
/// Invalid values fall back to the Unix epoch so builds stay reproducible.
/// Warnings are collected without the `cargo:warning=` prefix; the caller
/// decides how to emit them.
///
/// # Examples
/// ```
/// use wbemcli_build_util::manual_date;
///
/// let mut warnings = Vec::new();
/// assert_eq!(manual_date(Some("86400"), &mut warnings), "1970-01-02");
/// assert!(warnings.is_empty());
/// ```
#[must_use]
pub fn manual_date(source_date_epoch: Option<&str>, warnings: &mut Vec<String>) -> String {
    let value = match parse_source_date(source_date_epoch) {
        Ok(value) => value,
        Err(error) => {
            push_source_date_warning(warnings, &error);
            return FALLBACK_DATE.into();
        }
    };

    value.format(&Iso8601::DATE).map_or_else(
        |_| {
            warnings.push(format!(
                "SOURCE_DATE_EPOCH could not be formatted; falling back to {FALLBACK_DATE}"
            ));
            FALLBACK_DATE.into()
        },
        |date| date,
    )
}

fn parse_source_date(raw: Option<&str>) -> Result<OffsetDateTime, SourceDateError> {
    let Some(raw) = raw else {
        return Err(SourceDateError::Missing);
    };
    let timestamp = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| SourceDateError::InvalidInteger {
            raw: raw.to_owned(),
        })?;
    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|_| SourceDateError::InvalidTimestamp {
        raw: raw.to_owned(),
    })
}

fn push_source_date_warning(warnings: &mut Vec<String>, error: &SourceDateError) {
    match error {
        SourceDateError::Missing => {}
        SourceDateError::InvalidInteger { raw } => warnings.push(format!(
            "Invalid SOURCE_DATE_EPOCH '{raw}'; expected integer seconds since Unix epoch; \
             falling back to {FALLBACK_DATE}"
        )),
        SourceDateError::InvalidTimestamp { raw } => warnings.push(format!(
            "Invalid SOURCE_DATE_EPOCH '{raw}'; not a valid Unix timestamp; falling back to \
             {FALLBACK_DATE}"
        )),
    }
}

/// Locates the workspace `target` directory above a build script `OUT_DIR`.
///
/// `OUT_DIR` looks like `{workspace}/target/{profile}/build/{crate}-{hash}/out`
/// for native builds and gains a `{target}` component for cross builds.
#[must_use]
pub fn workspace_target_dir(out_dir: &Path) -> Option<PathBuf> {
    out_dir
        .ancestors()
        .find(|candidate| candidate.file_name().and_then(|name| name.to_str()) == Some("target"))
        .map(Path::to_path_buf)
}

/// Directory that receives generated manual pages for a target and profile.
///
/// Falls back to a relative `target` directory when `OUT_DIR` is unknown.
#[must_use]
pub fn man_page_dir(target: &str, profile: &str, out_dir: Option<&Path>) -> PathBuf {
    let base = out_dir
        .and_then(workspace_target_dir)
        .unwrap_or_else(|| PathBuf::from("target"));
    base.join("generated-man").join(target).join(profile)
}

/// Writes a manual page, replacing any previous copy via rename.
///
/// # Errors
///
/// Returns any IO error raised while creating the directory or writing the
/// page.
pub fn write_man_page(data: &[u8], dir: &Path, page_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let destination = dir.join(page_name);
    let staging = dir.join(format!("{page_name}.tmp"));
    fs::write(&staging, data)?;
    fs::rename(&staging, &destination)?;
    Ok(destination)
}
