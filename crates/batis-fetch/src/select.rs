//! Build selection
//!
//! Picks the build to download from an index: first the builds that can run
//! on this machine, then the one with the latest version.

use std::cmp::Ordering;
use std::sync::LazyLock;

use batis_core::types::BuildDescriptor;
use batis_core::{Error, Result};
use batis_distro::HostPlatform;
use regex::Regex;

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run regex is valid"));

/// `x86` in an index matches any `i<digit>86` machine
static X86_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^i\d86").expect("x86 arch regex is valid"));

/// Whether `build` can run on `platform`
pub fn check_match(build: &BuildDescriptor, platform: &HostPlatform) -> bool {
    let kernel = build.kernel_or_any().to_lowercase();
    if kernel != "any" && kernel != platform.kernel {
        return false;
    }

    let arch = build.arch_or_any().to_lowercase();
    arch == "any" || arch == platform.arch || (arch == "x86" && X86_RE.is_match(&platform.arch))
}

/// Builds from `candidates` that can run on `platform`, in index order.
///
/// Fails with [`Error::NoEligibleBuild`] when nothing matches.
pub fn filter_eligible<'a>(
    candidates: &'a [BuildDescriptor],
    platform: &HostPlatform,
) -> Result<impl Iterator<Item = &'a BuildDescriptor> + 'a> {
    let owned = platform.clone();
    let mut eligible = candidates
        .iter()
        .filter(move |build| check_match(build, &owned))
        .peekable();

    if eligible.peek().is_none() {
        return Err(Error::no_eligible_build(&platform.kernel, &platform.arch));
    }
    Ok(eligible)
}

/// Numeric parts of a version string, as comparable keys
fn numeric_parts(version: &str) -> Vec<(usize, &str)> {
    DIGITS_RE
        .find_iter(version)
        .map(|m| {
            let digits = m.as_str().trim_start_matches('0');
            (digits.len(), digits)
        })
        .collect()
}

/// Compare two versions by their runs of digits, ignoring everything else
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    numeric_parts(a).cmp(&numeric_parts(b))
}

/// Whether version `subject` is strictly later than `compare_to`
pub fn later_version(subject: &str, compare_to: &str) -> bool {
    compare_versions(subject, compare_to) == Ordering::Greater
}

/// The candidate with the latest version; the first one wins a tie
pub fn select_latest<'a, I>(candidates: I) -> Option<&'a BuildDescriptor>
where
    I: IntoIterator<Item = &'a BuildDescriptor>,
{
    candidates.into_iter().fold(None, |latest, build| match latest {
        Some(current) if !later_version(&build.version, &current.version) => Some(current),
        _ => Some(build),
    })
}
