/*!
 * Mod version parsing for the community-dictionary tie-break.
 *
 * Versions are compared semantically: dotted numeric release components,
 * an optional pre-release that sorts below the plain release, and build
 * metadata that is ignored. Strings that do not parse sort below every
 * parseable version.
 */

use std::cmp::Ordering;

/// A parsed mod version
#[derive(Debug, Clone)]
pub struct ModVersion {
    release: Vec<u64>,
    pre_release: Option<String>,
}

impl ModVersion {
    /// Parse a version string such as `1.20.1`, `v2.0-beta.3` or `3.1+build7`
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let without_build = trimmed.split('+').next().unwrap_or_default();
        let (release_part, pre_release) = match without_build.split_once('-') {
            Some((release, pre)) if !pre.is_empty() => (release, Some(pre.to_string())),
            Some(_) => return None,
            None => (without_build, None),
        };

        if release_part.is_empty() {
            return None;
        }

        let release = release_part
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self { release, pre_release })
    }

    /// Numeric release components
    pub fn release(&self) -> &[u64] {
        &self.release
    }
}

impl Ord for ModVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }

        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => compare_pre_release(a, b),
        }
    }
}

impl PartialEq for ModVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModVersion {}

impl PartialOrd for ModVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key for optional version strings: unparseable or missing versions are lowest
pub fn version_key(version: Option<&str>) -> Option<ModVersion> {
    version.and_then(ModVersion::parse)
}

fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => x.cmp(y),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}
