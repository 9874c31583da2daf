//! Load-order of archive entries.
//!
//! Package loaders read a few files at fixed positions: the install manifest
//! first, chrome registration and icons right after, license texts last.
//! Everything else sits in between, sorted by lower-cased directory and then
//! lower-cased file name.

/// Priority class of an entry, lowest sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// `install.rdf`
    InstallManifest = 1,
    /// `chrome.manifest` and the package icons
    Chrome = 2,
    /// Anything not listed elsewhere
    Default = 4,
    /// License files
    License = 5,
}

/// Names with [`Priority::Chrome`]
const CHROME_FILES: [&str; 3] = ["chrome.manifest", "icon.png", "icon64.png"];

/// Names with [`Priority::License`]
const LICENSE_FILES: [&str; 6] = ["MPL", "GPL", "LGPL", "COPYING", "LICENSE", "license.txt"];

impl Priority {
    /// Priority of an entry name. Only exact, top-level names are special.
    pub fn of(name: &str) -> Self {
        if name == "install.rdf" {
            Self::InstallManifest
        } else if CHROME_FILES.contains(&name) {
            Self::Chrome
        } else if LICENSE_FILES.contains(&name) {
            Self::License
        } else {
            Self::Default
        }
    }
}

/// Sort key of an archive entry.
///
/// Fields compare in declaration order, so an empty directory part sorts
/// before any non-empty one within the same priority.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileKey {
    /// Priority class
    pub priority: Priority,
    /// Lower-cased directory part, without the trailing separator
    pub directory: String,
    /// Lower-cased file name part
    pub basename: String,
}

/// Compute the sort key of an entry name.
pub fn file_key(name: &str) -> FileKey {
    let lowered = name.to_lowercase();
    let (directory, basename) = match lowered.rfind('/') {
        Some(idx) => {
            let (dir, base) = lowered.split_at(idx + 1);
            (trim_separators(dir), base.to_string())
        }
        None => (String::new(), lowered),
    };
    FileKey {
        priority: Priority::of(name),
        directory,
        basename,
    }
}

/// Strip trailing separators from a directory part, keeping a lone root.
fn trim_separators(dir: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() && !dir.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sort entry-like items in place by the key of their name. The sort is stable.
pub fn sort_by_file_key<T, F>(items: &mut [T], name_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by_cached_key(|item| file_key(name_of(item)));
}
