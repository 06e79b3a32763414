//! Scans an R library directory for installed packages by reading each
//! immediate subdirectory's `DESCRIPTION` file, the same stanza format
//! [`pkgr_desc`] already parses for `PACKAGES` index entries.

use pkgr_core::AHashMap;
use std::path::Path;
use tracing::debug;

/// `name -> version` for every installed package found directly under
/// `library`. Missing or unparsable `DESCRIPTION` files are skipped, not
/// fatal — a half-installed or foreign directory shouldn't abort a plan.
#[must_use]
pub fn scan_installed(library: &Path) -> AHashMap<String, String> {
    let mut installed = AHashMap::new();

    let Ok(entries) = std::fs::read_dir(library) else {
        debug!(path = %library.display(), "library directory not readable, treating as empty");
        return installed;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else { continue };
        if dir_name.starts_with("__OLD__") {
            continue;
        }

        let description_path = path.join("DESCRIPTION");
        let Ok(body) = std::fs::read_to_string(&description_path) else { continue };
        let Ok(desc) = pkgr_desc::parse_description(&body) else { continue };
        installed.insert(desc.name, desc.version);
    }

    installed
}
