//! In-place edits to the `Packages:` list of a `pkgr.yml` file, preserving
//! every other line exactly as written (no round-trip through
//! `serde_yaml`, which would lose comments and reformat the document).

const DEFAULT_INDENT: &str = "  ";

/// Add `name` under the `Packages:` key, creating the key if absent.
/// A no-op if `name` is already listed.
#[must_use]
pub fn add_package(raw: &str, name: &str) -> String {
    let had_trailing_newline = raw.ends_with('\n');
    let mut lines: Vec<String> = raw.lines().map(str::to_string).collect();

    if let Some((key_idx, end)) = packages_block(&lines) {
        if lines[key_idx + 1..end].iter().any(|line| item_name(line).as_deref() == Some(name)) {
            return raw.to_string();
        }
        let indent = item_indent(&lines[key_idx + 1..end]);
        lines.insert(end, format!("{indent}- {name}"));
    } else {
        lines.push("Packages:".to_string());
        lines.push(format!("{DEFAULT_INDENT}- {name}"));
    }

    render(&lines, had_trailing_newline)
}

/// Remove `name` from the `Packages:` list. A no-op if the key or the
/// name isn't present.
#[must_use]
pub fn remove_package(raw: &str, name: &str) -> String {
    let had_trailing_newline = raw.ends_with('\n');
    let lines: Vec<String> = raw.lines().map(str::to_string).collect();

    let Some((key_idx, end)) = packages_block(&lines) else { return raw.to_string() };

    let mut result = Vec::with_capacity(lines.len());
    result.extend_from_slice(&lines[..=key_idx]);
    result.extend(lines[key_idx + 1..end].iter().filter(|line| item_name(line).as_deref() != Some(name)).cloned());
    result.extend_from_slice(&lines[end..]);

    render(&result, had_trailing_newline)
}

fn render(lines: &[String], had_trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if had_trailing_newline {
        out.push('\n');
    }
    out
}

/// Locate the `Packages:` key (unindented, exact match) and the exclusive
/// end of its indented list-item block.
fn packages_block(lines: &[String]) -> Option<(usize, usize)> {
    let key_idx = lines.iter().position(|line| line.trim_end() == "Packages:")?;
    let mut end = key_idx + 1;
    while end < lines.len() && (lines[end].starts_with(' ') || lines[end].starts_with('\t')) {
        end += 1;
    }
    Some((key_idx, end))
}

fn item_indent(items: &[String]) -> String {
    items
        .iter()
        .find_map(|line| line.find('-').map(|dash| line[..dash].to_string()))
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

fn item_name(line: &str) -> Option<String> {
    let rest = line.trim().strip_prefix('-')?.trim();
    Some(rest.trim_matches('\'').trim_matches('"').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_to_existing_packages_block() {
        let raw = "Version: 1\nPackages:\n  - dplyr\n  - purrr\nThreads: 4\n";
        let updated = add_package(raw, "ggplot2");
        assert_eq!(updated, "Version: 1\nPackages:\n  - dplyr\n  - purrr\n  - ggplot2\nThreads: 4\n");
    }

    #[test]
    fn adding_duplicate_is_a_no_op() {
        let raw = "Packages:\n  - dplyr\n";
        assert_eq!(add_package(raw, "dplyr"), raw);
    }

    #[test]
    fn creates_packages_block_when_absent() {
        let raw = "Version: 1\n";
        let updated = add_package(raw, "dplyr");
        assert_eq!(updated, "Version: 1\nPackages:\n  - dplyr\n");
    }

    #[test]
    fn removes_named_package_and_leaves_rest_untouched() {
        let raw = "Packages:\n  - dplyr\n  - purrr\nThreads: 4\n";
        let updated = remove_package(raw, "dplyr");
        assert_eq!(updated, "Packages:\n  - purrr\nThreads: 4\n");
    }

    #[test]
    fn removing_absent_package_is_a_no_op() {
        let raw = "Packages:\n  - dplyr\n";
        assert_eq!(remove_package(raw, "ggplot2"), raw);
    }

    #[test]
    fn removing_from_missing_block_is_a_no_op() {
        let raw = "Version: 1\n";
        assert_eq!(remove_package(raw, "dplyr"), raw);
    }
}
