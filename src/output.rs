//! Output rendering.

use crate::scanner::ScanResult;

/// Renders a scan result as newline-separated lines.
///
/// Plain names are sorted by byte order with duplicates kept adjacent;
/// annotated pairs keep their scan order as `<path>: <name>`. An empty
/// result renders as the empty string. No trailing newline is added.
pub fn format_output(result: &ScanResult) -> String {
    match result {
        ScanResult::Names(names) => {
            let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
            sorted.sort();
            sorted.join("\n")
        }
        ScanResult::Annotated(pairs) => pairs
            .iter()
            .map(|(path, name)| format!("{}: {}", path.display(), name))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
