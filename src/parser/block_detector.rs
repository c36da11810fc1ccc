use std::collections::HashSet;

/// True if any marker occurs, case-insensitively, in the page title or body.
/// Blank markers are ignored so a stray "" in config cannot flag every page.
pub fn is_blocked(title: &str, html: &str, markers: &HashSet<String>) -> bool {
    let title = title.to_lowercase();
    let html = html.to_lowercase();

    markers
        .iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .any(|m| title.contains(&m) || html.contains(&m))
}
