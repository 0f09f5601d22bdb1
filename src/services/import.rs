use crate::models::NewWatchedShow;

/// Parses a plain-text watched list
///
/// The file is a sequence of category headers, each followed by its shows:
///
/// ```text
/// CRIME / THRILLER:
/// - Narcos
/// - Mindhunter
/// ```
///
/// A header is a line of upper-case letters, spaces, slashes and dashes ending
/// in `:` and starting with a letter.
/// Lines before the first header and blank titles are ignored.
pub fn parse_watched_list(content: &str) -> Vec<NewWatchedShow> {
    let mut category: Option<String> = None;
    let mut shows = Vec::new();

    for line in content.lines() {
        if let Some(header) = category_header(line) {
            category = Some(header.to_string());
            continue;
        }

        let Some(current) = category.as_ref() else {
            continue;
        };

        if let Some(title) = line.trim_start().strip_prefix("- ") {
            let title = title.trim();
            if !title.is_empty() {
                shows.push(NewWatchedShow::new(title, Some(current.clone())));
            }
        }
    }

    shows
}

fn category_header(line: &str) -> Option<&str> {
    let name = line.trim_end().strip_suffix(':')?.trim();
    let valid = name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || matches!(c, ' ' | '/' | '-'));
    valid.then_some(name)
}
