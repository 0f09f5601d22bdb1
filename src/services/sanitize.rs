/// Turns a free-text title into a URL slug
///
/// Keeps ASCII letters, digits and dashes, turns whitespace into dashes and
/// lowercases the result. Everything else is dropped. Never fails; an empty
/// title gives an empty slug.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    kept.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                '-'
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}
