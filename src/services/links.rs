use regex::Regex;
use std::sync::OnceLock;

/// Rewrite Google Drive share links into the direct `lh3.googleusercontent.com`
/// image host form so covers render without the Drive viewer chrome.
///
/// Already-normalized URLs and anything that is not a Drive link pass through
/// untouched, so the function is safe to apply repeatedly.
#[must_use]
pub fn normalize_image_url(url: &str) -> String {
    if url.is_empty() || url.contains("googleusercontent.com/d/") {
        return url.to_string();
    }

    if !url.contains("drive.google.com") {
        return url.to_string();
    }

    match extract_drive_id(url) {
        Some(id) => format!("https://lh3.googleusercontent.com/d/{id}"),
        None => url.to_string(),
    }
}

/// Pull the file id out of either Drive link shape:
/// `.../file/d/<id>/view` or `...?id=<id>&...`.
fn extract_drive_id(url: &str) -> Option<String> {
    static PATH_RE: OnceLock<Regex> = OnceLock::new();
    static QUERY_RE: OnceLock<Regex> = OnceLock::new();

    let path_re =
        PATH_RE.get_or_init(|| Regex::new(r"/d/([^/?#]+)").expect("Invalid regex"));
    if let Some(caps) = path_re.captures(url) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }

    let query_re = QUERY_RE.get_or_init(|| Regex::new(r"id=([^&#]+)").expect("Invalid regex"));
    query_re
        .captures(url)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_file_d_links() {
        assert_eq!(
            normalize_image_url("https://drive.google.com/file/d/abc123XYZ/view?usp=sharing"),
            "https://lh3.googleusercontent.com/d/abc123XYZ"
        );
    }

    #[test]
    fn rewrites_open_id_links() {
        assert_eq!(
            normalize_image_url("https://drive.google.com/open?id=abc123XYZ&usp=drive"),
            "https://lh3.googleusercontent.com/d/abc123XYZ"
        );
    }

    #[test]
    fn uc_export_links_use_query_id() {
        assert_eq!(
            normalize_image_url("https://drive.google.com/uc?export=view&id=some_id#frag"),
            "https://lh3.googleusercontent.com/d/some_id"
        );
    }

    #[test]
    fn already_normalized_links_pass_through() {
        let url = "https://lh3.googleusercontent.com/d/abc123XYZ";
        assert_eq!(normalize_image_url(url), url);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_image_url("https://drive.google.com/file/d/abc/view");
        assert_eq!(normalize_image_url(&once), once);
    }

    #[test]
    fn non_drive_urls_pass_through() {
        let url = "https://example.com/covers/january.png";
        assert_eq!(normalize_image_url(url), url);
    }

    #[test]
    fn drive_links_without_extractable_id_pass_through() {
        let url = "https://drive.google.com/drive/folders";
        assert_eq!(normalize_image_url(url), url);
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_image_url(""), "");
    }
}
