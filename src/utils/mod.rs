const VIDEO_EXTENSION: &str = "mp4";
const FALLBACK_STEM: &str = "video";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name a video is saved under, derived from its title.
pub fn suggested_filename(title: &str) -> String {
    let sanitized = sanitize_filename(title);
    let stem = sanitized.trim_matches(|c| c == '.' || c == ' ');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{}.{}", stem, VIDEO_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.mp4"), "test_file.mp4");
        assert_eq!(sanitize_filename("normal-name.mp4"), "normal-name.mp4");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename("One"), "One.mp4");
        assert_eq!(suggested_filename("AC/DC: Live?"), "AC_DC_ Live_.mp4");
        assert_eq!(suggested_filename(" ..hidden.. "), "hidden.mp4");
    }

    #[test]
    fn test_suggested_filename_blank_title() {
        assert_eq!(suggested_filename(""), "video.mp4");
        assert_eq!(suggested_filename(" . "), "video.mp4");
    }
}
