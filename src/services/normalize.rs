/// Strip a leading BOM and convert CRLF line endings to LF
pub fn normalize_content(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.replace("\r\n", "\n")
}
