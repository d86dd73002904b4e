use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

/// Wait used when a rate limit error does not say how long to back off
pub const DEFAULT_RATE_LIMIT_WAIT: Duration = Duration::from_secs(30);

fn markdown_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[(.*?)\]\((.*?)\)").expect("valid markdown link regex"))
}

fn try_again_in() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"try again in (?:(\d+)m)?(\d+(?:\.\d+)?)s").expect("valid rate limit regex")
    })
}

/// Strip the decoration LLMs like to put around links: angle brackets,
/// quotes, whitespace and markdown `[text](url)` wrappers.
pub fn clean_url(url: &str) -> String {
    let url = url.replace(['<', '>'], "");
    let url = url.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();

    match markdown_link().captures(url) {
        Some(caps) => caps[2].trim().to_string(),
        None => url.to_string(),
    }
}

/// Resolve `url` against `base` unless it is already absolute
pub fn resolve_url(base: &str, url: &str) -> String {
    if url::Url::parse(url).is_ok() {
        return url.to_string();
    }

    url::Url::parse(base)
        .and_then(|base| base.join(url))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Read the back-off from messages like "Please try again in 7.5s" or
/// "try again in 1m12.3s"
pub fn parse_rate_limit_wait(message: &str) -> Option<Duration> {
    let lower = message.to_lowercase();
    let caps = try_again_in().captures(&lower)?;

    let minutes: f64 = caps
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0);
    let seconds: f64 = caps[2].parse().ok()?;

    Duration::try_from_secs_f64(minutes * 60.0 + seconds).ok()
}

/// Strip markdown code fences from a model reply
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Truncate at a char boundary, for log previews
pub fn preview(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_url() {
        assert_eq!(clean_url("<https://a.nl/1>"), "https://a.nl/1");
        assert_eq!(clean_url(" \"https://a.nl/2\" "), "https://a.nl/2");
        assert_eq!(clean_url("[Bekijk](https://a.nl/3)"), "https://a.nl/3");
        assert_eq!(clean_url(""), "");
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("https://a.nl", "/huur/1"), "https://a.nl/huur/1");
        assert_eq!(
            resolve_url("https://a.nl", "https://b.nl/huur/1"),
            "https://b.nl/huur/1"
        );
        assert_eq!(resolve_url("not a base", "/huur/1"), "/huur/1");
    }

    #[test]
    fn test_parse_rate_limit_wait() {
        assert_eq!(
            parse_rate_limit_wait("Rate limit reached. Please try again in 7.5s."),
            Some(Duration::from_secs_f64(7.5))
        );
        assert_eq!(
            parse_rate_limit_wait("Please Try Again In 1m12s"),
            Some(Duration::from_secs(72))
        );
        assert_eq!(parse_rate_limit_wait("rate limit exceeded"), None);

        let huge = format!("try again in {}s", "9".repeat(400));
        assert_eq!(parse_rate_limit_wait(&huge), None);
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n[]\n```"), "[]");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }

    #[test]
    fn test_preview() {
        let text = "Straße 12";
        let cut = preview(text, 5);
        assert!(cut.len() <= 5);
        assert!(text.starts_with(cut));
    }
}
