use renderer_client::Cookie;

use crate::COOKIE_DOMAIN;

/// Split a raw `Cookie:` header string into discrete cookies scoped to the
/// platform domain. Fragments without `=` or with an empty name are skipped;
/// `=` inside a value is preserved.
pub fn parse_cookie_string(raw: &str) -> Vec<Cookie> {
    raw.split(';')
        .filter_map(|part| {
            let part = part.trim();
            let (name, value) = part.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie {
                name: name.to_string(),
                value: value.trim().to_string(),
                domain: COOKIE_DOMAIN.to_string(),
                path: "/".to_string(),
                http_only: false,
                secure: true,
                same_site: "Lax".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_multiple_cookies() {
        let cookies = parse_cookie_string("a1=foo; webid=bar;web_session=baz");
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[0].name, "a1");
        assert_eq!(cookies[0].value, "foo");
        assert_eq!(cookies[0].domain, ".xiaohongshu.com");
        assert_eq!(cookies[0].path, "/");
        assert!(cookies[0].secure);
        assert!(!cookies[0].http_only);
        assert_eq!(cookies[0].same_site, "Lax");
        assert_eq!(cookies[2].name, "web_session");
    }

    #[test]
    fn test_skips_malformed_fragments() {
        let cookies = parse_cookie_string("a1=foo; bare-token; =orphan; ;b2=ok");
        let names: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "b2"]);
    }

    #[test]
    fn test_preserves_equals_inside_value() {
        let cookies = parse_cookie_string("token=abc=def==");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "abc=def==");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_cookie_string("").is_empty());
        assert!(parse_cookie_string("  ;  ; ").is_empty());
    }
}
