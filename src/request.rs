//! Request URL construction
//!
//! The first page of a stream is addressed as
//! `{base_url}/{method}?version={version}&key=value...`; later pages come from
//! the continuation URL the API embeds in each response.

use crate::config::ClientConfig;
use crate::types::QueryEncoding;
use std::borrow::Cow;

/// Build the URL of the first page for a configuration
///
/// Parameters follow the version in key order, each exactly once.
pub fn build_first_url(config: &ClientConfig) -> String {
    let base = config.base_url.trim_end_matches('/');
    let mut url = format!(
        "{base}/{}?version={}",
        config.method,
        encode(&config.version, config.encoding)
    );

    for (key, value) in &config.params {
        url.push_str(&format!(
            "&{}={}",
            encode(key, config.encoding),
            encode(value, config.encoding)
        ));
    }

    url
}

fn encode(raw: &str, encoding: QueryEncoding) -> Cow<'_, str> {
    match encoding {
        QueryEncoding::Raw => Cow::Borrowed(raw),
        QueryEncoding::Percent => {
            Cow::Owned(url::form_urlencoded::byte_serialize(raw.as_bytes()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(encoding: QueryEncoding) -> ClientConfig {
        ClientConfig::builder("m")
            .base_url("http://x/rss")
            .version("2.1.3")
            .vendor("v")
            .param("a", "1")
            .param("b", "2")
            .encoding(encoding)
            .build()
            .unwrap()
    }

    #[test]
    fn test_first_url_shape() {
        let url = build_first_url(&config(QueryEncoding::Raw));

        assert!(url.starts_with("http://x/rss/m?version=2.1.3"));
        for pair in ["&a=1", "&b=2", "&vendor=v"] {
            assert_eq!(url.matches(pair).count(), 1, "{pair} in {url}");
        }
    }

    #[test]
    fn test_first_url_is_deterministic() {
        let url = build_first_url(&config(QueryEncoding::Raw));
        assert_eq!(url, "http://x/rss/m?version=2.1.3&a=1&b=2&vendor=v");
        assert_eq!(url, build_first_url(&config(QueryEncoding::Raw)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::builder("feed.getDelta")
            .base_url("http://x/rss/")
            .vendor("v")
            .build()
            .unwrap();
        assert!(build_first_url(&config).starts_with("http://x/rss/feed.getDelta?version="));
    }

    #[test]
    fn test_raw_values_are_not_escaped() {
        let config = ClientConfig::builder("m")
            .base_url("http://x/rss")
            .vendor("v")
            .param("q", "a b&c")
            .build()
            .unwrap();
        assert!(build_first_url(&config).contains("&q=a b&c"));
    }

    #[test]
    fn test_percent_encoding() {
        let config = ClientConfig::builder("m")
            .base_url("http://x/rss")
            .vendor("v")
            .param("q", "a b&c")
            .encoding(QueryEncoding::Percent)
            .build()
            .unwrap();
        let url = build_first_url(&config);
        assert!(url.contains("&q=a+b%26c"), "{url}");
        assert!(url::Url::parse(&url).is_ok());
    }
}
