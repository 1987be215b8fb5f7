// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Utility functions for Sitecraft
//!
//! URL validation, image fetching, page scraping, and response formatting
//! helpers kept out of main.rs for testability.

use base64::Engine;

use crate::error::{Result, SitecraftError};
use crate::llm::message::ImageSource;

/// Check whether a string is a usable http(s) URL
pub fn is_valid_url(input: &str) -> bool {
    match reqwest::Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Fetch an image over HTTP and encode it as a base64 attachment
pub async fn fetch_image(url: &str) -> Result<ImageSource> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(SitecraftError::InvalidInput(format!(
            "image fetch returned status {}",
            response.status().as_u16()
        )));
    }

    let media_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .unwrap_or_else(|| "image/jpeg".to_string());

    let bytes = response.bytes().await?;
    let data = base64::engine::general_purpose::STANDARD.encode(&bytes);

    Ok(ImageSource::Base64 { media_type, data })
}

/// Fetch a page and return its visible text
pub async fn scrape_url(url: &str) -> Result<String> {
    let response = reqwest::get(url).await?;

    if !response.status().is_success() {
        return Err(SitecraftError::InvalidInput(format!(
            "scrape returned status {}",
            response.status().as_u16()
        )));
    }

    let html = response.text().await?;
    Ok(strip_html_tags(&html))
}

/// Strip markup from an HTML document, dropping script and style content
pub fn strip_html_tags(html: &str) -> String {
    let mut text = String::new();
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        rest = &rest[open..];

        let lower = rest.to_lowercase();
        if lower.starts_with("<script") {
            match lower.find("</script>") {
                Some(end) => rest = &rest[end + "</script>".len()..],
                None => return collapse_whitespace(&text),
            }
            continue;
        }
        if lower.starts_with("<style") {
            match lower.find("</style>") {
                Some(end) => rest = &rest[end + "</style>".len()..],
                None => return collapse_whitespace(&text),
            }
            continue;
        }

        match rest.find('>') {
            Some(close) => rest = &rest[close + 1..],
            None => return collapse_whitespace(&text),
        }
    }

    text.push_str(rest);
    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A displayable chunk of an assistant response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSegment {
    /// Prose outside code fences
    Prose(String),
    /// Fenced code, language line removed
    Code(String),
}

/// Split a response on triple-backtick fences for display
///
/// Odd-numbered chunks are code; their first line (the language tag) is
/// dropped. A fenced chunk with no body falls back to prose.
pub fn format_response_segments(response: &str) -> Vec<ResponseSegment> {
    if !response.contains("```") {
        return vec![ResponseSegment::Prose(response.to_string())];
    }

    response
        .split("```")
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 0 {
                return ResponseSegment::Prose(part.to_string());
            }

            let code = part.lines().skip(1).collect::<Vec<_>>().join("\n");
            if code.trim().is_empty() {
                ResponseSegment::Prose(part.to_string())
            } else {
                ResponseSegment::Code(code)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/page"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("/local/path.png"));
    }

    #[test]
    fn test_strip_html_tags() {
        let html = "<html><head><style>p { color: red; }</style></head>\
                    <body><p>Hello <b>world</b></p><script>alert(1)</script></body></html>";

        assert_eq!(strip_html_tags(html), "Hello world");
    }

    #[test]
    fn test_strip_html_tags_unclosed() {
        assert_eq!(strip_html_tags("text <b>bold"), "text bold");
        assert_eq!(strip_html_tags("text <unterminated"), "text");
    }

    #[test]
    fn test_format_plain_response() {
        let segments = format_response_segments("just prose");
        assert_eq!(segments, vec![ResponseSegment::Prose("just prose".to_string())]);
    }

    #[test]
    fn test_format_fenced_response() {
        let segments =
            format_response_segments("Here:\n```css\nbody { margin: 0; }\n```\nDone.");

        assert_eq!(
            segments,
            vec![
                ResponseSegment::Prose("Here:\n".to_string()),
                ResponseSegment::Code("body { margin: 0; }".to_string()),
                ResponseSegment::Prose("\nDone.".to_string()),
            ]
        );
    }

    #[test]
    fn test_format_empty_fence_falls_back_to_prose() {
        let segments = format_response_segments("a ```css\n``` b");

        assert_eq!(
            segments,
            vec![
                ResponseSegment::Prose("a ".to_string()),
                ResponseSegment::Prose("css\n".to_string()),
                ResponseSegment::Prose(" b".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_image_encodes_body() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"fakepng".to_vec())
                    .insert_header("content-type", "image/png"),
            )
            .mount(&server)
            .await;

        let image = fetch_image(&server.uri()).await.unwrap();

        match image {
            ImageSource::Base64 { media_type, data } => {
                assert_eq!(media_type, "image/png");
                assert_eq!(data, base64::engine::general_purpose::STANDARD.encode(b"fakepng"));
            }
            other => panic!("expected base64 source, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_image_failure_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_image(&server.uri()).await.unwrap_err();
        assert!(matches!(err, SitecraftError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_scrape_url_strips_markup() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><h1>Title</h1><p>Some  content.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let text = scrape_url(&server.uri()).await.unwrap();
        assert_eq!(text, "Title Some content.");
    }
}
