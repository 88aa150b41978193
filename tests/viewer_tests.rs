use harv::{FilterConfig, Har, HarViewer, HarvError, RenderConfig, ViewConfig};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn document() -> String {
    json!({
        "log": {
            "version": "1.2",
            "creator": {"name": "viewer-tests", "version": "1"},
            "browser": {"name": "Firefox", "version": "120"},
            "pages": [{
                "startedDateTime": "2024-01-01T00:00:00Z",
                "id": "page_1",
                "title": "Home",
                "pageTimings": {"onContentLoad": 120, "onLoad": 300}
            }],
            "entries": [
                {
                    "pageref": "page_1",
                    "startedDateTime": "2024-01-01T00:00:00Z",
                    "time": 12,
                    "request": {
                        "method": "GET",
                        "url": "https://shop.example.com/api/cart",
                        "httpVersion": "HTTP/2",
                        "headers": [],
                        "cookies": [],
                        "queryString": [],
                        "headersSize": -1,
                        "bodySize": 0
                    },
                    "response": {
                        "status": 200,
                        "statusText": "OK",
                        "httpVersion": "HTTP/2",
                        "headers": [],
                        "cookies": [],
                        "content": {"size": 13, "mimeType": "text/plain", "text": "{\"items\":[]}"},
                        "redirectURL": "",
                        "headersSize": -1,
                        "bodySize": 13
                    },
                    "cache": {},
                    "timings": {"send": 1, "wait": 10, "receive": 1}
                },
                {
                    "startedDateTime": "2024-01-01T00:00:01Z",
                    "time": 5,
                    "request": {
                        "method": "GET",
                        "url": "not-a-url",
                        "httpVersion": "HTTP/2",
                        "headersSize": -1,
                        "bodySize": 0
                    },
                    "response": {"status": 200, "bodySize": 0},
                    "cache": {},
                    "timings": {"send": 0, "wait": 0, "receive": 0}
                },
                {
                    "startedDateTime": "2024-01-01T00:00:02Z",
                    "time": 7,
                    "request": {
                        "method": "HEAD",
                        "url": "https://static.example.com/logo.svg",
                        "httpVersion": "HTTP/1.1",
                        "headersSize": -1,
                        "bodySize": 0
                    },
                    "response": {"status": 404, "bodySize": 0},
                    "cache": {},
                    "timings": {"send": 0, "wait": 3, "receive": 0}
                }
            ]
        }
    })
    .to_string()
}

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = write_temp(&document());
    let har = Har::load_from_file(file.path()).unwrap();

    assert_eq!(har.len(), 3);
    assert_eq!(har.log.creator.name, "viewer-tests");
    assert_eq!(har.log.browser.as_ref().map(|b| b.name.as_str()), Some("Firefox"));
    let pages = har.log.pages.as_ref().unwrap();
    assert_eq!(pages[0].id, "page_1");
    assert_eq!(
        pages[0].page_timings.as_ref().and_then(|t| t.on_load),
        Some(300.0)
    );
}

#[test]
fn test_missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = Har::load_from_file(dir.path().join("missing.har"));
    assert!(matches!(result, Err(HarvError::Io { .. })));
}

#[test]
fn test_undecodable_document_is_fatal() {
    let file = write_temp(r#"{"log": {"entries": "nope"}}"#);
    assert!(matches!(
        Har::load_from_file(file.path()),
        Err(HarvError::Decode(_))
    ));
}

#[test]
fn test_view_renders_matching_entries() {
    let har = Har::from_json_str(&document()).unwrap();
    let viewer = HarViewer::plain(ViewConfig::new(
        FilterConfig::new().successful(),
        RenderConfig::new().with_response_body(true),
    ))
    .unwrap();

    let blocks = viewer.view(har.entries());
    assert_eq!(
        blocks,
        vec![[
            "http/2 GET https://shop.example.com/api/cart",
            "  Response Body:",
            "    Mime Type: text/plain (inferred application/json)",
            "    Size: 13",
            "    {",
            "      \"items\": []",
            "    }",
        ]
        .join("\n")]
    );
}

#[test]
fn test_blocks_are_lazy_and_restartable() {
    let har = Har::from_json_str(&document()).unwrap();
    let viewer = HarViewer::plain(ViewConfig::default()).unwrap();

    let first: Vec<String> = viewer.blocks(har.entries()).collect();
    let second: Vec<String> = viewer.blocks(har.entries()).collect();
    assert_eq!(first, second);
    assert_eq!(first, viewer.view(har.entries()));
    assert_eq!(
        first,
        vec![
            "http/2 GET https://shop.example.com/api/cart",
            "http/1.1 HEAD https://static.example.com/logo.svg",
        ]
    );

    let mut blocks = viewer.blocks(har.entries());
    assert!(blocks.next().is_some());
}

#[test]
fn test_invalid_pattern_is_a_configuration_error() {
    let config = ViewConfig::new(
        FilterConfig::new().with_url_matches("(unclosed"),
        RenderConfig::new(),
    );
    assert!(matches!(
        HarViewer::plain(config),
        Err(HarvError::InvalidPattern(_))
    ));
}

#[test]
fn test_profile_merged_with_flags() {
    let profile = write_temp(
        "filter:\n  domain_contains: example\n  response_code: 200\nrender:\n  timings: true\n",
    );
    let flags = ViewConfig::new(
        FilterConfig::new().with_response_code(404),
        RenderConfig::new(),
    );

    let config = ViewConfig::load_profile(profile.path()).unwrap().merge(flags);
    assert_eq!(config.filter.domain_contains.as_deref(), Some("example"));
    assert_eq!(config.filter.response_code, Some(404));
    assert!(config.render.timings);

    let har = Har::from_json_str(&document()).unwrap();
    let blocks = HarViewer::plain(config).unwrap().view(har.entries());
    assert_eq!(
        blocks,
        vec![[
            "http/1.1 HEAD https://static.example.com/logo.svg",
            "  Timings:",
            "       Send: 0",
            "       Wait: 3",
            "    Receive: 0",
        ]
        .join("\n")]
    );
}

#[test]
fn test_malformed_profile_is_reported() {
    let profile = write_temp("filter: [not, a, map]\n");
    assert!(matches!(
        ViewConfig::load_profile(profile.path()),
        Err(HarvError::Profile { .. })
    ));
}
