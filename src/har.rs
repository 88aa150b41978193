use crate::error::HarvError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Size reported by HAR producers when they could not measure it.
pub const UNKNOWN_SIZE: i64 = -1;

fn unknown_size() -> i64 {
    UNKNOWN_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Har {
    pub log: Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default)]
    pub version: String,
    pub creator: Creator,
    #[serde(default)]
    pub browser: Option<Creator>,
    #[serde(default)]
    pub pages: Option<Vec<Page>>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Shared by `log.creator` and `log.browser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub started_date_time: String,
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub page_timings: Option<PageTimings>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTimings {
    #[serde(default)]
    pub on_content_load: Option<f64>,
    #[serde(default)]
    pub on_load: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, rename = "pageref")]
    pub page_ref: Option<String>,
    #[serde(default)]
    pub started_date_time: String,
    #[serde(default)]
    pub time: f64,
    pub request: Request,
    pub response: Response,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub timings: Timings,
    #[serde(default, rename = "serverIPAddress")]
    pub server_ip_address: Option<String>,
    #[serde(default)]
    pub connection: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub query_string: Vec<QueryParameter>,
    #[serde(default)]
    pub post_data: Option<PostData>,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: i32,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub http_version: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: Option<String>,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub http_only: Option<bool>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryParameter {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub params: Vec<PostParameter>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostParameter {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default = "unknown_size")]
    pub size: i64,
    #[serde(default)]
    pub compression: Option<i64>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cache {
    #[serde(default)]
    pub before_request: Option<CacheState>,
    #[serde(default)]
    pub after_request: Option<CacheState>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheState {
    #[serde(default)]
    pub expires: Option<String>,
    #[serde(default)]
    pub last_access: String,
    #[serde(default, rename = "eTag")]
    pub etag: String,
    #[serde(default)]
    pub hit_count: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Phase durations in milliseconds.
///
/// The optional phases follow the HAR convention: a missing or negative value
/// means the phase does not apply to this entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default)]
    pub blocked: Option<f64>,
    #[serde(default)]
    pub dns: Option<f64>,
    #[serde(default)]
    pub connect: Option<f64>,
    #[serde(default)]
    pub send: f64,
    #[serde(default)]
    pub wait: f64,
    #[serde(default)]
    pub receive: f64,
    #[serde(default)]
    pub ssl: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Timings {
    /// Returns the phase duration only when it was actually measured.
    pub fn measured(phase: Option<f64>) -> Option<f64> {
        phase.filter(|value| *value >= 0.0)
    }
}

impl Har {
    pub fn from_json_str(content: &str) -> Result<Self, HarvError> {
        let har: Har = serde_json::from_str(content).map_err(HarvError::Decode)?;
        log::debug!(
            "Decoded HAR {} from {} {} with {} entries",
            har.log.version,
            har.log.creator.name,
            har.log.creator.version,
            har.log.entries.len()
        );
        Ok(har)
    }

    pub fn load_from_file<P: Into<PathBuf>>(path: P) -> Result<Self, HarvError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| HarvError::Io {
            path: path.clone(),
            source,
        })?;

        Self::from_json_str(&content)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.log.entries
    }

    pub fn len(&self) -> usize {
        self.log.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_fills_defaults() {
        let har = Har::from_json_str(
            r#"{"log":{"version":"1.2","creator":{"name":"t","version":"1"},"entries":[
                {"request":{"method":"GET","url":"https://a.test/"},
                 "response":{"status":200}}
            ]}}"#,
        )
        .unwrap();

        assert_eq!(har.len(), 1);
        let entry = &har.entries()[0];
        assert_eq!(entry.request.body_size, UNKNOWN_SIZE);
        assert!(entry.request.headers.is_empty());
        assert!(entry.request.post_data.is_none());
        assert!(entry.response.content.is_none());
        assert!(entry.server_ip_address.is_none());
    }

    #[test]
    fn test_renamed_fields_are_decoded() {
        let har = Har::from_json_str(
            r#"{"log":{"version":"1.2","creator":{"name":"t","version":"1"},"entries":[
                {"pageref":"page_1","serverIPAddress":"10.0.0.1",
                 "request":{"method":"GET","url":"https://a.test/","httpVersion":"HTTP/2"},
                 "response":{"status":301,"redirectURL":"https://b.test/"},
                 "timings":{"send":1,"wait":2.5,"receive":3,"dns":-1}}
            ]}}"#,
        )
        .unwrap();

        let entry = &har.entries()[0];
        assert_eq!(entry.page_ref.as_deref(), Some("page_1"));
        assert_eq!(entry.server_ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(entry.response.redirect_url.as_deref(), Some("https://b.test/"));
        assert_eq!(entry.timings.wait, 2.5);
        assert_eq!(Timings::measured(entry.timings.dns), None);
        assert_eq!(Timings::measured(entry.timings.connect), None);
    }

    #[test]
    fn test_negative_status_and_missing_content_size() {
        let har = Har::from_json_str(
            r#"{"log":{"version":"1.2","creator":{"name":"t","version":"1"},"entries":[
                {"request":{"method":"GET","url":"https://a.test/"},
                 "response":{"status":-1,"content":{"mimeType":"text/plain","text":"hello"}}}
            ]}}"#,
        )
        .unwrap();

        let response = &har.entries()[0].response;
        assert_eq!(response.status, -1);
        assert_eq!(response.content.as_ref().map(|c| c.size), Some(UNKNOWN_SIZE));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(matches!(
            Har::from_json_str(r#"{"log": "#),
            Err(HarvError::Decode(_))
        ));
    }
}
