use crate::config::RenderConfig;
use crate::decorate::{Decorator, PlainDecorator, Role};
use crate::format::{format_content, format_post_body, indent};
use crate::har::{Cookie, Entry, Header, Timings};

const SECTION_INDENT: usize = 2;
const ITEM_INDENT: usize = 4;
const TIMING_LABEL_WIDTH: usize = 7;

/// Turns entries into report blocks.
///
/// Sections always appear in the same order: title, request headers, request
/// cookies, request body, response headers, response cookies, response body,
/// timings. The config only decides which of them are present.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    decorator: Box<dyn Decorator>,
}

impl Renderer {
    pub fn new(config: RenderConfig, decorator: Box<dyn Decorator>) -> Self {
        Self { config, decorator }
    }

    pub fn plain(config: RenderConfig) -> Self {
        Self::new(config, Box::new(PlainDecorator))
    }

    pub fn render(&self, entry: &Entry) -> String {
        let request = &entry.request;
        let response = &entry.response;
        let mut sections = vec![self.title(entry)];

        if self.config.headers {
            sections.push(self.headers("Request Headers", &request.headers));
        }
        if self.config.cookies && !request.cookies.is_empty() {
            sections.push(self.cookies("Request Cookies", &request.cookies));
        }
        if self.config.request_body {
            if let Some(post) = &request.post_data {
                let body = if request.body_size == 0 {
                    self.no_content()
                } else {
                    format_post_body(post, self.decorator.as_ref())
                };
                sections.push(self.section("Request Body", &[body]));
            }
        }

        if self.config.headers {
            sections.push(self.headers("Response Headers", &response.headers));
        }
        if self.config.cookies && !response.cookies.is_empty() {
            sections.push(self.cookies("Response Cookies", &response.cookies));
        }
        if self.config.response_body {
            if let Some(content) = &response.content {
                let body = if content.size == 0 {
                    self.no_content()
                } else {
                    format_content(content, self.decorator.as_ref())
                };
                sections.push(self.section("Response Body", &[body]));
            }
        }

        if self.config.timings {
            sections.push(self.timings(&entry.timings));
        }

        sections.join("\n")
    }

    fn title(&self, entry: &Entry) -> String {
        let request = &entry.request;
        let version = request.http_version.to_lowercase();
        let lead = if version.is_empty() {
            request.method.clone()
        } else {
            format!("{version} {}", request.method)
        };

        format!("{} {}", self.decorator.paint(Role::Heading, &lead), request.url)
    }

    fn section(&self, label: &str, items: &[String]) -> String {
        let mut output = indent(
            &self.decorator.paint(Role::Heading, &format!("{label}:")),
            SECTION_INDENT,
        );
        for item in items {
            output.push('\n');
            output.push_str(&indent(item, ITEM_INDENT));
        }
        output
    }

    fn pair(&self, name: &str, value: &str, comment: Option<&str>) -> String {
        let mut line = format!(
            "{} = {}",
            self.decorator.paint(Role::Label, name),
            self.decorator.value(value)
        );
        if let Some(comment) = comment {
            line.push_str(&format!(" ({comment})"));
        }
        line
    }

    /// Cookie headers are left to the cookie section, which reads the
    /// structured cookie list.
    fn headers(&self, label: &str, headers: &[Header]) -> String {
        let items: Vec<String> = headers
            .iter()
            .filter(|header| !header.name.eq_ignore_ascii_case("cookie"))
            .map(|header| self.pair(&header.name, &header.value, header.comment.as_deref()))
            .collect();
        self.section(label, &items)
    }

    fn cookies(&self, label: &str, cookies: &[Cookie]) -> String {
        let items: Vec<String> = cookies
            .iter()
            .map(|cookie| self.pair(&cookie.name, &cookie.value, cookie.comment.as_deref()))
            .collect();
        self.section(label, &items)
    }

    fn no_content(&self) -> String {
        self.decorator.paint(Role::Marker, "[no content]")
    }

    fn timing(&self, label: &str, value: String) -> String {
        let label = format!("{label:>width$}: ", width = TIMING_LABEL_WIDTH);
        self.decorator.paint(Role::Label, &label) + &self.decorator.value(&value)
    }

    fn timings(&self, timings: &Timings) -> String {
        let mut items = Vec::new();

        if let Some(dns) = Timings::measured(timings.dns) {
            items.push(self.timing("DNS", dns.to_string()));
        }
        if let Some(connect) = Timings::measured(timings.connect) {
            items.push(self.timing("Connect", connect.to_string()));
        }
        items.push(self.timing("Send", timings.send.to_string()));
        items.push(self.timing("Wait", timings.wait.to_string()));
        items.push(self.timing("Receive", timings.receive.to_string()));
        if let Some(ssl) = Timings::measured(timings.ssl) {
            items.push(self.timing("SSL", ssl.to_string()));
        }
        if let Some(comment) = &timings.comment {
            let label = format!("{:>width$}: ", "Comment", width = TIMING_LABEL_WIDTH);
            items.push(self.decorator.paint(Role::Label, &label) + comment);
        }

        self.section("Timings", &items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: serde_json::Value) -> Entry {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_title_only_by_default() {
        let e = entry(serde_json::json!({
            "request": {"method": "GET", "url": "https://a.test/x", "httpVersion": "HTTP/1.1"},
            "response": {"status": 200}
        }));
        assert_eq!(
            Renderer::plain(RenderConfig::new()).render(&e),
            "http/1.1 GET https://a.test/x"
        );
    }

    #[test]
    fn test_title_without_version() {
        let e = entry(serde_json::json!({
            "request": {"method": "POST", "url": "https://a.test/"},
            "response": {"status": 200}
        }));
        assert_eq!(
            Renderer::plain(RenderConfig::new()).render(&e),
            "POST https://a.test/"
        );
    }

    #[test]
    fn test_timings_skip_unmeasured_phases() {
        let e = entry(serde_json::json!({
            "request": {"method": "GET", "url": "https://a.test/", "httpVersion": "HTTP/2"},
            "response": {"status": 200},
            "timings": {"dns": -1, "connect": 4, "send": 1, "wait": 20.5, "receive": 3, "comment": "warm"}
        }));
        let output = Renderer::plain(RenderConfig::new().with_timings(true)).render(&e);
        assert_eq!(
            output,
            "http/2 GET https://a.test/\n  Timings:\n    Connect: 4\n       Send: 1\n       Wait: 20.5\n    Receive: 3\n    Comment: warm"
        );
    }

    #[test]
    fn test_content_without_size_still_shows_text() {
        let e = entry(serde_json::json!({
            "request": {"method": "GET", "url": "https://a.test/"},
            "response": {"status": 200, "content": {"mimeType": "text/plain", "text": "hello"}}
        }));
        let output = Renderer::plain(RenderConfig::new().with_response_body(true)).render(&e);
        assert_eq!(output, "GET https://a.test/\n  Response Body:\n    hello");
    }
}
