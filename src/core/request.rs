//! Transport-independent view of an incoming request.

use percent_encoding::percent_decode_str;

use super::method::HttpMethod;

/// What handlers and data scripts see of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: Option<HttpMethod>,
    /// Raw request target (`/users/7?tab=posts`).
    pub url: String,
    /// Decoded path without query (`/users/7`).
    pub path: String,
    /// Route parameters captured by the matcher.
    pub params: Vec<(String, String)>,
    /// Decoded query pairs, in order.
    pub query: Vec<(String, String)>,
    pub body: String,
}

impl RequestInfo {
    /// Split a raw request target into decoded path and query pairs.
    pub fn from_target(method: Option<HttpMethod>, target: &str) -> Self {
        let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
        let raw_path = raw_path.split('#').next().unwrap_or(raw_path);

        let path = percent_decode_str(raw_path)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw_path.to_string());

        let query = url::form_urlencoded::parse(raw_query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Self {
            method,
            url: target.to_string(),
            path,
            params: Vec::new(),
            query,
            body: String::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = body;
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        lookup(&self.params, name)
    }

    /// First value for a query key.
    pub fn query(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_target_splits_query() {
        let req = RequestInfo::from_target(Some(HttpMethod::Get), "/users/7?tab=posts&x=1");
        assert_eq!(req.path, "/users/7");
        assert_eq!(req.query("tab"), Some("posts"));
        assert_eq!(req.query("x"), Some("1"));
        assert_eq!(req.query("missing"), None);
    }

    #[test]
    fn test_from_target_decodes() {
        let req = RequestInfo::from_target(None, "/caf%C3%A9?q=a%20b");
        assert_eq!(req.path, "/café");
        assert_eq!(req.query("q"), Some("a b"));
    }

    #[test]
    fn test_params() {
        let req = RequestInfo::from_target(None, "/u/1")
            .with_params(vec![("id".into(), "1".into())]);
        assert_eq!(req.param("id"), Some("1"));
    }
}
