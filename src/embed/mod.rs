//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Served documents (page.html, error.html, dev-socket.js)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{DEV_SOCKET_JS, DevSocketVars};
//!
//! let js = DEV_SOCKET_JS.render(&DevSocketVars {
//!     socket_path: "\"/.well-known/dev\"",
//!     ping_path: "\"/.well-known/ping\"",
//!     route: "\"/blog\"",
//! });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for page.html.
    pub struct PageVars<'a> {
        pub title: &'a str,
        pub style: &'a str,
        pub markup: &'a str,
        pub hydration_script: &'a str,
        pub class_name: &'a str,
        /// Serialized page data, already safe inside `<script>`.
        pub data_json: &'a str,
        /// Rendered dev socket client, empty in production.
        pub dev_script: &'a str,
    }

    impl TemplateVars for PageVars<'_> {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![
                ("KETTLE_TITLE", self.title),
                ("KETTLE_STYLE", self.style),
                ("KETTLE_MARKUP", self.markup),
                ("KETTLE_HYDRATION", self.hydration_script),
                ("KETTLE_CLASS", self.class_name),
                ("KETTLE_DATA", self.data_json),
                ("KETTLE_DEV", self.dev_script),
            ]
        }
    }

    /// Page document shell.
    pub const PAGE_HTML: Template<PageVars<'static>> = Template::new(include_str!("serve/page.html"));

    /// Variables for error.html.
    pub struct ErrorVars<'a> {
        pub status: &'a str,
        pub message: &'a str,
        /// Pre-rendered `<pre>` block, or empty.
        pub stack: &'a str,
    }

    impl TemplateVars for ErrorVars<'_> {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![
                ("KETTLE_STATUS", self.status),
                ("KETTLE_MESSAGE", self.message),
                ("KETTLE_STACK", self.stack),
            ]
        }
    }

    /// Error document.
    pub const ERROR_HTML: Template<ErrorVars<'static>> =
        Template::new(include_str!("serve/error.html"));

    /// Variables for dev-socket.js. All values are JSON string literals.
    pub struct DevSocketVars<'a> {
        pub socket_path: &'a str,
        pub ping_path: &'a str,
        pub route: &'a str,
    }

    impl TemplateVars for DevSocketVars<'_> {
        fn pairs(&self) -> Vec<(&'static str, &str)> {
            vec![
                ("KETTLE_SOCKET_PATH", self.socket_path),
                ("KETTLE_PING_PATH", self.ping_path),
                ("KETTLE_ROUTE", self.route),
            ]
        }
    }

    /// Browser side of the development socket.
    pub const DEV_SOCKET_JS: Template<DevSocketVars<'static>> =
        Template::new(include_str!("serve/dev-socket.js"));
}
