//! HTML rendering of reports.
//!
//! Renderers are pure: they take finished report data and return a complete
//! document as a `String`. All interpolated values are escaped.

mod html;

pub use html::{issues_html, sprint_html};
