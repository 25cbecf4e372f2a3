//! Rendered output chunks

use std::fmt::{self, Display};

/// Ordered sequence of string chunks produced by a view
///
/// Flattening concatenates the chunks in order; nothing is escaped or
/// trimmed on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunks(Vec<String>);

impl Chunks {
    /// Empty chunk sequence
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one chunk
    pub fn push(&mut self, chunk: impl Into<String>) {
        self.0.push(chunk.into());
    }

    /// Number of chunks
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no chunk has been produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenate every chunk into one HTML string
    #[must_use]
    pub fn into_html(self) -> String {
        let capacity = self.0.iter().map(String::len).sum();
        self.0
            .into_iter()
            .fold(String::with_capacity(capacity), |mut html, chunk| {
                html.push_str(&chunk);
                html
            })
    }
}

impl<S: Into<String>> FromIterator<S> for Chunks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<String> for Chunks {
    fn from(html: String) -> Self {
        Self(vec![html])
    }
}

impl From<&str> for Chunks {
    fn from(html: &str) -> Self {
        Self(vec![html.to_string()])
    }
}

impl IntoIterator for Chunks {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Display for Chunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|chunk| f.write_str(chunk))
    }
}

/// Build [`Chunks`] from any `Display` values
///
/// ```rust
/// use acton_views::chunks;
///
/// let name = "world";
/// let chunks = chunks!["<h1>", name, "</h1>"];
/// assert_eq!(chunks.into_html(), "<h1>world</h1>");
/// ```
#[macro_export]
macro_rules! chunks {
    () => {
        $crate::view::Chunks::new()
    };
    ($($chunk:expr),+ $(,)?) => {
        <$crate::view::Chunks as ::std::iter::FromIterator<String>>::from_iter([
            $(::std::string::ToString::to_string(&$chunk)),+
        ])
    };
}

/// Interleave literal parts with interpolated values
///
/// `parts[i]` is followed by `values[i]`; a missing value contributes an
/// empty string. Line breaks in parts and values are kept as written.
///
/// ```rust
/// use acton_views::view::html;
///
/// let page = html(&["<p>", "</p>"], &[&"hi"]);
/// assert_eq!(page, "<p>hi</p>");
/// ```
#[must_use]
pub fn html(parts: &[&str], values: &[&dyn Display]) -> String {
    parts
        .iter()
        .enumerate()
        .fold(String::new(), |mut out, (i, part)| {
            out.push_str(part);
            if let Some(value) = values.get(i) {
                out.push_str(&value.to_string());
            }
            out
        })
}
