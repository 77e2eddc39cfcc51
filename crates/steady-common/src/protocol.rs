use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
    pub status: u16, // generic status code (e.g. 200)
}

/// Addressing scheme of a locator string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorKind {
    Css,
    XPath,
    Id,
    LinkText,
}

/// An opaque selector identifying a UI target.
///
/// Locators are parsed from plain strings:
/// - `xpath=//form/button`, or anything starting with `/` or `(`, is XPath
/// - `id=submit` matches the element id
/// - `link=Sign in` matches anchor text
/// - everything else is a CSS selector
///
/// A locator is never cached as a resolved element; drivers resolve it again
/// on every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    kind: LocatorKind,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Empty locator")]
pub struct EmptyLocator;

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Css,
            value: selector.into(),
        }
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::XPath,
            value: expr.into(),
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Id,
            value: id.into(),
        }
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::LinkText,
            value: text.into(),
        }
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    /// The selector without its scheme prefix.
    pub fn value(&self) -> &str {
        &self.value
    }

    fn has_scheme(s: &str) -> bool {
        ["xpath=", "id=", "link=", "css=", "/", "("]
            .iter()
            .any(|prefix| s.starts_with(prefix))
    }
}

impl FromStr for Locator {
    type Err = EmptyLocator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyLocator);
        }

        let locator = if let Some(rest) = s.strip_prefix("xpath=") {
            Locator::xpath(rest)
        } else if let Some(rest) = s.strip_prefix("id=") {
            Locator::id(rest)
        } else if let Some(rest) = s.strip_prefix("link=") {
            Locator::link_text(rest)
        } else if let Some(rest) = s.strip_prefix("css=") {
            Locator::css(rest)
        } else if s.starts_with('/') || s.starts_with('(') {
            Locator::xpath(s)
        } else {
            Locator::css(s)
        };

        if locator.value.is_empty() {
            return Err(EmptyLocator);
        }
        Ok(locator)
    }
}

impl TryFrom<String> for Locator {
    type Error = EmptyLocator;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.to_string()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocatorKind::Css if Locator::has_scheme(&self.value) => write!(f, "css={}", self.value),
            LocatorKind::Css => write!(f, "{}", self.value),
            LocatorKind::XPath if self.value.starts_with('/') || self.value.starts_with('(') => {
                write!(f, "{}", self.value)
            }
            LocatorKind::XPath => write!(f, "xpath={}", self.value),
            LocatorKind::Id => write!(f, "id={}", self.value),
            LocatorKind::LinkText => write!(f, "link={}", self.value),
        }
    }
}

/// Predicate that must hold on a resolved element before acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// Resolving the locator is enough.
    Present,
    Visible,
    /// Visible, enabled and not covered by another element.
    Clickable,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Readiness::Present => "present",
            Readiness::Visible => "visible",
            Readiness::Clickable => "clickable",
        };
        f.write_str(name)
    }
}
