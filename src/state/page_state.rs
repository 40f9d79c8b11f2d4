/// Page outcome definitions
///
/// Every URL taken off the frontier ends in exactly one of these states.
use std::fmt;

/// Broad class of a per-page failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Timeout, connection refused/reset, DNS failure
    Transport,

    /// Non-2xx HTTP status
    Protocol,

    /// Response was not HTML, or no content could be extracted
    Content,

    /// A redirect led somewhere the crawl must not (re)visit
    Redirect,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Protocol => "protocol",
            Self::Content => "content",
            Self::Redirect => "redirect",
        }
    }
}

/// Why a page could not be turned into markdown
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The fetch did not finish within the per-request timeout
    Timeout,

    /// Connection could not be established or was dropped
    Connection(String),

    /// Server answered with a non-success status code
    HttpStatus(u16),

    /// Content-Type was not HTML
    NotHtml(String),

    /// The page had no extractable content
    EmptyContent,

    /// The page redirected to a URL outside the crawl scope
    RedirectOutOfScope(String),

    /// The page redirected to a URL that is already part of this crawl
    RedirectToVisited(String),

    /// Anything else
    Other(String),
}

impl FailureReason {
    /// Returns the broad class of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout | Self::Connection(_) | Self::Other(_) => FailureKind::Transport,
            Self::HttpStatus(_) => FailureKind::Protocol,
            Self::NotHtml(_) | Self::EmptyContent => FailureKind::Content,
            Self::RedirectOutOfScope(_) | Self::RedirectToVisited(_) => FailureKind::Redirect,
        }
    }

    /// Returns true for failures that might succeed on another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::HttpStatus(code) => *code >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Connection(e) => write!(f, "connection error: {}", e),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::NotHtml(ct) => write!(f, "not HTML (content-type: {})", ct),
            Self::EmptyContent => write!(f, "no content extracted"),
            Self::RedirectOutOfScope(to) => write!(f, "redirected out of scope to {}", to),
            Self::RedirectToVisited(to) => write!(f, "redirected to already crawled {}", to),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

/// Final status of a crawled page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Page was fetched and converted to markdown
    Success,

    /// Page was attempted but produced no usable content
    Failed(FailureReason),
}

impl PageStatus {
    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure reason, if any
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Success => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
