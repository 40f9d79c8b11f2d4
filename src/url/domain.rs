use url::Url;

/// Second-level labels that act as public suffixes under a country code
/// (`example.co.uk` is a registrable domain, `co.uk` is not)
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "ac", "co", "com", "edu", "gov", "net", "org", "ne", "or", "go", "gob", "nic", "mil",
];

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use web_context_builder::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Strips a leading `www.` so that `www.example.com` and `example.com` compare equal
pub fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Returns the registrable domain ("site") for a host
///
/// IP addresses and single-label hosts are their own site. Otherwise the last
/// two labels are used, or the last three when the second-to-last label is a
/// common second-level suffix under a two-letter country code (`co.uk`,
/// `com.au`, ...). This is a heuristic, not a full public suffix list lookup.
///
/// # Examples
///
/// ```
/// use web_context_builder::url::registered_domain;
///
/// assert_eq!(registered_domain("docs.example.com"), "example.com");
/// assert_eq!(registered_domain("blog.example.co.uk"), "example.co.uk");
/// assert_eq!(registered_domain("127.0.0.1"), "127.0.0.1");
/// ```
pub fn registered_domain(host: &str) -> String {
    let host = host.trim_end_matches('.').to_lowercase();

    if host.starts_with('[') || host.parse::<std::net::Ipv4Addr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let n = labels.len();
    let tld = labels[n - 1];
    let second = labels[n - 2];
    let keep = if tld.len() == 2 && MULTI_LABEL_SUFFIXES.contains(&second) {
        3
    } else {
        2
    };

    labels[n - keep.min(n)..].join(".")
}

/// Checks whether two hosts belong to the same registrable domain
pub fn same_site(a: &str, b: &str) -> bool {
    registered_domain(a) == registered_domain(b)
}
