use reqwest::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefererDecision {
    Allowed,
    Missing,
    Denied,
}

/// Anti-hotlinking allow-list keyed on the `Referer` header.
///
/// Not an authentication mechanism: the header is supplied by the client.
#[derive(Debug, Clone, Default)]
pub struct RefererPolicy {
    domains: Vec<String>,
}

impl RefererPolicy {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn check(&self, referer: Option<&str>) -> RefererDecision {
        let referer = match referer {
            Some(r) if !r.is_empty() => r,
            _ => return RefererDecision::Missing,
        };

        let host = match Url::parse(referer).ok().and_then(|u| u.host_str().map(str::to_ascii_lowercase)) {
            Some(h) => h,
            None => return RefererDecision::Denied,
        };

        let allowed = self
            .domains
            .iter()
            .any(|d| host == *d || host.strip_suffix(d.as_str()).is_some_and(|rest| rest.ends_with('.')));

        if allowed { RefererDecision::Allowed } else { RefererDecision::Denied }
    }
}
