//! Built-in social platforms.

use url::Url;

use super::{bare_host, Platform};

/// How a platform encodes the account handle in its URL path.
#[derive(Debug, Clone, Copy)]
pub enum HandleRule {
    /// First path segment is the handle, unless it is a reserved word.
    /// A leading `@` is removed.
    FirstSegment { reserved: &'static [&'static str] },
    /// First path segment must start with `@`; the rest is the handle.
    AtSegment,
    /// Handle follows one of the given prefix segments
    /// (`/in/<handle>`, `/company/<handle>`).
    Prefixed(&'static [&'static str]),
    /// YouTube: `/@handle`, or `/channel|c|user/<handle>`.
    YouTube,
    /// Facebook: `profile.php?id=<id>`, `/pages/<name>/<id>`, or `/<handle>`.
    Facebook,
}

/// A platform described by its hosts and a [`HandleRule`].
#[derive(Debug, Clone)]
pub struct SocialPlatform {
    name: &'static str,
    hosts: &'static [&'static str],
    rule: HandleRule,
}

impl SocialPlatform {
    pub const fn new(name: &'static str, hosts: &'static [&'static str], rule: HandleRule) -> Self {
        Self { name, hosts, rule }
    }
}

impl Platform for SocialPlatform {
    fn name(&self) -> &str {
        self.name
    }

    fn owns(&self, url: &Url) -> bool {
        bare_host(url).is_some_and(|host| self.hosts.contains(&host.as_str()))
    }

    fn canonicalize(&self, url: &Url) -> Option<String> {
        if !self.owns(url) {
            return None;
        }
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let handle = match self.rule {
            HandleRule::FirstSegment { reserved } => {
                let first = *segments.first()?;
                let first = first.strip_prefix('@').unwrap_or(first);
                if reserved.iter().any(|r| r.eq_ignore_ascii_case(first)) {
                    return None;
                }
                first.to_string()
            }
            HandleRule::AtSegment => segments.first()?.strip_prefix('@')?.to_string(),
            HandleRule::Prefixed(prefixes) => {
                let (first, second) = (segments.first()?, segments.get(1)?);
                if !prefixes.iter().any(|p| p.eq_ignore_ascii_case(first)) {
                    return None;
                }
                second.to_string()
            }
            HandleRule::YouTube => match segments.as_slice() {
                [first, ..] if first.starts_with('@') => first[1..].to_string(),
                [kind, handle, ..] if matches!(*kind, "channel" | "c" | "user") => {
                    handle.to_string()
                }
                _ => return None,
            },
            HandleRule::Facebook => match segments.as_slice() {
                ["profile.php"] => url
                    .query_pairs()
                    .find(|(k, _)| k == "id")
                    .map(|(_, v)| v.into_owned())?,
                ["pages", _, id, ..] => id.to_string(),
                [first, ..] if !FACEBOOK_RESERVED.contains(first) => first.to_string(),
                _ => return None,
            },
        };

        (!handle.is_empty()).then_some(handle)
    }
}

const TWITTER_RESERVED: &[&str] = &[
    "home", "i", "intent", "share", "search", "hashtag", "explore", "settings", "messages",
    "notifications",
];

const INSTAGRAM_RESERVED: &[&str] = &["p", "reel", "reels", "explore", "stories", "accounts"];

const GITHUB_RESERVED: &[&str] = &[
    "orgs", "settings", "marketplace", "explore", "topics", "sponsors", "login",
];

const FACEBOOK_RESERVED: &[&str] = &["groups", "events", "watch", "sharer.php", "login"];

/// Platforms every registry starts with.
pub fn builtin_platforms() -> Vec<SocialPlatform> {
    vec![
        SocialPlatform::new(
            "Twitter",
            &["twitter.com", "x.com"],
            HandleRule::FirstSegment {
                reserved: TWITTER_RESERVED,
            },
        ),
        SocialPlatform::new("Facebook", &["facebook.com", "fb.com"], HandleRule::Facebook),
        SocialPlatform::new(
            "Instagram",
            &["instagram.com"],
            HandleRule::FirstSegment {
                reserved: INSTAGRAM_RESERVED,
            },
        ),
        SocialPlatform::new("YouTube", &["youtube.com"], HandleRule::YouTube),
        SocialPlatform::new(
            "LinkedIn",
            &["linkedin.com"],
            HandleRule::Prefixed(&["in", "company", "school"]),
        ),
        SocialPlatform::new("TikTok", &["tiktok.com"], HandleRule::AtSegment),
        SocialPlatform::new(
            "GitHub",
            &["github.com"],
            HandleRule::FirstSegment {
                reserved: GITHUB_RESERVED,
            },
        ),
    ]
}
