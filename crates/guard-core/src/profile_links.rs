/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Root-level paths that appear in profile menus but never name an account.
pub const RESERVED_SEGMENTS: [&str; 3] = ["settings", "logout", "new"];

/// Which profile-menu control a link list was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuShape {
    /// Links under the avatar disclosure control; `/<name>` and `/<name>/...` qualify.
    AvatarDisclosure,
    /// Links of a standalone dropdown menu; only exact `/<name>` links qualify.
    DetailsMenu,
}

/// The account segment of a root-relative profile link, if it names one.
pub fn profile_segment(href: &str, shape: MenuShape) -> Option<&str> {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let rest = path.strip_prefix('/')?;
    if rest.starts_with('/') {
        // protocol-relative, not a site path
        return None;
    }

    let (segment, tail) = match rest.split_once('/') {
        Some((segment, tail)) => (segment, Some(tail)),
        None => (rest, None),
    };
    if segment.is_empty() || RESERVED_SEGMENTS.contains(&segment) {
        return None;
    }
    if shape == MenuShape::DetailsMenu && tail.is_some() {
        return None;
    }
    Some(segment)
}

/// First qualifying account segment across `hrefs`, in order.
pub fn first_profile_segment<'a, I>(hrefs: I, shape: MenuShape) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    hrefs
        .into_iter()
        .find_map(|href| profile_segment(href, shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/octocat", MenuShape::AvatarDisclosure, Some("octocat"))]
    #[case("/octocat?tab=repositories", MenuShape::AvatarDisclosure, Some("octocat"))]
    #[case("/octocat/stars", MenuShape::AvatarDisclosure, Some("octocat"))]
    #[case("/octocat/stars", MenuShape::DetailsMenu, None)]
    #[case("/octocat", MenuShape::DetailsMenu, Some("octocat"))]
    #[case("/octocat#top", MenuShape::DetailsMenu, Some("octocat"))]
    #[case("/settings/profile", MenuShape::AvatarDisclosure, None)]
    #[case("/logout", MenuShape::DetailsMenu, None)]
    #[case("/new", MenuShape::DetailsMenu, None)]
    #[case("//cdn.example/octocat", MenuShape::AvatarDisclosure, None)]
    #[case("https://host/octocat", MenuShape::AvatarDisclosure, None)]
    #[case("/", MenuShape::AvatarDisclosure, None)]
    fn extracts_account_segment(
        #[case] href: &str,
        #[case] shape: MenuShape,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(profile_segment(href, shape), expected, "{href}");
    }

    #[test]
    fn skips_reserved_links_until_an_account_appears() {
        let hrefs = ["/settings", "/new", "/logout", "/hubot", "/octocat"];
        assert_eq!(
            first_profile_segment(hrefs, MenuShape::DetailsMenu),
            Some("hubot")
        );
    }

    #[test]
    fn empty_link_lists_yield_nothing() {
        assert_eq!(first_profile_segment(std::iter::empty::<&str>(), MenuShape::AvatarDisclosure), None);
    }
}
