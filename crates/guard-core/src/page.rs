/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::borrow::Cow;

use url::Url;

/// Path fragments of pull-request detail, comparison and pull-request listing pages.
const SENSITIVE_PATH_MARKERS: [&str; 3] = ["/pull/", "/compare/", "/pulls"];

/// Whether `location` points at a page where identity warnings apply.
///
/// Parsed URLs are matched on their path only, so query strings and
/// fragments never make a page sensitive. Anything that does not parse as an
/// absolute URL is matched as-is.
pub fn is_sensitive_page(location: &str) -> bool {
    let path: Cow<'_, str> = match Url::parse(location) {
        Ok(url) => Cow::Owned(url.path().to_owned()),
        Err(_) => Cow::Borrowed(location),
    };
    SENSITIVE_PATH_MARKERS
        .iter()
        .any(|marker| path.contains(marker))
}
