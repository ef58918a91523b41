/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command-line surface.

use std::path::PathBuf;

use bpaf::Bpaf;
use guard_core::NotificationStyle;

use crate::services::identity::Credentials;

/// Warns when a sensitive account is signed in on pull-request pages.
#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, generate(cli_options))]
pub struct CliOptions {
    /// Preferences file [default: <config dir>/admin-guard/config.toml]
    #[bpaf(long("config"), argument("PATH"))]
    pub config: Option<PathBuf>,

    /// Log filter directives, e.g. `admin_guard=debug` [default: RUST_LOG]
    #[bpaf(long("log-filter"), argument("FILTER"))]
    pub log_filter: Option<String>,

    #[bpaf(external(lookup_options))]
    pub lookup: LookupOptions,

    #[bpaf(external(command))]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Bpaf)]
pub struct LookupOptions {
    /// Session cookie sent to the identity endpoints
    #[bpaf(long("cookie"), env("ADMIN_GUARD_COOKIE"), argument("COOKIE"))]
    pub cookie: Option<String>,

    /// Bearer token sent to the identity endpoints
    #[bpaf(long("token"), env("ADMIN_GUARD_TOKEN"), argument("TOKEN"))]
    pub token: Option<String>,

    /// Identity endpoint to try, in order; replaces the defaults when given
    #[bpaf(long("endpoint"), argument("URL"))]
    pub endpoints: Vec<String>,
}

impl LookupOptions {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            cookie: self.cookie.clone(),
            token: self.token.clone(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.cookie.is_some() || self.token.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Bpaf)]
pub enum Command {
    /// Evaluate a page snapshot once and print the outcome
    #[bpaf(command)]
    Check {
        /// Page snapshot (JSON)
        #[bpaf(long("page"), argument("SNAPSHOT"))]
        page: PathBuf,
    },

    /// Watch a page snapshot; navigations are read from stdin
    #[bpaf(command)]
    Watch {
        /// Page snapshot (JSON)
        #[bpaf(long("page"), argument("SNAPSHOT"))]
        page: PathBuf,
    },

    /// Show or edit preferences
    #[bpaf(command)]
    Config {
        #[bpaf(external(config_action))]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Bpaf)]
pub enum ConfigAction {
    /// Print the current preferences
    #[bpaf(command)]
    Show,

    /// Add a sensitive identity
    #[bpaf(command)]
    Add {
        #[bpaf(positional("NAME"))]
        name: String,
    },

    /// Remove a sensitive identity
    #[bpaf(command)]
    Remove {
        #[bpaf(positional("NAME"))]
        name: String,
    },

    /// Turn warnings on
    #[bpaf(command)]
    Enable,

    /// Turn warnings off
    #[bpaf(command)]
    Disable,

    /// Set the notification style: banner, modal or browser-notification
    #[bpaf(command)]
    Style {
        #[bpaf(positional("STYLE"))]
        style: NotificationStyle,
    },
}
