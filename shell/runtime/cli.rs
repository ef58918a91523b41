/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The bundled command-line host.
//!
//! Pages are JSON [`PageSnapshot`]s. `watch` drives the navigation watcher
//! from stdin, one command per line:
//!
//! ```text
//! push <url>      history push
//! replace <url>   history replace
//! pop <url>       back/forward to <url>
//! dom <url>       DOM mutation, location now <url>
//! dismiss         close the current warning
//! quit
//! ```
//!
//! End of input is treated as the page context going away.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use guard_core::{GuardConfig, PreferenceEditError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use super::evaluation::EvaluationLoop;
use super::watcher::{NavigationWatcher, WatcherTimings};
use crate::prefs::{CliOptions, Command, ConfigAction, LookupOptions, cli_options};
use crate::services::config_store::{ConfigError, ConfigStore, TomlConfigStore};
use crate::services::identity::{HttpIdentityClient, IdentityResolver, LookupError, ResolverSettings};
use crate::shell::host::history::{History, HistoryAdapter, NavigationHub};
use crate::shell::host::indicator::BadgeIndicator;
use crate::shell::host::liveness::ContextHandle;
use crate::shell::host::page::{PageSnapshot, StaticPage};
use crate::shell::host::presentation::{ChannelPresenter, DismissHandle, PresentationRequest};

pub fn main() {
    let options = cli_options().run();
    crate::init_logging(options.log_filter.as_deref());

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("admin-guard: {}", CliError::Runtime(e));
            std::process::exit(1);
        },
    };

    if let Err(e) = runtime.block_on(run(options)) {
        log::error!("{e}");
        eprintln!("admin-guard: {e}");
        std::process::exit(1);
    }
}

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Preference(PreferenceEditError),
    Lookup(LookupError),
    Snapshot { path: PathBuf, reason: String },
    Runtime(io::Error),
    Stdin(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Preference(e) => write!(f, "{e}"),
            Self::Lookup(e) => write!(f, "{e}"),
            Self::Snapshot { path, reason } => {
                write!(f, "cannot read page snapshot {}: {reason}", path.display())
            },
            Self::Runtime(e) => write!(f, "cannot start async runtime: {e}"),
            Self::Stdin(e) => write!(f, "cannot read commands: {e}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<PreferenceEditError> for CliError {
    fn from(e: PreferenceEditError) -> Self {
        Self::Preference(e)
    }
}

impl From<LookupError> for CliError {
    fn from(e: LookupError) -> Self {
        Self::Lookup(e)
    }
}

pub async fn run(options: CliOptions) -> Result<(), CliError> {
    let store = match options.config {
        Some(path) => TomlConfigStore::new(path),
        None => TomlConfigStore::at_default_path()?,
    };

    match options.command {
        Command::Check { page } => run_check(store, &options.lookup, &page).await,
        Command::Watch { page } => run_watch(store, &options.lookup, &page).await,
        Command::Config { action } => run_config(&store, action).await,
    }
}

async fn load_snapshot(path: &Path) -> Result<PageSnapshot, CliError> {
    let snapshot_error = |reason: String| CliError::Snapshot {
        path: path.to_path_buf(),
        reason,
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| snapshot_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| snapshot_error(e.to_string()))
}

/// One page context: its resolver, gate and user-facing surfaces.
struct Session {
    page: Arc<StaticPage>,
    evaluation: Arc<EvaluationLoop>,
    badge: Arc<BadgeIndicator>,
    requests: UnboundedReceiver<PresentationRequest>,
}

impl Session {
    async fn open(
        store: TomlConfigStore,
        lookup: &LookupOptions,
        snapshot_path: &Path,
    ) -> Result<Self, CliError> {
        store.ensure_defaults().await?;
        let page = Arc::new(StaticPage::new(load_snapshot(snapshot_path).await?));

        let mut settings = ResolverSettings::default();
        if !lookup.endpoints.is_empty() {
            settings.endpoints = lookup.endpoints.clone();
        } else if !lookup.has_credentials() {
            log::debug!("cli: no credentials given, skipping the authenticated endpoint lookup");
            settings.endpoints.clear();
        }
        let client = HttpIdentityClient::new(lookup.credentials(), settings.request_timeout)?;
        let resolver =
            IdentityResolver::with_default_strategies(page.clone(), Arc::new(client), &settings);

        let (presenter, requests) = ChannelPresenter::channel();
        let badge = Arc::new(BadgeIndicator::new());
        let evaluation = Arc::new(EvaluationLoop::new(
            page.clone(),
            Arc::new(store),
            Arc::new(resolver),
            Arc::new(presenter),
            badge.clone(),
        ));
        Ok(Self {
            page,
            evaluation,
            badge,
            requests,
        })
    }

    /// Print queued presentation requests, keeping the newest dismiss handle.
    fn render_pending(&mut self, dismiss: &mut Option<DismissHandle>) {
        while let Ok(request) = self.requests.try_recv() {
            render(request, dismiss);
        }
    }

    fn print_badge(&self) {
        let badge = self.badge.badge();
        if badge.is_raised() {
            println!("badge: {}", badge.text);
        } else {
            println!("badge: clear");
        }
    }
}

fn render(request: PresentationRequest, dismiss: &mut Option<DismissHandle>) {
    match request {
        PresentationRequest::Banner {
            message,
            dismiss: handle,
        } => {
            println!("[banner] {message}");
            *dismiss = Some(handle);
        },
        PresentationRequest::Modal {
            message,
            dismiss: handle,
        } => {
            println!("[modal] {message}");
            *dismiss = Some(handle);
        },
        PresentationRequest::ExternalNotification { title, message } => {
            println!("[notification] {title}: {message}");
        },
        PresentationRequest::Withdraw => {
            if dismiss.take().is_some() {
                println!("[withdrawn]");
            }
        },
    }
}

async fn run_check(store: TomlConfigStore, lookup: &LookupOptions, page: &Path) -> Result<(), CliError> {
    let mut session = Session::open(store, lookup, page).await?;
    let outcome = session.evaluation.evaluate().await;
    session.render_pending(&mut None);
    println!("{outcome}");
    session.print_badge();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinCommand {
    Push(String),
    Replace(String),
    Pop(String),
    Dom(String),
    Dismiss,
    Quit,
}

impl StdinCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, argument)) => (verb, argument.trim()),
            None => (line, ""),
        };
        let location = || (!argument.is_empty()).then(|| argument.to_string());
        match verb {
            "push" => location().map(Self::Push),
            "replace" => location().map(Self::Replace),
            "pop" => location().map(Self::Pop),
            "dom" => location().map(Self::Dom),
            "dismiss" if argument.is_empty() => Some(Self::Dismiss),
            "quit" | "exit" if argument.is_empty() => Some(Self::Quit),
            _ => None,
        }
    }
}

async fn run_watch(store: TomlConfigStore, lookup: &LookupOptions, page: &Path) -> Result<(), CliError> {
    let mut session = Session::open(store, lookup, page).await?;
    let (hub, navigation) = NavigationHub::channel();
    let history = HistoryAdapter::new(session.page.clone(), hub.clone());
    let context = ContextHandle::new();
    let watcher = NavigationWatcher::spawn(
        Arc::clone(&session.evaluation),
        session.page.clone(),
        Arc::new(context.clone()),
        navigation,
        WatcherTimings::default(),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut dismiss = None;
    loop {
        tokio::select! {
            biased;
            request = session.requests.recv() => match request {
                Some(request) => render(request, &mut dismiss),
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line.map_err(CliError::Stdin)? else {
                    log::info!("cli: input closed, releasing the page context");
                    context.invalidate();
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match StdinCommand::parse(&line) {
                    Some(StdinCommand::Push(location)) => history.push_state(&location),
                    Some(StdinCommand::Replace(location)) => history.replace_state(&location),
                    Some(StdinCommand::Pop(location)) => {
                        session.page.set_location(location);
                        hub.popstate();
                    },
                    Some(StdinCommand::Dom(location)) => {
                        session.page.set_location(location);
                        hub.dom_mutated();
                    },
                    Some(StdinCommand::Dismiss) => match dismiss.take() {
                        Some(handle) if handle.dismiss() => println!("[dismissed]"),
                        _ => println!("nothing to dismiss"),
                    },
                    Some(StdinCommand::Quit) => {
                        watcher.shutdown();
                        break;
                    },
                    None => eprintln!("unrecognized command: {}", line.trim()),
                }
            },
        }
    }

    let exit = watcher.join().await;
    log::debug!("cli: watcher exited ({exit:?})");
    session.render_pending(&mut dismiss);
    session.print_badge();
    Ok(())
}

async fn run_config(store: &TomlConfigStore, action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Show => {
            let config = store.load().await?;
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| ConfigError::Serialize(e.to_string()))?;
            println!("# {}", store.path().display());
            print!("{rendered}");
        },
        ConfigAction::Add { name } => {
            let added = store.edit(|config| config.add_identity(&name)).await??;
            println!("added {added}");
        },
        ConfigAction::Remove { name } => {
            let removed = store
                .edit(|config| Ok::<_, PreferenceEditError>(config.remove_identity(&name)))
                .await??;
            if removed {
                println!("removed {}", name.trim());
            } else {
                println!("{} is not listed", name.trim());
            }
        },
        ConfigAction::Enable => set_enabled(store, true).await?,
        ConfigAction::Disable => set_enabled(store, false).await?,
        ConfigAction::Style { style } => {
            store
                .edit(|config| {
                    config.notification_style = style;
                    Ok::<_, PreferenceEditError>(())
                })
                .await??;
            println!("notification style: {style}");
        },
    }
    Ok(())
}

async fn set_enabled(store: &TomlConfigStore, enabled: bool) -> Result<(), CliError> {
    store
        .edit(|config: &mut GuardConfig| {
            config.enabled = enabled;
            Ok::<_, PreferenceEditError>(())
        })
        .await??;
    println!("warnings {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}
