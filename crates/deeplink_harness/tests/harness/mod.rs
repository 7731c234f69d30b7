//! In-process simulation of the file-management application and the host
//! pasteboard, exercised through the same boundaries as a real device.
//!
//! The simulated app persists its open document across terminate/launch,
//! like the real host restores state after a relaunch, and exposes
//! scriptable failure modes for the timeout and injection tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use parking_lot::Mutex;

use deeplink_harness::domain::model::ElementKind;
use deeplink_harness::infra::pasteboard::{TransferChannel, TransferItem};
use deeplink_harness::infra::remote::{Container, ElementQuery, Gesture, Matcher, RemoteApp, Role};

const TOP_LEVEL_TITLE: &str = "On My iPhone";
const RENAME_FIELD_ID: &str = "DOC.inlineRenameField";
const NEW_FOLDER_CELL_ID: &str = "Folder";
const PRESS_AND_HOLD_THRESHOLD_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    File { name: String, html: String },
    Folder { name: String },
}

impl Entry {
    fn cell_identifier(&self) -> String {
        match self {
            Self::File { name, .. } => ElementKind::File.cell_identifier(name),
            Self::Folder { name } => ElementKind::Folder.cell_identifier(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    TopLevel,
    Folder(String),
}

#[derive(Debug)]
struct PendingFolder {
    typed: Option<String>,
}

#[derive(Debug)]
struct DeviceState {
    running: bool,
    launch_blocked: bool,
    paste_blocked: bool,
    rename_field_has_id: bool,
    location: Location,
    top_level: Vec<Entry>,
    folder_contents: BTreeMap<String, Vec<Entry>>,
    open_document: Option<(String, String)>,
    staged: Option<(String, String)>,
    alert_for_link: Option<String>,
    paste_menu: bool,
    delete_menu: Option<String>,
    more_menu: bool,
    rename: Option<PendingFolder>,
    confirmed_links: Vec<String>,
    transcript: Vec<String>,
}

impl DeviceState {
    fn new() -> Self {
        Self {
            running: false,
            launch_blocked: false,
            paste_blocked: false,
            rename_field_has_id: true,
            location: Location::TopLevel,
            top_level: Vec::new(),
            folder_contents: BTreeMap::new(),
            open_document: None,
            staged: None,
            alert_for_link: None,
            paste_menu: false,
            delete_menu: None,
            more_menu: false,
            rename: None,
            confirmed_links: Vec::new(),
            transcript: Vec::new(),
        }
    }

    fn location_title(&self) -> &str {
        match &self.location {
            Location::TopLevel => TOP_LEVEL_TITLE,
            Location::Folder(name) => name,
        }
    }

    fn listing(&self) -> &[Entry] {
        match &self.location {
            Location::TopLevel => &self.top_level,
            Location::Folder(name) => self
                .folder_contents
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }

    fn listing_mut(&mut self) -> &mut Vec<Entry> {
        match self.location.clone() {
            Location::TopLevel => &mut self.top_level,
            Location::Folder(name) => self.folder_contents.entry(name).or_default(),
        }
    }

    fn find_entry(&self, identifier: &str) -> Option<&Entry> {
        self.listing()
            .iter()
            .find(|entry| entry.cell_identifier() == identifier)
    }
}

fn exists_in(state: &DeviceState, query: &ElementQuery) -> bool {
    if !state.running {
        return false;
    }
    let browsing = state.open_document.is_none();

    match (&query.container, query.role, &query.matcher) {
        (Container::Window, Role::Root, _) => true,

        (Container::NavigationBar, Role::Button, Matcher::Label(label)) => match label.as_str() {
            "Done" => state.open_document.is_some(),
            "More" => browsing,
            _ => false,
        },

        // Navigation bar matched by identifier: the open document's title,
        // or the current location when browsing.
        (Container::Window, Role::NavigationBar, Matcher::Id(title)) => {
            match &state.open_document {
                Some((name, _)) => name == title,
                None => state.location_title() == title,
            }
        }

        (Container::NavigationBar, Role::StaticText, Matcher::Label(label)) => {
            browsing && state.location_title() == label
        }

        (Container::TabBar, Role::Button, Matcher::Label(label)) => {
            browsing && label == "Browse"
        }

        (Container::Collection, Role::Cell, Matcher::Id(id)) => {
            browsing && state.find_entry(id).is_some()
        }

        (Container::Window, Role::Collection, Matcher::First) => browsing,

        (Container::Window, Role::Button, Matcher::Label(label)) => match label.as_str() {
            "Paste" => state.paste_menu,
            "Delete" => state.delete_menu.is_some(),
            "New Folder" => state.more_menu,
            _ => false,
        },

        (Container::Window, Role::StaticText, Matcher::Label(label)) => state
            .open_document
            .as_ref()
            .is_some_and(|(_, html)| html.contains(label.as_str())),

        (Container::Window, Role::Alert, Matcher::First) => state.alert_for_link.is_some(),

        (Container::Alert, Role::Button, Matcher::Label(label)) => {
            state.alert_for_link.is_some() && label == "Open"
        }

        (Container::Window, Role::TextField, Matcher::Id(id)) => {
            state.rename.is_some() && state.rename_field_has_id && id == RENAME_FIELD_ID
        }

        (Container::Window, Role::TextField, Matcher::First) => state.rename.is_some(),

        (Container::Cell(cell_id), Role::Image, Matcher::First) => {
            state.rename.is_some() && cell_id == NEW_FOLDER_CELL_ID
        }

        (Container::AnyCell, Role::StaticText, Matcher::Label(label)) => {
            browsing && label == TOP_LEVEL_TITLE
        }

        _ => false,
    }
}

fn perform_in(state: &mut DeviceState, query: &ElementQuery, gesture: &Gesture) -> Result<()> {
    if !exists_in(state, query) {
        bail!("element not found: {query}");
    }
    state.transcript.push(format!("{gesture} {query}"));

    match (&query.container, query.role, &query.matcher, gesture) {
        (Container::NavigationBar, Role::Button, Matcher::Label(label), Gesture::Tap) => {
            match label.as_str() {
                "Done" => state.open_document = None,
                "More" => state.more_menu = true,
                _ => {}
            }
        }

        (Container::Window, Role::Button, Matcher::Label(label), Gesture::Tap) => {
            match label.as_str() {
                "New Folder" => {
                    state.more_menu = false;
                    state.rename = Some(PendingFolder { typed: None });
                }
                "Paste" => {
                    state.paste_menu = false;
                    if !state.paste_blocked
                        && let Some((name, html)) = state.staged.clone()
                    {
                        state.listing_mut().push(Entry::File { name, html });
                    }
                }
                "Delete" => {
                    if let Some(identifier) = state.delete_menu.take() {
                        let folder = state
                            .find_entry(&identifier)
                            .and_then(|entry| match entry {
                                Entry::Folder { name } => Some(name.clone()),
                                Entry::File { .. } => None,
                            });
                        state
                            .listing_mut()
                            .retain(|entry| entry.cell_identifier() != identifier);
                        if let Some(name) = folder {
                            state.folder_contents.remove(&name);
                        }
                    }
                }
                _ => {}
            }
        }

        (Container::Collection, Role::Cell, Matcher::Id(id), Gesture::Tap) => {
            let entry = state
                .find_entry(id)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("cell vanished: {id}"))?;
            match entry {
                Entry::Folder { name } => state.location = Location::Folder(name),
                Entry::File { name, html } => state.open_document = Some((name, html)),
            }
        }

        (Container::Collection, Role::Cell, Matcher::Id(id), Gesture::LongPress { millis }) => {
            if *millis >= PRESS_AND_HOLD_THRESHOLD_MS {
                state.delete_menu = Some(id.clone());
            }
        }

        (Container::Window, Role::Collection, Matcher::First, Gesture::LongPress { millis }) => {
            if *millis >= PRESS_AND_HOLD_THRESHOLD_MS && state.staged.is_some() {
                state.paste_menu = true;
            }
        }

        (Container::Window, Role::TextField, _, Gesture::TypeText(text)) => {
            if let Some(pending) = state.rename.as_mut() {
                pending.typed = Some(text.clone());
            }
        }

        (Container::Cell(_), Role::Image, Matcher::First, Gesture::Tap) => {
            if let Some(pending) = state.rename.take() {
                let name = pending.typed.unwrap_or_else(|| "untitled folder".into());
                state.folder_contents.entry(name.clone()).or_default();
                state.listing_mut().push(Entry::Folder { name });
            }
        }

        (Container::AnyCell, Role::StaticText, Matcher::Label(_), Gesture::Tap) => {
            state.location = Location::TopLevel;
        }

        (Container::TabBar, Role::Button, _, Gesture::DoubleTap) => {
            // Resets the sidebar scroll position; no state to model.
        }

        (Container::Window, Role::StaticText, Matcher::Label(label), Gesture::Tap) => {
            state.alert_for_link = Some(label.clone());
        }

        (Container::Alert, Role::Button, Matcher::Label(_), Gesture::Tap) => {
            if let Some(link) = state.alert_for_link.take() {
                state.confirmed_links.push(link);
            }
        }

        (container, role, matcher, gesture) => {
            bail!("unsupported gesture {gesture} on {container:?}/{role:?} ({matcher:?})");
        }
    }
    Ok(())
}

/// Handle for seeding, scripting, and inspecting the simulated device.
#[derive(Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState::new())),
        }
    }

    pub fn app(&self) -> SimulatedApp {
        SimulatedApp {
            state: self.state.clone(),
        }
    }

    pub fn pasteboard(&self) -> SimulatedPasteboard {
        SimulatedPasteboard {
            state: self.state.clone(),
        }
    }

    /// Mark the app as already running, for tests that start mid-session.
    pub fn boot(&self) {
        self.state.lock().running = true;
    }

    /// The app never reaches a visible state after launch.
    pub fn block_launch(&self) {
        self.state.lock().launch_blocked = true;
    }

    /// The paste gesture stops producing files (permission failure).
    pub fn block_paste(&self) {
        self.state.lock().paste_blocked = true;
    }

    /// Simulate a host version whose rename field lost its identifier.
    pub fn hide_rename_field_id(&self) {
        self.state.lock().rename_field_has_id = false;
    }

    pub fn seed_top_level_file(&self, name: &str, html: &str) {
        self.state.lock().top_level.push(Entry::File {
            name: name.into(),
            html: html.into(),
        });
    }

    pub fn seed_top_level_folder(&self, name: &str) {
        let mut state = self.state.lock();
        state.folder_contents.entry(name.into()).or_default();
        state.top_level.push(Entry::Folder { name: name.into() });
    }

    pub fn transcript(&self) -> Vec<String> {
        self.state.lock().transcript.clone()
    }

    pub fn confirmed_links(&self) -> Vec<String> {
        self.state.lock().confirmed_links.clone()
    }

    pub fn open_document(&self) -> Option<String> {
        self.state
            .lock()
            .open_document
            .as_ref()
            .map(|(name, _)| name.clone())
    }

    pub fn top_level_names(&self) -> Vec<String> {
        self.state
            .lock()
            .top_level
            .iter()
            .map(Entry::cell_identifier)
            .collect()
    }

    pub fn folder_entries(&self, folder: &str) -> Vec<String> {
        self.state
            .lock()
            .folder_contents
            .get(folder)
            .map(|entries| entries.iter().map(Entry::cell_identifier).collect())
            .unwrap_or_default()
    }

    /// Gestures of a given shape seen so far, by transcript substring.
    pub fn gesture_count(&self, needle: &str) -> usize {
        self.state
            .lock()
            .transcript
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl Default for SimulatedDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// The remote application half of the simulated device.
pub struct SimulatedApp {
    state: Arc<Mutex<DeviceState>>,
}

impl RemoteApp for SimulatedApp {
    fn terminate(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.running = false;
        // Transient chrome is gone after a kill; the open document is
        // restored on the next launch, like the real host.
        state.alert_for_link = None;
        state.paste_menu = false;
        state.delete_menu = None;
        state.more_menu = false;
        state.rename = None;
        state.transcript.push("terminate".into());
        Ok(())
    }

    fn launch(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.transcript.push("launch".into());
        if !state.launch_blocked {
            state.running = true;
        }
        Ok(())
    }

    fn exists(&self, query: &ElementQuery) -> Result<bool> {
        Ok(exists_in(&self.state.lock(), query))
    }

    fn perform(&mut self, query: &ElementQuery, gesture: Gesture) -> Result<()> {
        perform_in(&mut self.state.lock(), query, &gesture)
    }
}

/// The host pasteboard half of the simulated device.
pub struct SimulatedPasteboard {
    state: Arc<Mutex<DeviceState>>,
}

impl TransferChannel for SimulatedPasteboard {
    fn stage(&mut self, item: &TransferItem) -> Result<()> {
        let html = item.materialize()?;
        let mut state = self.state.lock();
        state
            .transcript
            .push(format!("stage {}", item.suggested_name));
        state.staged = Some((item.suggested_name.clone(), html));
        Ok(())
    }
}

/// Driver configuration with bounds short enough for negative tests.
pub fn test_config() -> deeplink_harness::infra::config::DriverConfig {
    let mut config = deeplink_harness::infra::config::DriverConfig::default();
    config.timing.wait_timeout_ms = 200;
    config.timing.poll_interval_ms = 5;
    config
}
