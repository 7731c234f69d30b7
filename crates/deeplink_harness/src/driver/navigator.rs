//! Convergent, idempotent manipulation of the remote application's
//! visible state.
//!
//! No assumption is made about the application's internal state beyond what
//! is observable through its accessibility tree: every decision is
//! re-derived from a fresh query, never from a cached mirror. Per
//! `open_deeplink` call the navigator walks `Unknown -> Restarted ->
//! {AlreadyOnTargetFile | NeedsNavigation} -> TargetFolderOpen ->
//! TargetFileOpen -> LinkActivated -> ConfirmationDismissed`, each
//! transition guarded by an existence or title check.

use anyhow::Result;
use tracing::debug;

use crate::domain::errors::DriverError;
use crate::domain::model::{ContentSource, ElementKind};
use crate::infra::config::DriverConfig;
use crate::infra::pasteboard::{TransferChannel, TransferItem, TransferPayload};
use crate::infra::remote::{ElementQuery, Gesture, RemoteApp, first_existing};
use crate::infra::wait::wait_until;

/// Drives the remote application toward a requested state using only
/// element existence checks and gestures.
pub struct Navigator<A: RemoteApp, C: TransferChannel> {
    app: A,
    channel: C,
    content: ContentSource,
    config: DriverConfig,
}

impl<A: RemoteApp, C: TransferChannel> Navigator<A, C> {
    pub fn new(app: A, channel: C, content: ContentSource, config: DriverConfig) -> Self {
        Self {
            app,
            channel,
            content,
            config,
        }
    }

    /// Terminate the remote process if running, relaunch it, and block
    /// until its root element is observable. Always called first to
    /// establish a known baseline, at the cost of relaunch latency.
    pub fn restart(&mut self) -> Result<()> {
        debug!("restarting remote application");
        self.app.terminate()?;
        self.app.launch()?;
        self.wait_for("application root", &ElementQuery::root())
    }

    /// True iff a document-closed affordance is visible AND the open
    /// document's title matches `file_name`. The affordance alone only says
    /// that *some* document is open.
    pub fn already_opened(&self, file_name: &str) -> Result<bool> {
        Ok(self.app.exists(&self.done_button())?
            && self.app.exists(&ElementQuery::nav_title(file_name))?)
    }

    /// Close the open document if there is one; no-op otherwise.
    pub fn close_current_file_if_needed(&mut self) -> Result<()> {
        let done = self.done_button();
        if self.app.exists(&done)? {
            self.app.perform(&done, Gesture::Tap)?;
        }
        Ok(())
    }

    /// Converge on the requested folder: `None` means the top-level
    /// location; an already-open folder is left alone; a missing folder is
    /// created first.
    pub fn open_folder_if_needed(&mut self, folder_name: Option<&str>) -> Result<()> {
        let Some(folder_name) = folder_name else {
            return self.open_top_level();
        };
        if self.app.exists(&ElementQuery::nav_static_text(folder_name))? {
            return Ok(());
        }
        self.open_top_level()?;

        let folder = ElementQuery::cell(&ElementKind::Folder.cell_identifier(folder_name));
        if !self.app.exists(&folder)? {
            self.create_and_open_folder(folder_name)?;
        }
        // Navigation goes through the identifier lookup even right after
        // creation, when the folder may still be showing its rename field.
        self.app.perform(&folder, Gesture::Tap)
    }

    /// Ensure the fixture document is open, materializing it via the
    /// transfer channel when its cell is absent.
    pub fn open_file(&mut self, file_name: &str) -> Result<()> {
        let file = ElementQuery::cell(&ElementKind::File.cell_identifier(file_name));
        if !self.app.exists(&file)? {
            self.save_content_if_needed(file_name)?;
            if self.wait_for("pasted fixture cell", &file).is_err() {
                // The paste mechanism broke; retrying would mask it.
                return Err(DriverError::ContentInjection {
                    file_name: file_name.to_owned(),
                }
                .into());
            }
        }
        self.app.perform(&file, Gesture::Tap)?;
        self.wait_for("open document title", &ElementQuery::nav_title(file_name))
    }

    /// Tap the link text inside the open document, wait for the external
    /// confirmation prompt, and dismiss it via its "Open" affordance.
    /// Whatever happens after that confirmation is not ours.
    pub fn open_link(&mut self, name: &str) -> Result<()> {
        self.app
            .perform(&ElementQuery::static_text(name), Gesture::Tap)?;
        self.wait_for("link confirmation prompt", &ElementQuery::alert())?;
        self.app.perform(
            &ElementQuery::alert_button(&self.config.labels.open),
            Gesture::Tap,
        )
    }

    /// Delete the named file or folder from the top-level location.
    /// Removing a non-existent element is a successful no-op.
    pub fn remove(&mut self, name: &str, is_folder: bool) -> Result<()> {
        self.close_current_file_if_needed()?;
        self.open_top_level()?;

        let kind = if is_folder {
            ElementKind::Folder
        } else {
            ElementKind::File
        };
        let element = ElementQuery::cell(&kind.cell_identifier(name));
        if !self.app.exists(&element)? {
            debug!(name, is_folder, "nothing to remove");
            return Ok(());
        }

        self.app.perform(
            &element,
            Gesture::LongPress {
                millis: self.config.timing.long_press_ms,
            },
        )?;
        let delete = ElementQuery::button(&self.config.labels.delete);
        self.wait_for("delete button", &delete)?;
        self.app.perform(&delete, Gesture::Tap)
    }

    /// Stage the fixture content on the transfer channel and paste it into
    /// the storage view. The single most fragile step: it depends on
    /// inter-process transfer permissions and the host's paste gesture. A
    /// file that never shows up surfaces later as `ContentInjection`.
    fn save_content_if_needed(&mut self, file_name: &str) -> Result<()> {
        let item = TransferItem::html(TransferPayload::from(&self.content), file_name);
        self.channel.stage(&item)?;
        debug!(file_name, "staged fixture on the transfer channel");

        self.app.perform(
            &ElementQuery::collection_surface(),
            Gesture::LongPress {
                millis: self.config.timing.long_press_ms,
            },
        )?;
        let paste = ElementQuery::button(&self.config.labels.paste);
        self.wait_for("paste button", &paste)?;
        self.app.perform(&paste, Gesture::Tap)
    }

    fn create_and_open_folder(&mut self, folder_name: &str) -> Result<()> {
        debug!(folder_name, "creating fixture folder");
        self.app.perform(
            &ElementQuery::nav_button(&self.config.labels.more),
            Gesture::Tap,
        )?;
        let new_folder = ElementQuery::button(&self.config.labels.new_folder);
        self.wait_for("new folder button", &new_folder)?;
        self.app.perform(&new_folder, Gesture::Tap)?;

        // Known identifier first, then whatever text field is up; rename
        // field identifiers drift between host versions.
        let candidates = [
            ElementQuery::text_field_with_id(&self.config.labels.rename_field_id),
            ElementQuery::first_text_field(),
        ];
        let field = first_existing(&self.app, &candidates)?.ok_or_else(|| {
            DriverError::ElementNotFound {
                query: candidates[0].to_string(),
            }
        })?;
        self.app
            .perform(&field, Gesture::TypeText(folder_name.to_owned()))?;

        self.app.perform(
            &ElementQuery::image_in_cell(&self.config.labels.new_folder_cell_id),
            Gesture::Tap,
        )
    }

    /// Idempotent entry into the top-level location. The double tap resets
    /// a possibly-scrolled sidebar back to its top before selecting.
    fn open_top_level(&mut self) -> Result<()> {
        let title = ElementQuery::nav_static_text(&self.config.labels.top_level);
        if self.app.exists(&title)? {
            return Ok(());
        }
        self.app.perform(
            &ElementQuery::tab_button(&self.config.labels.browse),
            Gesture::DoubleTap,
        )?;
        self.app.perform(
            &ElementQuery::cell_static_text(&self.config.labels.top_level),
            Gesture::Tap,
        )?;
        self.wait_for("top-level location title", &title)
    }

    fn done_button(&self) -> ElementQuery {
        ElementQuery::nav_button(&self.config.labels.done)
    }

    fn wait_for(&self, what: &str, query: &ElementQuery) -> Result<()> {
        wait_until(
            what,
            self.config.wait_timeout(),
            self.config.poll_interval(),
            || self.app.exists(query),
        )
    }
}
