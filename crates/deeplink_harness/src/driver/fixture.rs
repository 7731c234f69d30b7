//! Public entry point for staging and opening deeplink fixtures.

use anyhow::Result;
use url::Url;

use crate::domain::model::{ContentSource, DEFAULT_FILE_NAME, FixtureIdentity};
use crate::infra::config::DriverConfig;
use crate::infra::pasteboard::TransferChannel;
use crate::infra::remote::RemoteApp;

use super::navigator::Navigator;

/// Thin coordinator over the [`Navigator`]: owns the content source and the
/// fixture's naming, delegates all state handling.
pub struct DeeplinkFixture<A: RemoteApp, C: TransferChannel> {
    navigator: Navigator<A, C>,
    identity: FixtureIdentity,
}

impl<A: RemoteApp, C: TransferChannel> DeeplinkFixture<A, C> {
    /// Build a fixture backed by an HTML file on disk. Returns `None`
    /// unless the URL is a local `file://` reference.
    pub fn from_file_url(url: &Url, app: A, channel: C, config: DriverConfig) -> Option<Self> {
        let path = url.to_file_path().ok()?;
        Some(Self::with_source(
            ContentSource::FileUrl(path),
            app,
            channel,
            config,
        ))
    }

    /// Build a fixture backed by inline HTML. Never fails.
    pub fn from_html(html: impl Into<String>, app: A, channel: C, config: DriverConfig) -> Self {
        Self::with_source(ContentSource::InlineHtml(html.into()), app, channel, config)
    }

    fn with_source(content: ContentSource, app: A, channel: C, config: DriverConfig) -> Self {
        Self {
            navigator: Navigator::new(app, channel, content, config),
            identity: FixtureIdentity::top_level(DEFAULT_FILE_NAME),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.identity.file_name = file_name.into();
        self
    }

    pub fn with_folder_name(mut self, folder_name: impl Into<String>) -> Self {
        self.identity.folder_name = Some(folder_name.into());
        self
    }

    /// Converge on the fixture document being open and activate the link
    /// named `name`, dismissing the external-open confirmation.
    pub fn open_deeplink(&mut self, name: &str) -> Result<()> {
        self.navigator.restart()?;

        if !self.navigator.already_opened(&self.identity.file_name)? {
            self.navigator.close_current_file_if_needed()?;
            self.navigator
                .open_folder_if_needed(self.identity.folder_name.as_deref())?;
            self.navigator.open_file(&self.identity.file_name)?;
        }

        self.navigator.open_link(name)
    }

    /// Delete the named file or folder from the top-level location.
    pub fn remove_element(&mut self, name: &str, is_folder: bool) -> Result<()> {
        self.navigator.remove(name, is_folder)
    }
}
