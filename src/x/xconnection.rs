//! The connection to the X-Server, used to list outputs and to hear about
//! them changing

use crate::{
    error::Error,
    x::{
        screen::{ScreenSource, XScreen},
        utils::XUtility,
    },
};
use anyhow::{Context, Result};
use x11rb::{
    connection::{Connection, RequestConnection},
    protocol::{
        randr::{self, ConnectionExt as _},
        xproto::Window,
        Event,
    },
    rust_connection::RustConnection,
};

/// Wrapper around the [`RustConnection`]
pub(crate) struct XConnection {
    /// The connection to the X-Server
    conn: RustConnection,
    /// Root window of the default screen
    root: Window,
}

impl XConnection {
    /// Connect to the X-Server and make sure RandR is usable
    pub(crate) fn new() -> Result<Self> {
        let (conn, screen_num) = XUtility::setup_connection()?;
        Self::check_extensions(&conn)?;

        let root = conn
            .setup()
            .roots
            .get(screen_num)
            .map(|screen| screen.root)
            .context("X-Server reported no screen for the display")?;
        log::debug!("connected to X-Server, root window: {:#0x}", root);

        Ok(Self { conn, root })
    }

    /// Shorter access to the [`RustConnection`]
    pub(crate) const fn aux(&self) -> &RustConnection {
        &self.conn
    }

    /// Root [`Window`] of the default screen
    pub(crate) const fn root(&self) -> Window {
        self.root
    }

    /// Ask the X-Server to report outputs being connected or disconnected
    pub(crate) fn subscribe(&self) -> Result<()> {
        self.aux()
            .randr_select_input(self.root(), randr::NotifyMask::OUTPUT_CHANGE)
            .context("failed to select randr input")?
            .check()
            .context("failed to check randr::select_input")?;
        self.aux().flush().context("failed to flush randr subscription")?;

        Ok(())
    }

    /// Block until an output is connected or disconnected
    ///
    /// Every other event is discarded
    pub(crate) fn hotplugs(&self) -> Hotplugs<'_> {
        Hotplugs { xconn: self }
    }

    /// Check that the RandR extension is installed and that the version is up
    /// to date
    fn check_extensions(conn: &RustConnection) -> Result<()> {
        log::debug!("checking that extensions are installed");
        if conn
            .extension_information(randr::X11_EXTENSION_NAME)
            .context("failed to query X11 extensions")?
            .is_none()
        {
            return Err(Error::MissingExtension(randr::X11_EXTENSION_NAME).into());
        }

        let (major, minor) = randr::X11_XML_VERSION;
        let version = conn
            .randr_query_version(major, minor)
            .context("failed to query `randr` version")?
            .reply()
            .with_context(|| {
                format!("`randr` version is unsupported. Supported version: {}.{}", major, minor)
            })?;
        log::debug!(
            "`randr` extension version: {}.{}",
            version.major_version,
            version.minor_version
        );

        Ok(())
    }
}

impl ScreenSource for XConnection {
    fn screens(&self) -> Result<Vec<XScreen>> {
        let resources = self
            .aux()
            .randr_get_screen_resources_current(self.root())
            .context("failed to get screen resources")?
            .reply()
            .context("failed to get reply from: 'GetScreenResourcesCurrent'")?;

        let primary = self
            .aux()
            .randr_get_output_primary(self.root())
            .context("failed to get primary output")?
            .reply()
            .context("failed to get reply from: 'GetOutputPrimary'")?
            .output;

        resources
            .outputs
            .iter()
            .map(|&output| {
                let info = self
                    .aux()
                    .randr_get_output_info(output, resources.config_timestamp)
                    .with_context(|| format!("failed to get info of output {}", output))?
                    .reply()
                    .with_context(|| format!("failed to get reply from: 'GetOutputInfo({})'", output))?;

                Ok(XScreen {
                    name:       String::from_utf8_lossy(&info.name).into_owned(),
                    is_primary: output == primary,
                    enabled:    info.crtc != x11rb::NONE,
                    connected:  info.connection == randr::Connection::CONNECTED,
                })
            })
            .collect()
    }
}

/// Output change notifications coming from the X-Server
pub(crate) struct Hotplugs<'a> {
    /// Connection the events are read from
    xconn: &'a XConnection,
}

impl Iterator for Hotplugs<'_> {
    type Item = Result<()>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.xconn.aux().wait_for_event() {
                Ok(Event::RandrNotify(e)) if e.sub_code == randr::Notify::OUTPUT_CHANGE => {
                    log::debug!("received randr output change");
                    return Some(Ok(()));
                },
                Ok(e) => log::trace!("ignoring event: {:?}", e),
                Err(e) => return Some(Err(e).context("failed to wait for next event")),
            }
        }
    }
}
