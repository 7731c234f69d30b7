//! Unix-socket transport to a device-side automation runner.
//!
//! Speaks newline-delimited JSON, one in-flight request at a time, matching
//! the driver's synchronous execution model.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::remote::{ElementQuery, Gesture, RemoteApp};

#[derive(Debug, Serialize)]
struct Request<'a> {
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a ElementQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gesture: Option<&'a Gesture>,
}

impl<'a> Request<'a> {
    fn lifecycle(op: &'a str) -> Self {
        Self {
            op,
            query: None,
            gesture: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Response {
    ok: bool,
    #[serde(default)]
    exists: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

struct BridgeInner {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

/// [`RemoteApp`] implementation over a Unix domain socket.
pub struct UnixBridge {
    inner: Mutex<BridgeInner>,
}

impl UnixBridge {
    /// Connect to the runner's socket.
    pub fn connect(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path)
            .with_context(|| format!("failed to connect to bridge at {}", path.display()))?;
        Self::from_stream(stream)
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: UnixStream) -> Result<Self> {
        let writer = stream
            .try_clone()
            .context("failed to clone bridge stream")?;
        Ok(Self {
            inner: Mutex::new(BridgeInner {
                reader: BufReader::new(stream),
                writer,
            }),
        })
    }

    fn round_trip(&self, request: &Request<'_>) -> Result<Response> {
        let mut line =
            serde_json::to_string(request).context("failed to encode bridge request")?;
        line.push('\n');

        let mut inner = self.inner.lock();
        inner
            .writer
            .write_all(line.as_bytes())
            .context("failed to send bridge request")?;

        let mut buf = String::new();
        let read = inner
            .reader
            .read_line(&mut buf)
            .context("failed to read bridge response")?;
        if read == 0 {
            bail!("bridge closed the connection");
        }

        let response: Response =
            serde_json::from_str(buf.trim_end()).context("invalid bridge response")?;
        if !response.ok {
            bail!(
                "bridge rejected {}: {}",
                request.op,
                response.error.unwrap_or_else(|| "unknown error".into())
            );
        }
        Ok(response)
    }
}

impl RemoteApp for UnixBridge {
    fn terminate(&mut self) -> Result<()> {
        self.round_trip(&Request::lifecycle("terminate"))?;
        Ok(())
    }

    fn launch(&mut self) -> Result<()> {
        self.round_trip(&Request::lifecycle("launch"))?;
        Ok(())
    }

    fn exists(&self, query: &ElementQuery) -> Result<bool> {
        let response = self.round_trip(&Request {
            op: "exists",
            query: Some(query),
            gesture: None,
        })?;
        response
            .exists
            .context("bridge response to 'exists' carried no result")
    }

    fn perform(&mut self, query: &ElementQuery, gesture: Gesture) -> Result<()> {
        self.round_trip(&Request {
            op: "perform",
            query: Some(query),
            gesture: Some(&gesture),
        })?;
        Ok(())
    }
}
