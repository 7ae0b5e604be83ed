use async_trait::async_trait;
use ferrous_dnsmasq_application::ports::LineSource;
use ferrous_dnsmasq_domain::{DomainError, LogLine};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::unix::pipe;
use tracing::{debug, info};

/// Line source over any buffered async reader.
///
/// Lines are split on `\n`, decoded lossily and trimmed; blank lines are
/// skipped. End of input maps to `Ok(None)`.
pub struct StreamLineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R> StreamLineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }
}

#[async_trait]
impl<R> LineSource for StreamLineSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_line(&mut self) -> Result<Option<LogLine>, DomainError> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| DomainError::IoError(format!("Failed to read log line: {}", e)))?;

            if read == 0 {
                return Ok(None);
            }

            let text = String::from_utf8_lossy(&self.buf);
            let line = text.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(LogLine::new(line)));
        }
    }
}

pub type PipeLineSource = StreamLineSource<BufReader<pipe::Receiver>>;

/// Opens the dnsmasq log FIFO at `path`, creating it first when missing.
///
/// On Linux the pipe is opened read-write so the stream never reports EOF
/// while dnsmasq restarts and reopens its end.
pub fn open_log_pipe(path: &Path) -> Result<PipeLineSource, DomainError> {
    let unavailable =
        |e: io::Error| DomainError::LogSourceUnavailable(format!("{}: {}", path.display(), e));

    if !path.exists() {
        create_fifo(path).map_err(unavailable)?;
        info!(path = %path.display(), "Created dnsmasq log pipe");
    }

    let mut options = pipe::OpenOptions::new();
    #[cfg(target_os = "linux")]
    options.read_write(true);
    let receiver = options.open_receiver(path).map_err(unavailable)?;

    debug!(path = %path.display(), "Opened dnsmasq log pipe");
    Ok(StreamLineSource::new(BufReader::new(receiver)))
}

fn create_fifo(path: &Path) -> io::Result<()> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
