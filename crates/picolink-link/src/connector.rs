use std::io::{Read, Write};
#[cfg(unix)]
use std::path::Path;

#[cfg(unix)]
use picolink_transport::SerialStream;
#[cfg(unix)]
use tracing::{debug, info, warn};

#[cfg(unix)]
use crate::config::OpenConfig;
use crate::config::LinkConfig;
#[cfg(unix)]
use crate::error::LinkError;
use crate::error::Result;
use crate::link::Link;

/// Wrap an open stream and check the firmware version over it.
pub fn connect<T: Read + Write>(stream: T, config: LinkConfig) -> Result<Link<T>> {
    let link = Link::from_stream(stream, config)?;
    link.check_firmware_version()?;
    Ok(link)
}

/// Find the bridge among the default candidate ports and connect to it.
#[cfg(unix)]
pub fn open() -> Result<Link<SerialStream>> {
    open_with_config(&OpenConfig::default())
}

/// Find the bridge among `config.candidates` and connect to it.
///
/// Candidates that fail to open, or that open but do not answer the version
/// query, are skipped. A firmware that answers and rejects the version ends
/// the search with [`LinkError::VersionMismatch`].
#[cfg(unix)]
pub fn open_with_config(config: &OpenConfig) -> Result<Link<SerialStream>> {
    config.link.validate()?;

    for path in &config.candidates {
        let stream = match SerialStream::open(path, &config.serial) {
            Ok(stream) => stream,
            Err(err) => {
                debug!(?path, %err, "candidate unavailable");
                continue;
            }
        };

        match connect(stream, config.link.clone()) {
            Ok(link) => {
                info!(?path, "link established");
                return Ok(link);
            }
            Err(err @ LinkError::VersionMismatch { .. }) => return Err(err),
            Err(err) => warn!(?path, %err, "no usable bridge on candidate"),
        }
    }

    Err(LinkError::NoDeviceFound {
        tried: config.candidates.len(),
    })
}

/// Connect to the bridge on one specific port.
///
/// Unlike [`open_with_config`], failures are returned as they happen.
#[cfg(unix)]
pub fn open_path(path: impl AsRef<Path>, config: &OpenConfig) -> Result<Link<SerialStream>> {
    let path = path.as_ref();
    let stream = SerialStream::open(path, &config.serial)?;
    let link = connect(stream, config.link.clone())?;
    info!(?path, "link established");
    Ok(link)
}
