use std::io::{Read, Write};
#[cfg(unix)]
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use picolink_frame::Tag;
use picolink_transport::ByteStream;
#[cfg(unix)]
use picolink_transport::SerialStream;
use tracing::{info, warn};

use crate::burst;
use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::handshake::check_firmware_version;
use crate::transaction::{execute, LinkState};

/// An open link to the MCU bridge.
///
/// The link owns its byte stream and frame buffers behind a lock. Every public
/// operation holds the lock from its first frame to its last, so a whole
/// burst is never interleaved with another caller's traffic. Share a link
/// across threads with `Arc<Link<T>>`; callers block on the lock in no
/// particular order.
pub struct Link<T> {
    state: Mutex<LinkState<T>>,
    config: LinkConfig,
}

impl<T: Read + Write> Link<T> {
    /// Wrap an already-open stream without talking to the firmware.
    ///
    /// Use [`crate::connect`] to also run the firmware version handshake.
    pub fn from_stream(stream: T, config: LinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: Mutex::new(LinkState::new(stream)),
            config,
        })
    }

    /// Protocol settings of this link.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Run the firmware version handshake with the configured version.
    pub fn check_firmware_version(&self) -> Result<()> {
        let mut state = self.lock();
        check_firmware_version(&mut *state, self.config.firmware_version)
    }

    /// Read one register.
    pub fn read_register(&self, address: u8) -> Result<u8> {
        let answer = {
            let mut state = self.lock();
            execute(&mut *state, Tag::ReadRegister, address, &[0])?
        };

        answer
            .payload
            .first()
            .copied()
            .ok_or(LinkError::ShortAnswer {
                tag: Tag::ReadRegister,
                expected: 1,
                actual: 0,
            })
    }

    /// Write one register.
    pub fn write_register(&self, address: u8, value: u8) -> Result<()> {
        let mut state = self.lock();
        execute(&mut *state, Tag::WriteRegister, address, &[value])?;
        Ok(())
    }

    /// Read `size` consecutive registers starting at `address`.
    pub fn read_burst(&self, address: u8, size: usize) -> Result<Vec<u8>> {
        if size > burst::MAX_BURST_SIZE {
            return Err(LinkError::InvalidArgument(format!(
                "burst of {size} bytes exceeds {}",
                burst::MAX_BURST_SIZE
            )));
        }
        let mut buf = vec![0u8; size];
        self.read_burst_into(address, &mut buf)?;
        Ok(buf)
    }

    /// Fill `dst` from consecutive registers starting at `address`.
    ///
    /// On error the contents of `dst` are undefined.
    pub fn read_burst_into(&self, address: u8, dst: &mut [u8]) -> Result<()> {
        let mut state = self.lock();
        burst::read_burst(&mut *state, address, dst, self.config.atomic_rx)
    }

    /// Write `data` to consecutive registers starting at `address`.
    ///
    /// On error the register range is in an undefined state.
    pub fn write_burst(&self, address: u8, data: &[u8]) -> Result<()> {
        let mut state = self.lock();
        burst::write_burst(&mut *state, address, data, self.config.atomic_tx)
    }

    fn lock(&self) -> MutexGuard<'_, LinkState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("link lock poisoned by a panicked caller, continuing");
            poisoned.into_inner()
        })
    }
}

impl<T: ByteStream> Link<T> {
    /// Close the link, reporting a failure to release the transport.
    pub fn close(self) -> Result<()> {
        let stream = self
            .state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .into_inner();
        let name = stream.transport_name();
        stream.close()?;
        info!(transport = name, "link closed");
        Ok(())
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        self.lock().get_ref().transport_name()
    }
}

#[cfg(unix)]
impl Link<SerialStream> {
    /// Device path of the serial port behind this link.
    pub fn port_path(&self) -> PathBuf {
        self.lock().get_ref().path().to_path_buf()
    }
}

impl<T> std::fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").field("config", &self.config).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use picolink_frame::Command;

    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::FakeMcu;

    fn link(mcu: FakeMcu) -> Link<FakeMcu> {
        Link::from_stream(mcu, LinkConfig::default()).unwrap()
    }

    #[test]
    fn register_roundtrip() {
        let link = link(FakeMcu::new());

        link.write_register(0x33, 0xC3).unwrap();
        assert_eq!(link.read_register(0x33).unwrap(), 0xC3);
    }

    #[test]
    fn burst_roundtrip_uses_configured_thresholds() {
        let mcu = FakeMcu::new();
        let log = mcu.command_log();
        let cfg = LinkConfig {
            atomic_tx: 256,
            atomic_rx: 256,
            ..LinkConfig::default()
        };
        let link = Link::from_stream(mcu, cfg).unwrap();
        let data: Vec<u8> = (0..257).map(|i| i as u8).collect();

        link.write_burst(0x10, &data).unwrap();
        let back = link.read_burst(0x10, 257).unwrap();

        assert_eq!(back, data);
        let tags: Vec<Tag> = log.lock().unwrap().iter().map(|c| c.tag).collect();
        assert_eq!(
            tags,
            vec![
                Tag::WriteBurstFirst,
                Tag::WriteBurstEnd,
                Tag::ReadBurstFirst,
                Tag::ReadBurstEnd
            ]
        );
    }

    #[test]
    fn read_burst_rejects_oversized_request() {
        let link = link(FakeMcu::new());
        let err = link.read_burst(0, burst::MAX_BURST_SIZE + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = LinkConfig {
            atomic_tx: 0,
            ..LinkConfig::default()
        };
        assert!(Link::from_stream(FakeMcu::new(), cfg).is_err());
    }

    #[test]
    fn failed_operation_releases_lock() {
        let link = link(FakeMcu::new().answer_first(1));

        link.write_register(0, 1).unwrap();
        assert_eq!(link.read_register(0).unwrap_err().kind(), ErrorKind::Timeout);
        // A second failure proves the lock was released after the first.
        assert_eq!(link.write_register(0, 2).unwrap_err().kind(), ErrorKind::Timeout);
    }

    #[test]
    fn close_consumes_link() {
        let link = link(FakeMcu::new());
        assert_eq!(link.transport_name(), "fake-mcu");
        link.close().unwrap();
    }

    #[test]
    fn concurrent_bursts_never_interleave() {
        let mcu = FakeMcu::new();
        let log = mcu.command_log();
        let link = Arc::new(link(mcu));
        let barrier = Arc::new(Barrier::new(4));

        let workers: Vec<_> = (0..4u8)
            .map(|worker| {
                let link = Arc::clone(&link);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let address = worker * 0x10;
                    for _ in 0..3 {
                        link.write_burst(address, &[worker; 2000]).unwrap();
                        let back = link.read_burst(address, 2000).unwrap();
                        assert_eq!(back.len(), 2000);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        let commands = log.lock().unwrap().clone();
        assert_eq!(commands.len(), 4 * 3 * (4 + 3));
        assert_bursts_contiguous(&commands);
    }

    /// Every burst must run from its opening chunk to its closing chunk with
    /// only its own middle chunks in between.
    fn assert_bursts_contiguous(commands: &[Command]) {
        let mut open: Option<(Tag, u8)> = None;
        for command in commands {
            match command.tag {
                Tag::WriteBurstFirst | Tag::ReadBurstFirst => {
                    assert!(open.is_none(), "burst started inside another burst");
                    open = Some((command.tag, command.address));
                }
                Tag::WriteBurstMiddle | Tag::ReadBurstMiddle => {
                    let (_, address) = open.expect("middle chunk outside a burst");
                    assert_eq!(address, command.address);
                }
                Tag::WriteBurstEnd | Tag::ReadBurstEnd => {
                    let (_, address) = open.take().expect("end chunk outside a burst");
                    assert_eq!(address, command.address);
                }
                other => panic!("unexpected command {other}"),
            }
        }
        assert!(open.is_none());
    }
}
