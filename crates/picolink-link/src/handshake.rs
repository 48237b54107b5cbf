use std::io::{Read, Write};

use picolink_frame::Tag;
use tracing::{debug, warn};

use crate::error::{LinkError, Result};
use crate::transaction::{execute, LinkState};

/// Firmware answer byte: version accepted.
pub const ACK_OK: u8 = 0x01;

/// Firmware answer byte: version rejected.
pub const ACK_KO: u8 = 0x00;

/// MCU firmware version this host build is written against.
pub const DEFAULT_FIRMWARE_VERSION: u32 = 0x010a_0006;

/// Ask the firmware whether it is compatible with `expected`.
///
/// The version goes out big-endian as the 4-byte payload of a version query.
/// Only an explicit [`ACK_KO`] in the first answer byte is a rejection; any
/// other value, including ones that are not [`ACK_OK`], is accepted.
pub fn check_firmware_version<T: Read + Write>(
    state: &mut LinkState<T>,
    expected: u32,
) -> Result<()> {
    let answer = execute(state, Tag::FirmwareVersion, 0, &expected.to_be_bytes())?;

    match answer.payload.first().copied() {
        Some(ACK_KO) => Err(LinkError::VersionMismatch { expected }),
        Some(ACK_OK) => {
            debug!(version = format_args!("{expected:#010x}"), "firmware version checked");
            Ok(())
        }
        Some(other) => {
            debug!(ack = other, "firmware answered version query without explicit ack");
            Ok(())
        }
        None => {
            warn!("empty firmware version answer, assuming compatible");
            Ok(())
        }
    }
}
