//! Command tag space.
//!
//! Every tag the firmware can issue or echo is listed here, including the
//! radio-level commands this crate never sends. The set is closed: a byte that
//! does not map to a [`Tag`] is never the start of an answer header.

use std::fmt;

/// Transfer direction of a register burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// Position of a chunk within a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    /// First of several chunks.
    First,
    /// Neither first nor last.
    Middle,
    /// Last of several chunks.
    End,
    /// The whole burst fits in one chunk.
    Atomic,
}

/// A command tag, valid both in commands and in the echo of their answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    ReadRegister = b'r',
    ReadBurstFirst = b's',
    ReadBurstMiddle = b't',
    ReadBurstEnd = b'u',
    ReadBurstAtomic = b'p',
    /// Retired firmware command, still echoed by older builds.
    Legacy = b'e',
    WriteRegister = b'w',
    WriteBurstFirst = b'x',
    WriteBurstMiddle = b'y',
    WriteBurstEnd = b'z',
    WriteBurstAtomic = b'a',
    Receive = b'b',
    RxRfSetConf = b'c',
    RxIfSetConf = b'd',
    Send = b'f',
    TxGainSetConf = b'h',
    Trigger = b'q',
    BoardSetConf = b'i',
    CalibrationSnapshot = b'j',
    FirmwareVersion = b'l',
    ResetMcu = b'm',
    EnterBootloader = b'n',
}

impl Tag {
    /// Map a wire byte onto the tag space.
    pub fn from_byte(byte: u8) -> Option<Self> {
        let tag = match byte {
            b'r' => Self::ReadRegister,
            b's' => Self::ReadBurstFirst,
            b't' => Self::ReadBurstMiddle,
            b'u' => Self::ReadBurstEnd,
            b'p' => Self::ReadBurstAtomic,
            b'e' => Self::Legacy,
            b'w' => Self::WriteRegister,
            b'x' => Self::WriteBurstFirst,
            b'y' => Self::WriteBurstMiddle,
            b'z' => Self::WriteBurstEnd,
            b'a' => Self::WriteBurstAtomic,
            b'b' => Self::Receive,
            b'c' => Self::RxRfSetConf,
            b'd' => Self::RxIfSetConf,
            b'f' => Self::Send,
            b'h' => Self::TxGainSetConf,
            b'q' => Self::Trigger,
            b'i' => Self::BoardSetConf,
            b'j' => Self::CalibrationSnapshot,
            b'l' => Self::FirmwareVersion,
            b'm' => Self::ResetMcu,
            b'n' => Self::EnterBootloader,
            _ => return None,
        };
        Some(tag)
    }

    /// The wire byte for this tag.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// The burst tag for a chunk of the given direction and position.
    pub fn burst(direction: Direction, kind: ChunkKind) -> Self {
        match (direction, kind) {
            (Direction::Read, ChunkKind::First) => Self::ReadBurstFirst,
            (Direction::Read, ChunkKind::Middle) => Self::ReadBurstMiddle,
            (Direction::Read, ChunkKind::End) => Self::ReadBurstEnd,
            (Direction::Read, ChunkKind::Atomic) => Self::ReadBurstAtomic,
            (Direction::Write, ChunkKind::First) => Self::WriteBurstFirst,
            (Direction::Write, ChunkKind::Middle) => Self::WriteBurstMiddle,
            (Direction::Write, ChunkKind::End) => Self::WriteBurstEnd,
            (Direction::Write, ChunkKind::Atomic) => Self::WriteBurstAtomic,
        }
    }

    /// Human-readable name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::ReadRegister => "read",
            Self::ReadBurstFirst => "read-burst-first",
            Self::ReadBurstMiddle => "read-burst-middle",
            Self::ReadBurstEnd => "read-burst-end",
            Self::ReadBurstAtomic => "read-burst-atomic",
            Self::Legacy => "legacy",
            Self::WriteRegister => "write",
            Self::WriteBurstFirst => "write-burst-first",
            Self::WriteBurstMiddle => "write-burst-middle",
            Self::WriteBurstEnd => "write-burst-end",
            Self::WriteBurstAtomic => "write-burst-atomic",
            Self::Receive => "receive",
            Self::RxRfSetConf => "rxrf-setconf",
            Self::RxIfSetConf => "rxif-setconf",
            Self::Send => "send",
            Self::TxGainSetConf => "txgain-setconf",
            Self::Trigger => "trigger",
            Self::BoardSetConf => "board-setconf",
            Self::CalibrationSnapshot => "calibration-snapshot",
            Self::FirmwareVersion => "firmware-version",
            Self::ResetMcu => "reset",
            Self::EnterBootloader => "bootloader",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ('{}')", self.name(), self.as_byte() as char)
    }
}

/// Returns true if `byte` can open an answer header.
pub fn is_response_tag(byte: u8) -> bool {
    Tag::from_byte(byte).is_some()
}
