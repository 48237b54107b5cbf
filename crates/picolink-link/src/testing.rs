//! In-memory MCU double shared by the link tests.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use picolink_frame::{answer_read_len, decode_header, encode_command, Command, Tag, HEADER_SIZE};
use picolink_transport::ByteStream;

use crate::handshake::ACK_OK;

const MEMORY_SIZE: usize = 0x1_0000 + 0x100;

/// Emulates the bridge firmware: a flat register file with auto-incrementing
/// bursts, answering each command as soon as it is written.
pub(crate) struct FakeMcu {
    memory: Vec<u8>,
    cursor: usize,
    pending: VecDeque<u8>,
    version_ack: Option<u8>,
    answer_limit: Option<usize>,
    truncate_reads: bool,
    commands: Arc<Mutex<Vec<Command>>>,
    reads: Arc<AtomicUsize>,
}

impl FakeMcu {
    pub(crate) fn new() -> Self {
        Self {
            memory: (0..MEMORY_SIZE).map(|i| (i % 251) as u8).collect(),
            cursor: 0,
            pending: VecDeque::new(),
            version_ack: Some(ACK_OK),
            answer_limit: None,
            truncate_reads: false,
            commands: Arc::new(Mutex::new(Vec::new())),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Never answer.
    pub(crate) fn silent(self) -> Self {
        self.answer_first(0)
    }

    /// Answer only the first `n` commands.
    pub(crate) fn answer_first(mut self, n: usize) -> Self {
        self.answer_limit = Some(n);
        self
    }

    /// First payload byte of the version answer; `None` answers empty.
    pub(crate) fn version_ack(mut self, ack: Option<u8>) -> Self {
        self.version_ack = ack;
        self
    }

    /// Answer burst reads with one byte less than requested.
    pub(crate) fn truncate_reads(mut self) -> Self {
        self.truncate_reads = true;
        self
    }

    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn command_log(&self) -> Arc<Mutex<Vec<Command>>> {
        Arc::clone(&self.commands)
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn memory(&self, start: usize, len: usize) -> &[u8] {
        &self.memory[start..start + len]
    }

    fn respond(&mut self, command: &Command) -> Vec<u8> {
        let payload = command.payload.as_ref();
        match command.tag {
            Tag::ReadRegister => vec![self.memory[command.address as usize]],
            Tag::WriteRegister => {
                self.memory[command.address as usize] = payload[0];
                Vec::new()
            }
            Tag::WriteBurstFirst | Tag::WriteBurstAtomic => {
                self.cursor = command.address as usize;
                self.store(payload);
                Vec::new()
            }
            Tag::WriteBurstMiddle | Tag::WriteBurstEnd => {
                self.store(payload);
                Vec::new()
            }
            Tag::ReadBurstFirst | Tag::ReadBurstAtomic => {
                self.cursor = command.address as usize;
                self.load(payload)
            }
            Tag::ReadBurstMiddle | Tag::ReadBurstEnd => self.load(payload),
            Tag::FirmwareVersion => self.version_ack.into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn store(&mut self, data: &[u8]) {
        self.memory[self.cursor..self.cursor + data.len()].copy_from_slice(data);
        self.cursor += data.len();
    }

    fn load(&mut self, request: &[u8]) -> Vec<u8> {
        let mut len = u16::from_be_bytes([request[0], request[1]]) as usize;
        let data = self.memory[self.cursor..self.cursor + len].to_vec();
        self.cursor += len;
        if self.truncate_reads {
            len -= 1;
        }
        data[..len].to_vec()
    }
}

impl Read for FakeMcu {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for FakeMcu {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let header = decode_header(buf[..HEADER_SIZE].try_into().unwrap());
        let payload = buf[HEADER_SIZE..HEADER_SIZE + header.length as usize].to_vec();
        let tag = Tag::from_byte(header.tag).unwrap();
        let command = Command::new(tag, header.address, payload);

        let answered = {
            let mut log = self.commands.lock().unwrap();
            log.push(command.clone());
            self.answer_limit.is_none_or(|limit| log.len() <= limit)
        };

        if answered {
            let reply = self.respond(&command);
            let mut wire = BytesMut::new();
            encode_command(tag, header.address, &reply, &mut wire).unwrap();
            self.pending.extend(wire.iter().copied());
            if answer_read_len(reply.len()) > reply.len() {
                self.pending.push_back(0x00);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl ByteStream for FakeMcu {
    fn close(self) -> picolink_transport::Result<()> {
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "fake-mcu"
    }
}
