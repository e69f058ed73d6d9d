use crate::error::DecodeError;

/// Number of bytes in the big-endian length prefix used by framed messages.
pub const LEN_PREFIX: usize = 4;

/// Single-byte operation selector understood by the helper's binary listener.
///
/// The helper sniffs this first byte to route the connection, so it must be
/// the first thing written on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Replace the hosts file with the request payload.
    UpdateHosts,
    /// Read the current hosts file; the request payload is empty.
    GetHosts,
    /// Execute a command line with the helper's privileges.
    RunCommand,
}

impl Opcode {
    pub fn as_byte(self) -> u8 {
        match self {
            Opcode::UpdateHosts => b'u',
            Opcode::GetHosts => b'g',
            Opcode::RunCommand => b'c',
        }
    }
}

/// Encodes one binary request: opcode byte, 4-byte big-endian payload length,
/// payload bytes. The result is written to the stream in a single send.
pub fn encode_request(opcode: Opcode, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + LEN_PREFIX + payload.len());
    buf.push(opcode.as_byte());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Incremental decoder for framed results (`length:4 BE | body`).
///
/// The stream delivers bytes in arbitrary fragments: the length prefix may be
/// split across reads and the body may trickle in over many data events. Feed
/// each fragment with [`FrameDecoder::extend`] and poll
/// [`FrameDecoder::take_frame`] after every one.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    declared_len: Option<usize>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one read's worth of bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Returns the frame body once it has fully accumulated.
    ///
    /// Consumes the length prefix as soon as 4 bytes are buffered, then hands
    /// back the body once `length` further bytes are present. A declared
    /// length of zero yields an empty body immediately; that is a valid,
    /// complete result. Bytes beyond the frame are left unconsumed.
    pub fn take_frame(&mut self) -> Option<Vec<u8>> {
        if self.declared_len.is_none() && self.buffer.len() >= LEN_PREFIX {
            let mut prefix = [0u8; LEN_PREFIX];
            prefix.copy_from_slice(&self.buffer[..LEN_PREFIX]);
            self.buffer.drain(..LEN_PREFIX);
            self.declared_len = Some(u32::from_be_bytes(prefix) as usize);
        }
        match self.declared_len {
            Some(expected) if self.buffer.len() >= expected => {
                let body = self.buffer.drain(..expected).collect();
                self.declared_len = None;
                Some(body)
            }
            _ => None,
        }
    }

    /// Error describing the decoder state when the stream ended before
    /// [`FrameDecoder::take_frame`] produced a frame.
    pub fn truncation_error(&self) -> DecodeError {
        match self.declared_len {
            Some(expected) => DecodeError::TruncatedFrame {
                expected,
                received: self.buffer.len(),
            },
            None => DecodeError::TruncatedHeader {
                received: self.buffer.len(),
            },
        }
    }
}
