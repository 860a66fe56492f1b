use bytes::BytesMut;

/// Accumulates raw bytes and yields complete lines.
///
/// A line is terminated by `\n`; a trailing `\r` is stripped. Bytes after the
/// last terminator stay buffered until more input arrives or the caller takes
/// them with [`LineBuffer::take_remainder`]. Invalid UTF-8 is replaced rather
/// than rejected, so a multi-byte character split across chunks is only
/// decoded once its line is complete.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let end = find_newline(&self.buf)?;
        let line = self.buf.split_to(end);
        Some(decode(&line[..end - 1]))
    }

    /// Unterminated trailing bytes, if any. Used once the input has ended.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(decode(&rest))
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

fn find_newline(buf: &BytesMut) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n').map(|pos| pos + 1)
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
