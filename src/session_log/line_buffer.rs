/// Reassembles complete lines from chunks appended to a log file.
///
/// A writer may be caught mid-record, so bytes after the last newline are
/// held back until the rest of the line arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(4096),
        }
    }

    /// Append a chunk and return every line it completes, without the
    /// trailing newline.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(decode)
            .collect()
    }

    /// Bytes held back waiting for a newline.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop any partial line, e.g. after the file was truncated.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Flush the held-back fragment as a final line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode(&rest))
    }
}

fn decode(bytes: &[u8]) -> String {
    match simdutf8::basic::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
