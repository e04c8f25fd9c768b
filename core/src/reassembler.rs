/// Streaming UTF-8 decoder for the receiver's byte events
///
/// Multi-byte characters arrive one byte at a time; an incomplete sequence
/// is held back until its continuation bytes show up. Only sequences that
/// can never become valid are replaced with U+FFFD.
#[derive(Debug, Default, Clone)]
pub struct TextReassembler {
    pending: Vec<u8>,
    text: String,
}

impl TextReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the text it completed, if any
    pub fn push(&mut self, byte: u8) -> Option<String> {
        self.pending.push(byte);
        let mut completed = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    completed.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    // prefix already validated by from_utf8
                    completed.push_str(
                        std::str::from_utf8(&self.pending[..valid_up_to]).unwrap_or_default(),
                    );
                    match e.error_len() {
                        Some(bad) => {
                            completed.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid_up_to + bad);
                        }
                        None => {
                            // Incomplete tail, wait for more bytes
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }

        if completed.is_empty() {
            None
        } else {
            self.text.push_str(&completed);
            Some(completed)
        }
    }

    /// Feed a run of bytes, returning everything they completed
    pub fn extend(&mut self, bytes: &[u8]) -> String {
        bytes.iter().filter_map(|&b| self.push(b)).collect()
    }

    /// End of stream: a dangling partial character becomes U+FFFD.
    /// Returns the whole text decoded so far.
    pub fn finish(&mut self) -> String {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.text.push(char::REPLACEMENT_CHARACTER);
        }
        self.text.clone()
    }

    /// Bytes of an incomplete character still being held
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.text.clear();
    }
}
