use std::collections::VecDeque;
use std::io;

/// Scripted byte source used in tests to inject data and read failures.
#[derive(Default)]
pub struct ScriptedSource {
    script: VecDeque<io::Result<u8>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut source = Self::new();
        source.push_bytes(bytes);
        source
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.script.extend(bytes.iter().map(|b| Ok(*b)));
        self
    }

    pub fn push_error(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.script.push_back(Err(io::Error::new(kind, "scripted read failure")));
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl super::ByteSource for ScriptedSource {
    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        match self.script.pop_front() {
            Some(Ok(byte)) => Ok(Some(byte)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
