//! Mock command runner

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use batis_apps::CommandRunner;

/// Records every cache-rebuild command and reports a fixed exit code
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    exit_code: Option<i32>,
}

impl RecordingRunner {
    /// A runner whose commands all succeed
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            exit_code: Some(0),
        })
    }

    /// A runner whose commands all exit with `code`
    pub fn failing(code: i32) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            exit_code: Some(code),
        })
    }

    /// Program names of the recorded commands, in order
    pub fn programs(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|argv| argv.first().cloned())
            .collect()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, argv: &[String]) -> Result<Option<i32>, String> {
        self.calls.lock().unwrap().push(argv.to_vec());
        Ok(self.exit_code)
    }
}

/// A cloneable in-memory writer for backend output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
