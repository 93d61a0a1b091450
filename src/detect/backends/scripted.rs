use std::collections::VecDeque;
use std::io::BufRead;

use anyhow::{anyhow, Result};

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{RawPrediction, PERSON_CLASS};
use crate::frame::Frame;

/// Replays recorded prediction batches, one per frame.
///
/// Used for tests and for driving the monitor from captured model output.
/// Once the script runs out the backend reports empty batches, unless it was
/// built with `repeating(true)`, in which case it starts over.
pub struct ScriptedBackend {
    script: Vec<Vec<RawPrediction>>,
    pending: VecDeque<usize>,
    repeat: bool,
    classes: Vec<String>,
    frames_seen: u64,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Vec<RawPrediction>>) -> Self {
        let pending = (0..script.len()).collect();
        Self {
            script,
            pending,
            repeat: false,
            classes: vec![PERSON_CLASS.to_string()],
            frames_seen: 0,
        }
    }

    /// Parse a JSON-lines script: each non-blank line is an array of predictions.
    pub fn from_json_lines<R: BufRead>(reader: R) -> Result<Self> {
        let mut script = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let batch: Vec<RawPrediction> = serde_json::from_str(&line)
                .map_err(|e| anyhow!("invalid prediction batch on line {}: {}", line_no + 1, e))?;
            script.push(batch);
        }
        Ok(Self::new(script))
    }

    pub fn repeating(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    /// Class labels this script is declared to emit.
    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Batches not yet replayed.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl DetectorBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn supports_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawPrediction>> {
        self.frames_seen += 1;

        if self.pending.is_empty() && self.repeat {
            self.pending.extend(0..self.script.len());
        }

        match self.pending.pop_front() {
            Some(idx) => {
                let batch = self.script[idx].clone();
                log::debug!(
                    "scripted backend: frame {} ({}x{}) -> {} predictions",
                    self.frames_seen,
                    frame.width,
                    frame.height,
                    batch.len()
                );
                Ok(batch)
            }
            None => Ok(Vec::new()),
        }
    }
}
