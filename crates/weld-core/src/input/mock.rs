use super::{InputEvent, InputEvents, InputSource};

/// Replays one pre-recorded batch per poll, then reports nothing.
#[derive(Debug, Clone)]
pub struct ScriptedInput<'a> {
    batches: &'a [&'a [InputEvent]],
    cursor: usize,
}

impl<'a> ScriptedInput<'a> {
    pub const fn new(batches: &'a [&'a [InputEvent]]) -> Self {
        Self { batches, cursor: 0 }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.batches.len()
    }
}

impl InputSource for ScriptedInput<'_> {
    type Error = core::convert::Infallible;

    fn poll(&mut self, _now_ms: u64) -> Result<InputEvents, Self::Error> {
        let Some(batch) = self.batches.get(self.cursor) else {
            return Ok(InputEvents::new());
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(batch.iter().copied().collect())
    }
}
