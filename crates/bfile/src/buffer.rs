use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::error::EditorError;

/// Spacing between virtual line numbers assigned by [`LineBuffer::load`].
pub const DEFAULT_GAP: u32 = 10;

/// Sparse mapping from virtual line number to line content.
///
/// Lines are stored under gap-spaced numbers (10, 20, 30, ...) so a new line can be
/// placed between two existing ones without touching the rest of the file. All
/// stored numbers are at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    lines: BTreeMap<i64, String>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, line: i64) -> Option<&str> {
        self.lines.get(&line).map(String::as_str)
    }

    /// Virtual line numbers in ascending order.
    pub fn numbers(&self) -> impl Iterator<Item = i64> + '_ {
        self.lines.keys().copied()
    }

    /// Insert or overwrite the line stored under `line`.
    pub fn set_line(&mut self, line: i64, content: impl Into<String>) -> Result<(), EditorError> {
        if line <= 0 {
            return Err(EditorError::InvalidLineNumber(line));
        }

        self.lines.insert(line, content.into());
        Ok(())
    }

    /// Render lines under their stored virtual numbers, e.g. `[20] PRINT X`.
    ///
    /// `None` lists the whole buffer, `Some(from..=to)` only the lines inside it.
    pub fn list_by_virtual_number(
        &self,
        range: Option<RangeInclusive<i64>>,
    ) -> Result<Vec<String>, EditorError> {
        check_range(range.as_ref())?;

        let filtered = self
            .lines
            .iter()
            .map(|(&number, content)| (number, content.as_str()))
            .filter(|(number, _)| range.as_ref().map_or(true, |r| r.contains(number)));

        Ok(render(filtered))
    }

    /// Render lines under their dense 1-based position, as they would be numbered in
    /// the saved file. Stored numbers are left untouched.
    pub fn list_by_position(
        &self,
        range: Option<RangeInclusive<i64>>,
    ) -> Result<Vec<String>, EditorError> {
        check_range(range.as_ref())?;

        let filtered = self
            .lines
            .values()
            .zip(1_i64..)
            .map(|(content, position)| (position, content.as_str()))
            .filter(|(position, _)| range.as_ref().map_or(true, |r| r.contains(position)));

        Ok(render(filtered))
    }

    /// Move every line numbered `from` or above forward by `offset`.
    ///
    /// A non-negative offset always succeeds. A negative one is checked against the
    /// whole buffer first and rejected if a line would drop to 0 or land on another.
    pub fn shift_forward(&mut self, from: i64, offset: i64) -> Result<(), EditorError> {
        self.remap(offset, |number| {
            if number >= from {
                number.checked_add(offset)
            } else {
                Some(number)
            }
        })
    }

    /// Move every line numbered `from` or below back by `offset`.
    ///
    /// Fails without touching the buffer if any line is numbered `offset` or lower.
    pub fn shift_backward(&mut self, from: i64, offset: i64) -> Result<(), EditorError> {
        if self.lines.keys().any(|&number| number <= offset) {
            return Err(EditorError::WouldUnderflow { offset });
        }

        self.remap(offset, |number| {
            if number <= from {
                number.checked_sub(offset)
            } else {
                Some(number)
            }
        })
    }

    /// Replace the buffer with `lines`, numbered `gap, 2 * gap, 3 * gap, ...`.
    ///
    /// A gap of zero is treated as one.
    pub fn load<I, S>(&mut self, lines: I, gap: u32)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clear();

        let gap = i64::from(gap.max(1));
        for (index, line) in (1_i64..).zip(lines) {
            self.lines.insert(index * gap, line.into());
        }
    }

    /// Line contents in ascending virtual order, ready to be written out.
    pub fn drain(&self) -> Vec<String> {
        self.lines.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // All-or-nothing renumbering: every target is validated before any key moves.
    fn remap<F>(&mut self, offset: i64, map: F) -> Result<(), EditorError>
    where
        F: Fn(i64) -> Option<i64>,
    {
        let targets = self
            .lines
            .keys()
            .map(|&number| map(number))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| EditorError::MalformedArgument(offset.to_string()))?;

        let mut seen = BTreeSet::new();
        for &target in &targets {
            if target <= 0 {
                return Err(EditorError::WouldUnderflow { offset });
            }
            if !seen.insert(target) {
                return Err(EditorError::LineCollision(target));
            }
        }

        let lines = std::mem::take(&mut self.lines);
        self.lines = targets.into_iter().zip(lines.into_values()).collect();
        Ok(())
    }
}

fn check_range(range: Option<&RangeInclusive<i64>>) -> Result<(), EditorError> {
    match range {
        Some(r) if r.end() < r.start() => Err(EditorError::InvalidRange {
            from: *r.start(),
            to: *r.end(),
        }),
        _ => Ok(()),
    }
}

fn render<'a>(entries: impl Iterator<Item = (i64, &'a str)>) -> Vec<String> {
    let entries: Vec<_> = entries.collect();
    let width = entries
        .iter()
        .map(|(number, _)| *number)
        .max()
        .map_or(1, digit_width);

    entries
        .into_iter()
        .map(|(number, content)| format!("[{number:>width$}] {content}"))
        .collect()
}

fn digit_width(number: i64) -> usize {
    number.to_string().len()
}
