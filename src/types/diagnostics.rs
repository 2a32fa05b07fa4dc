use std::fmt::Write;

/// Accumulates rule-loading error text across one compilation pass.
///
/// The first record into an empty buffer writes a header naming the source
/// and position; later records only append. Reading the buffer drains it, so
/// a second read starts a fresh report.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    buffer: String,
}

impl Diagnostics {
    pub(crate) fn record(
        &mut self,
        file: &str,
        line: usize,
        column: usize,
        message: &str,
        context: &str,
    ) {
        if self.buffer.is_empty() {
            let _ = write!(
                self.buffer,
                "Rules error. File: {file}. Line: {line}. Column: {column}. "
            );
        }
        if !message.is_empty() {
            self.buffer.push_str(message);
            self.buffer.push(' ');
        }
        if !context.is_empty() {
            self.buffer.push_str(context);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub(crate) fn drain(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
