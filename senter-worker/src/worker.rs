//! Blocking request loop: one JSON line in, one JSON line out.

use std::io::{self, BufRead, Read, Write};
use std::panic::{self, AssertUnwindSafe};

use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

use crate::model::response::Response;
use crate::protocol::{Dispatcher, RequestError};
use crate::services::segmenter::Segmenter;

/// Longest request line accepted by default, in bytes, newline excluded.
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to read request line: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
    #[error("failed to write response: {source}")]
    Write {
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize response: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Counters reported when the input ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeSummary {
    pub responses: usize,
    pub failures: usize,
    pub skipped: usize,
}

/// Serves requests from `reader` until end-of-stream.
///
/// Each non-blank line gets exactly one response line on `writer`, flushed
/// before the next line is read. Per-line failures become error responses.
/// Lines longer than `max_line_bytes` are discarded unparsed.
///
/// # Errors
///
/// Returns an error if reading input or writing a response fails.
pub fn serve<S: Segmenter>(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    dispatcher: &Dispatcher<S>,
    max_line_bytes: usize,
) -> Result<ServeSummary, WorkerError> {
    let mut summary = ServeSummary::default();
    let mut buf: Vec<u8> = Vec::new();
    let mut first_line = true;

    loop {
        buf.clear();
        let line_read = read_line(reader, &mut buf, max_line_bytes)
            .map_err(|source| WorkerError::Read { source })?;

        let response = match line_read {
            LineRead::Eof => break,
            LineRead::TooLong => {
                tracing::warn!(max_line_bytes, "request line too long, discarded");
                first_line = false;
                Response::failure(
                    Response::missing_id(),
                    RequestError::LineTooLong { max_line_bytes }.to_string(),
                )
            }
            LineRead::Line => {
                let mut bytes = buf.as_slice();
                if first_line {
                    bytes = strip_utf8_bom(bytes);
                    first_line = false;
                }

                match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
                    Some(text) => {
                        let line = text.trim();
                        if line.is_empty() {
                            summary.skipped += 1;
                            continue;
                        }
                        tracing::debug!(bytes = line.len(), "request line received");
                        handle_guarded(dispatcher, line)
                    }
                    None => {
                        tracing::warn!("request line is not valid UTF-8");
                        Response::failure(
                            Response::missing_id(),
                            RequestError::InvalidEncoding.to_string(),
                        )
                    }
                }
            }
        };

        if response.is_failure() {
            summary.failures += 1;
        }

        write_response(writer, &response)?;
        summary.responses += 1;
    }

    Ok(summary)
}

enum LineRead {
    Eof,
    Line,
    TooLong,
}

/// Reads one line into `buf`, buffering at most `max_bytes` plus the line
/// terminator. An overlong line is consumed up to and including its newline.
fn read_line(
    reader: &mut impl BufRead,
    buf: &mut Vec<u8>,
    max_bytes: usize,
) -> io::Result<LineRead> {
    // Room for "\r\n" on top of the content.
    let limit = u64::try_from(max_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(2);

    let read = (&mut *reader).take(limit).read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }

    let complete = buf.ends_with(b"\n");
    let content = buf.strip_suffix(b"\n").unwrap_or(buf.as_slice());
    let content = content.strip_suffix(b"\r").unwrap_or(content);
    if content.len() <= max_bytes {
        return Ok(LineRead::Line);
    }

    if !complete {
        discard_rest_of_line(reader)?;
    }
    Ok(LineRead::TooLong)
}

fn discard_rest_of_line(reader: &mut impl BufRead) -> io::Result<()> {
    loop {
        let (found, used) = {
            let available = reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(pos) => (true, pos + 1),
                None => (false, available.len()),
            }
        };

        reader.consume(used);
        if found {
            return Ok(());
        }
    }
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) if encoding == UTF_8 => &bytes[bom_len..],
        _ => bytes,
    }
}

fn handle_guarded<S: Segmenter>(dispatcher: &Dispatcher<S>, line: &str) -> Response {
    panic::catch_unwind(AssertUnwindSafe(|| dispatcher.handle(line))).unwrap_or_else(|_| {
        tracing::error!("request handler panicked");
        Response::failure(Response::missing_id(), "internal worker error")
    })
}

fn write_response(writer: &mut impl Write, response: &Response) -> Result<(), WorkerError> {
    let line =
        serde_json::to_string(response).map_err(|source| WorkerError::Serialize { source })?;

    writeln!(writer, "{line}").map_err(|source| WorkerError::Write { source })?;
    writer
        .flush()
        .map_err(|source| WorkerError::Write { source })
}
