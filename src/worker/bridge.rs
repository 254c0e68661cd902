//! Line-delimited JSON transport between the display surface and the worker.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::domain::error::Result;
use crate::picker::DirectoryPicker;
use crate::worker::LibraryWorker;

/// Serves requests from `input` until end of input, one JSON envelope per line.
///
/// Each response is written as a single line and flushed before the next
/// request is read. Blank lines are skipped. A line that is not valid UTF-8 is
/// decoded lossily and answered like any other malformed request. Returns the
/// number of requests answered.
///
/// # Errors
///
/// Returns an error if `input` cannot be read or `output` cannot be written.
pub fn serve<P, R, W>(worker: &mut LibraryWorker<P>, mut input: R, mut output: W) -> Result<usize>
where
    P: DirectoryPicker,
    R: BufRead,
    W: Write,
{
    let mut served = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        if matches!(line, Cow::Owned(_)) {
            tracing::warn!("request line is not valid UTF-8");
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = worker.handle_line(line);
        writeln!(output, "{reply}")?;
        output.flush()?;
        served += 1;
    }

    tracing::debug!(served = served, "input closed");
    Ok(served)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::PresetPicker;
    use crate::storage::JsonStorage;
    use serde_json::Value;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn answers_each_line_in_order() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path().join("library.json")).unwrap();
        let mut worker = LibraryWorker::new(Box::new(storage), PresetPicker::cancelled());

        let input = "\
{\"id\":1,\"request\":{\"op\":\"add-search-history\",\"keyword\":\"cat\"}}

{\"id\":2,\"request\":{\"op\":\"get-search-history\"}}
";
        let mut output = Vec::new();
        let served = serve(&mut worker, Cursor::new(input), &mut output).unwrap();
        assert_eq!(served, 2);

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[1]["id"], 2);
        assert_eq!(replies[1]["response"]["keywords"][0], "cat");
    }

    #[test]
    fn invalid_utf8_line_is_answered_and_serving_continues() {
        let dir = TempDir::new().unwrap();
        let storage = JsonStorage::new(dir.path().join("library.json")).unwrap();
        let mut worker = LibraryWorker::new(Box::new(storage), PresetPicker::cancelled());

        let mut input = Vec::new();
        input.extend_from_slice(b"{\"id\":1,\"request\":{\"op\":\"get-channels\"}}\n");
        input.extend_from_slice(b"{\"id\":2,\"request\":\xff}\n");
        input.extend_from_slice(b"{\"id\":3,\"request\":{\"op\":\"get-search-history\"}}");

        let mut output = Vec::new();
        let served = serve(&mut worker, Cursor::new(input), &mut output).unwrap();
        assert_eq!(served, 3);

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(replies[0]["response"]["kind"], "channels");
        assert_eq!(replies[1]["response"]["kind"], "failed");
        assert_eq!(replies[2]["id"], 3);
        assert_eq!(replies[2]["response"]["kind"], "search_history");
    }
}
