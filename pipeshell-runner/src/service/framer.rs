//! Record framing
//!
//! Turns an arbitrary sequence of byte writes into newline-delimited
//! records. Record content is opaque: nothing here parses JSON.

/// Accumulates written bytes and splits them into complete records
///
/// Invariant: once the iterator returned by [`feed`](Self::feed) has been
/// exhausted, the buffer holds exactly the bytes written so far that are not
/// yet followed by a newline.
#[derive(Debug, Default)]
pub struct RecordFramer {
    buffer: Vec<u8>,
    /// Length of the buffer prefix already searched without finding a newline
    scanned: usize,
}

impl RecordFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns the complete records now available
    ///
    /// Records are yielded lazily, oldest first, with the newline stripped.
    /// Records that are not pulled from the iterator stay buffered and come
    /// out first on the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Records<'_> {
        self.buffer.extend_from_slice(bytes);
        Records {
            search_from: self.scanned,
            buffer: &mut self.buffer,
            scanned: &mut self.scanned,
            start: 0,
        }
    }

    /// Takes whatever is left in the buffer as a final record
    ///
    /// Returns `None` when nothing is buffered. Meant to be called once at
    /// shutdown so a trailing write without a newline is not lost.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    /// Bytes waiting for a terminator
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}

/// Lazy iterator over complete records, see [`RecordFramer::feed`]
#[derive(Debug)]
pub struct Records<'a> {
    buffer: &'a mut Vec<u8>,
    scanned: &'a mut usize,
    /// Offset of the first byte not yet yielded
    start: usize,
    /// Offset where the next newline search begins
    search_from: usize,
}

impl Iterator for Records<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        let Some(offset) = self.buffer[self.search_from..]
            .iter()
            .position(|b| *b == b'\n')
        else {
            self.search_from = self.buffer.len();
            return None;
        };

        let end = self.search_from + offset;
        let record = self.buffer[self.start..end].to_vec();
        self.start = end + 1;
        self.search_from = self.start;
        Some(record)
    }
}

impl Drop for Records<'_> {
    fn drop(&mut self) {
        self.buffer.drain(..self.start);
        *self.scanned = self.search_from - self.start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(framer: &mut RecordFramer, bytes: &[u8]) -> Vec<String> {
        framer
            .feed(bytes)
            .map(|r| String::from_utf8(r).unwrap())
            .collect()
    }

    #[test]
    fn test_single_complete_record() {
        let mut framer = RecordFramer::new();
        assert_eq!(feed_all(&mut framer, b"hello\n"), vec!["hello"]);
        assert!(framer.buffered().is_empty());
    }

    #[test]
    fn test_partial_tail_is_preserved() {
        let mut framer = RecordFramer::new();

        assert!(feed_all(&mut framer, b"abc").is_empty());
        assert_eq!(framer.buffered(), b"abc");

        assert_eq!(feed_all(&mut framer, b"def\n"), vec!["abcdef"]);
        assert!(framer.buffered().is_empty());
    }

    #[test]
    fn test_multiple_records_in_one_write() {
        let mut framer = RecordFramer::new();
        let records = feed_all(&mut framer, b"one\ntwo\nthree\nfour");

        assert_eq!(records, vec!["one", "two", "three"]);
        assert_eq!(framer.buffered(), b"four");
    }

    #[test]
    fn test_any_chunking_yields_same_records() {
        let stream = b"{\"msg\":\"first\"}\n{\"msg\":\"second\"}\n\n{\"msg\":\"third\"}\n";
        let expected = vec![
            "{\"msg\":\"first\"}",
            "{\"msg\":\"second\"}",
            "",
            "{\"msg\":\"third\"}",
        ];

        for chunk_size in 1..=stream.len() {
            let mut framer = RecordFramer::new();
            let mut records = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                records.extend(feed_all(&mut framer, chunk));
            }

            assert_eq!(records, expected, "chunk size {}", chunk_size);
            assert!(framer.buffered().is_empty());
        }
    }

    #[test]
    fn test_every_split_point_yields_same_records() {
        let stream = b"alpha\nbeta\ngamma\n";

        for split in 0..=stream.len() {
            let mut framer = RecordFramer::new();
            let mut records = feed_all(&mut framer, &stream[..split]);
            records.extend(feed_all(&mut framer, &stream[split..]));

            assert_eq!(records, vec!["alpha", "beta", "gamma"], "split at {}", split);
        }
    }

    #[test]
    fn test_same_record_twice_is_not_merged() {
        let mut framer = RecordFramer::new();

        assert_eq!(feed_all(&mut framer, b"{\"a\":1}\n"), vec!["{\"a\":1}"]);
        assert_eq!(feed_all(&mut framer, b"{\"a\":1}\n"), vec!["{\"a\":1}"]);
        assert_eq!(
            feed_all(&mut framer, b"{\"a\":1}\n{\"a\":1}\n"),
            vec!["{\"a\":1}", "{\"a\":1}"]
        );
    }

    #[test]
    fn test_unconsumed_records_stay_buffered() {
        let mut framer = RecordFramer::new();

        let first = framer.feed(b"one\ntwo\nthr").next();
        assert_eq!(first, Some(b"one".to_vec()));
        assert_eq!(framer.buffered(), b"two\nthr");

        assert_eq!(feed_all(&mut framer, b"ee\n"), vec!["two", "three"]);
    }

    #[test]
    fn test_flush_returns_trailing_fragment_once() {
        let mut framer = RecordFramer::new();
        assert!(framer.flush().is_none());

        let _ = feed_all(&mut framer, b"done\npartial");
        assert_eq!(framer.flush(), Some(b"partial".to_vec()));
        assert!(framer.flush().is_none());
        assert!(framer.buffered().is_empty());
    }

    #[test]
    fn test_partial_tail_is_not_searched_again() {
        let mut framer = RecordFramer::new();

        for _ in 0..1000 {
            assert!(feed_all(&mut framer, b"x").is_empty());
        }
        assert_eq!(framer.scanned, 1000);

        let records = feed_all(&mut framer, b"y\nrest");
        assert_eq!(records, vec!["x".repeat(1000) + "y"]);
        assert_eq!(framer.buffered(), b"rest");
        assert_eq!(framer.scanned, 4);

        assert_eq!(framer.flush(), Some(b"rest".to_vec()));
        assert_eq!(framer.scanned, 0);
    }

    #[test]
    fn test_early_drop_rescans_pending_records() {
        let mut framer = RecordFramer::new();

        let _ = framer.feed(b"a\nb\nc").next();
        assert_eq!(framer.scanned, 0);
        assert_eq!(feed_all(&mut framer, b"\n"), vec!["b", "c"]);
    }

    #[test]
    fn test_carriage_return_is_record_content() {
        let mut framer = RecordFramer::new();
        assert_eq!(framer.feed(b"line\r\n").collect::<Vec<_>>(), vec![b"line\r".to_vec()]);
    }
}
