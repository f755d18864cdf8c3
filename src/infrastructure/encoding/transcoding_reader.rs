// ============================================================
// TRANSCODING READER
// ============================================================
// Streams any encoding_rs encoding as UTF-8 with bounded buffers

use std::io::{self, Read};

use encoding_rs::{CoderResult, Decoder, Encoding};

const INPUT_CAPACITY: usize = 8 * 1024;
const OUTPUT_CAPACITY: usize = 32 * 1024;

/// `Read` adapter that converts the wrapped byte stream to UTF-8
///
/// Malformed input is replaced with U+FFFD. A BOM is honoured and removed.
pub struct TranscodingReader<R> {
    inner: R,
    decoder: Decoder,
    input: Box<[u8]>,
    input_start: usize,
    input_end: usize,
    output: Box<[u8]>,
    output_start: usize,
    output_end: usize,
    input_done: bool,
    finished: bool,
}

impl<R: Read> TranscodingReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            decoder: encoding.new_decoder_with_bom_removal(),
            input: vec![0u8; INPUT_CAPACITY].into_boxed_slice(),
            input_start: 0,
            input_end: 0,
            output: vec![0u8; OUTPUT_CAPACITY].into_boxed_slice(),
            output_start: 0,
            output_end: 0,
            input_done: false,
            finished: false,
        }
    }

    fn fill_output(&mut self) -> io::Result<()> {
        self.output_start = 0;
        self.output_end = 0;

        while self.output_end == 0 && !self.finished {
            if self.input_start == self.input_end && !self.input_done {
                let n = self.inner.read(&mut self.input)?;
                self.input_start = 0;
                self.input_end = n;
                self.input_done = n == 0;
            }

            let (result, read, written, _) = self.decoder.decode_to_utf8(
                &self.input[self.input_start..self.input_end],
                &mut self.output[self.output_end..],
                self.input_done,
            );
            self.input_start += read;
            self.output_end += written;

            if self.input_done && result == CoderResult::InputEmpty {
                self.finished = true;
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for TranscodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.output_start == self.output_end {
            self.fill_output()?;
        }
        let available = &self.output[self.output_start..self.output_end];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.output_start += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{GBK, UTF_16LE};

    fn transcode(bytes: &[u8], encoding: &'static Encoding) -> String {
        let mut out = String::new();
        TranscodingReader::new(bytes, encoding)
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_utf16_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "id,名前\n1,太郎\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(transcode(&bytes, UTF_16LE), "id,名前\n1,太郎\n");
    }

    #[test]
    fn test_gbk_larger_than_buffers() {
        let text = "城市,人口\n北京,2189\n".repeat(4000);
        let (bytes, _, _) = GBK.encode(&text);
        assert!(bytes.len() > INPUT_CAPACITY * 4);
        assert_eq!(transcode(&bytes, GBK), text);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(transcode(b"", GBK), "");
    }
}
