//! Incremental frame decoding.
//!
//! Network reads can split a frame anywhere, including inside a multi-byte
//! UTF-8 sequence, so the decoder buffers raw bytes and only interprets a
//! line once its terminating `\n` has arrived.

use crate::{ERROR_TAG, Frame, SNAPSHOT_TAG, TEXT_TAG, WireError};
use tracing::trace;
use uigen_vfs::Snapshot;

/// Streaming decoder: feed it chunks, get whole frames back.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, WireError> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let line =
                std::str::from_utf8(&raw[..raw.len() - 1]).map_err(|_| WireError::InvalidUtf8)?;
            if let Some(frame) = decode_line(line)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Bytes received but not yet terminated by a newline.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Signal end of input. Fails if a partial frame is left over.
    pub fn finish(self) -> Result<(), WireError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(WireError::UnexpectedEof {
                pending: self.buf.len(),
            })
        }
    }
}

/// Decode a complete buffer.
pub fn decode_all(input: &str) -> Result<Vec<Frame>, WireError> {
    let mut decoder = FrameDecoder::new();
    let frames = decoder.push(input.as_bytes())?;
    decoder.finish()?;
    Ok(frames)
}

/// Decode one line without its trailing newline.
///
/// Returns `Ok(None)` for blank lines and unknown tags.
pub fn decode_line(line: &str) -> Result<Option<Frame>, WireError> {
    if line.is_empty() {
        return Ok(None);
    }
    let Some((tag, payload)) = line.split_once(':') else {
        return Err(WireError::Malformed(format!("missing ':' in {line:?}")));
    };

    let frame = match tag {
        TEXT_TAG => Frame::Text(unquote(payload)?),
        ERROR_TAG => Frame::Error(unquote(payload)?),
        SNAPSHOT_TAG => Frame::Snapshot(serde_json::from_str::<Snapshot>(payload)?),
        other => {
            trace!(tag = other, "Skipping unknown frame");
            return Ok(None);
        }
    };
    Ok(Some(frame))
}

/// Strip the surrounding quotes and undo [`escape`](crate::escape) in a
/// single left-to-right pass.
fn unquote(payload: &str) -> Result<String, WireError> {
    let inner = payload
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .ok_or_else(|| WireError::Malformed(format!("unquoted payload {payload:?}")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some(other) => {
                    return Err(WireError::Malformed(format!("unknown escape '\\{other}'")));
                }
                None => return Err(WireError::Malformed("dangling escape".into())),
            },
            '"' => return Err(WireError::Malformed("unescaped quote in payload".into())),
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_error, encode_snapshot, encode_text};
    use uigen_vfs::SerializedNode;

    #[test]
    fn escape_round_trip() {
        for text in [
            "plain",
            "quote \" inside",
            "back\\slash",
            "multi\nline\r\ntext",
            "literal \\n is not a newline",
            "\\\"",
            "",
            "emoji 🎨 and ü",
        ] {
            let frames = decode_all(&encode_text(text)).unwrap();
            assert_eq!(frames, vec![Frame::Text(text.to_string())], "{text:?}");
        }
    }

    #[test]
    fn escaped_backslash_then_n_is_not_a_newline() {
        let frame = decode_line(r#"0:"a\\nb""#).unwrap().unwrap();
        assert_eq!(frame, Frame::Text("a\\nb".into()));
    }

    #[test]
    fn full_stream_decodes_in_order() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("/App.jsx", SerializedNode::file("/App.jsx", "export default 1;\n"));

        let body = format!(
            "{}{}{}",
            encode_text("Creating "),
            encode_text("the app"),
            encode_snapshot(&snapshot).unwrap()
        );
        let frames = decode_all(&body).unwrap();
        assert_eq!(
            frames,
            vec![
                Frame::Text("Creating ".into()),
                Frame::Text("the app".into()),
                Frame::Snapshot(snapshot),
            ]
        );
    }

    #[test]
    fn chunks_split_anywhere() {
        let body = format!("{}{}", encode_text("héllo\nwörld"), encode_error("bad gateway"));
        let bytes = body.as_bytes();

        for split in 1..bytes.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = decoder.push(&bytes[..split]).unwrap();
            frames.extend(decoder.push(&bytes[split..]).unwrap());
            decoder.finish().unwrap();
            assert_eq!(
                frames,
                vec![
                    Frame::Text("héllo\nwörld".into()),
                    Frame::Error("bad gateway".into()),
                ],
                "split at {split}"
            );
        }
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let frames = decode_all("2:[{\"x\":1}]\n0:\"hi\"\n\n").unwrap();
        assert_eq!(frames, vec![Frame::Text("hi".into())]);
    }

    #[test]
    fn partial_line_at_eof_is_an_error() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"0:\"unterminated").unwrap().is_empty());
        assert_eq!(decoder.pending(), 15);
        assert!(matches!(
            decoder.finish(),
            Err(WireError::UnexpectedEof { pending: 15 })
        ));
    }

    #[test]
    fn malformed_frames_rejected() {
        assert!(decode_line("no colon here").is_err());
        assert!(decode_line("0:unquoted").is_err());
        assert!(decode_line("0:\"").is_err());
        assert!(decode_line(r#"0:"bad \q escape""#).is_err());
        assert!(decode_line(r#"0:"stray " quote""#).is_err());
        assert!(matches!(decode_line("1:{not json"), Err(WireError::Json(_))));
    }

    #[test]
    fn invalid_utf8_rejected() {
        let mut decoder = FrameDecoder::new();
        let err = decoder.push(b"0:\"\xff\"\n").unwrap_err();
        assert!(matches!(err, WireError::InvalidUtf8));
    }
}
