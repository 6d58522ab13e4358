//! Frame encoding.

use crate::{ERROR_TAG, SNAPSHOT_TAG, TEXT_TAG, WireError};
use uigen_vfs::Snapshot;

/// Escape text for a quoted payload.
///
/// Backslash, double quote, newline and carriage return are the only
/// characters rewritten; everything else passes through.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// `0:"<escaped>"\n`
pub fn encode_text(text: &str) -> String {
    quoted(TEXT_TAG, text)
}

/// `3:"<escaped>"\n`
pub fn encode_error(message: &str) -> String {
    quoted(ERROR_TAG, message)
}

/// `1:<json>\n`
pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, WireError> {
    let json = serde_json::to_string(snapshot)?;
    Ok(format!("{SNAPSHOT_TAG}:{json}\n"))
}

fn quoted(tag: &str, text: &str) -> String {
    format!("{tag}:\"{}\"\n", escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uigen_vfs::SerializedNode;

    #[test]
    fn text_frame_escapes_specials() {
        assert_eq!(encode_text("hello"), "0:\"hello\"\n");
        assert_eq!(
            encode_text("say \"hi\"\nC:\\dir\r"),
            "0:\"say \\\"hi\\\"\\nC:\\\\dir\\r\"\n"
        );
    }

    #[test]
    fn encoded_frame_is_a_single_line() {
        let frame = encode_text("a\nb\nc\n");
        assert_eq!(frame.matches('\n').count(), 1);
        assert!(frame.ends_with('\n'));
    }

    #[test]
    fn error_frame_uses_error_tag() {
        assert_eq!(encode_error("boom"), "3:\"boom\"\n");
    }

    #[test]
    fn snapshot_frame_carries_json() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("/App.jsx", SerializedNode::file("/App.jsx", "line1\nline2"));
        let frame = encode_snapshot(&snapshot).unwrap();
        assert!(frame.starts_with("1:{"));
        assert!(frame.ends_with("}\n"));
        assert_eq!(frame.matches('\n').count(), 1);
    }
}
