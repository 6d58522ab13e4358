//! `uigen chat`: Send one prompt to a gateway and render the frame stream.

use futures::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use uigen_vfs::Snapshot;
use uigen_wire::{Frame, FrameDecoder};

pub struct ChatArgs {
    pub prompt: String,
    pub url: String,
    pub files: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub project: Option<String>,
}

/// What a finished stream produced.
#[derive(Debug, Default)]
struct Transcript {
    text: String,
    snapshot: Option<Snapshot>,
}

impl Transcript {
    /// Apply one frame, echoing text to `out`. An error frame ends the stream.
    fn apply(&mut self, frame: Frame, out: &mut impl Write) -> Result<(), String> {
        match frame {
            Frame::Text(text) => {
                self.text.push_str(&text);
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
                Ok(())
            }
            Frame::Snapshot(snapshot) => {
                self.snapshot = Some(snapshot);
                Ok(())
            }
            Frame::Error(message) => Err(format!("Generation failed: {message}")),
        }
    }
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = match &args.files {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
            Some(serde_json::from_str::<serde_json::Value>(&raw)?)
        }
        None => None,
    };

    let body = serde_json::json!({
        "messages": [{"role": "user", "content": args.prompt}],
        "files": files,
        "projectId": args.project,
    });

    let endpoint = format!("{}/api/chat", args.url.trim_end_matches('/'));
    tracing::debug!(endpoint = %endpoint, "Sending chat request");
    let response = reqwest::Client::new().post(&endpoint).json(&body).send().await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                let error = v["error"].as_str()?.to_string();
                Some(match v["details"].as_str() {
                    Some(details) => format!("{error} ({details})"),
                    None => error,
                })
            })
            .unwrap_or(text);
        return Err(format!("Gateway returned {status}: {detail}").into());
    }

    let mut decoder = FrameDecoder::new();
    let mut transcript = Transcript::default();
    let mut stdout = std::io::stdout();
    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        for frame in decoder.push(&chunk?)? {
            transcript.apply(frame, &mut stdout)?;
        }
    }
    decoder.finish()?;
    if !transcript.text.is_empty() {
        println!();
    }

    let snapshot = transcript
        .snapshot
        .ok_or("Stream ended without a snapshot")?;
    eprintln!("{} file(s) in project", snapshot.file_count());

    if let Some(out) = &args.out {
        std::fs::write(out, serde_json::to_string_pretty(&snapshot)?)?;
        eprintln!("Snapshot written to {}", out.display());
    } else {
        for (path, _) in snapshot.files() {
            eprintln!("  {path}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uigen_vfs::SerializedNode;

    #[test]
    fn transcript_collects_text_and_snapshot() {
        let mut files = Snapshot::new();
        files.insert("/App.jsx", SerializedNode::file("/App.jsx", "x"));

        let mut out = Vec::new();
        let mut transcript = Transcript::default();
        transcript.apply(Frame::Text("Hello ".into()), &mut out).unwrap();
        transcript.apply(Frame::Text("there".into()), &mut out).unwrap();
        transcript.apply(Frame::Snapshot(files.clone()), &mut out).unwrap();

        assert_eq!(out, b"Hello there");
        assert_eq!(transcript.text, "Hello there");
        assert_eq!(transcript.snapshot, Some(files));
    }

    #[test]
    fn error_frame_fails() {
        let mut transcript = Transcript::default();
        let err = transcript
            .apply(Frame::Error("overloaded".into()), &mut Vec::new())
            .unwrap_err();
        assert!(err.contains("overloaded"));
    }
}
