/// The landmark feed: newline-delimited JSON detection frames from a detector process, a file or stdin.
use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::core::landmarks::DetectionFrame;

/// Where detections come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSpec {
    /// No detector; the pointer emulator synthesizes frames.
    Emulated,
    Replay(PathBuf),
    Stdin,
    /// A detector command line; its stdout is the feed.
    Detector(String),
}

impl FeedSpec {
    pub fn describe(&self) -> String {
        match self {
            FeedSpec::Emulated => "emulator".to_string(),
            FeedSpec::Replay(path) => format!("replay {}", path.display()),
            FeedSpec::Stdin => "stdin".to_string(),
            FeedSpec::Detector(cmd) => format!("detector `{cmd}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Frame(DetectionFrame),
    /// A line that could not be used; the game keeps its previous input.
    Skipped,
    Closed,
}

type LineReader = Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>;

/// An open feed. Dropping it kills the detector process, which releases the camera.
pub struct LandmarkFeed {
    lines: LineReader,
    _child: Option<Child>,
    mirror: bool,
    failures: u32,
    max_failures: u32,
    frames: u64,
    /// Recorded feeds are pulled once per tick instead of as fast as they can be read.
    paced: bool,
}

impl LandmarkFeed {
    /// Opens the source. Failing here means no camera: the caller aborts before the UI starts.
    pub async fn open(spec: &FeedSpec, mirror: bool, max_failures: u32) -> Result<Option<Self>> {
        let (reader, child): (Box<dyn AsyncRead + Unpin + Send>, Option<Child>) = match spec {
            FeedSpec::Emulated => return Ok(None),
            FeedSpec::Replay(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open landmark replay {}", path.display()))?;
                let feed = Self::from_reader(Box::new(file), None, mirror, max_failures).paced();
                info!(source = %spec.describe(), mirror, "landmark feed opened");
                return Ok(Some(feed));
            }
            FeedSpec::Stdin => (Box::new(tokio::io::stdin()), None),
            FeedSpec::Detector(cmdline) => {
                let mut parts = cmdline.split_whitespace();
                let Some(program) = parts.next() else {
                    bail!("detector command is empty");
                };
                let mut child = Command::new(program)
                    .args(parts)
                    .stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::null())
                    .kill_on_drop(true)
                    .spawn()
                    .with_context(|| format!("failed to start detector `{cmdline}`"))?;
                let Some(stdout) = child.stdout.take() else {
                    bail!("detector `{cmdline}` has no stdout");
                };
                (Box::new(stdout), Some(child))
            }
        };
        info!(source = %spec.describe(), mirror, "landmark feed opened");
        Ok(Some(Self::from_reader(reader, child, mirror, max_failures)))
    }

    pub fn from_reader(
        reader: Box<dyn AsyncRead + Unpin + Send>,
        child: Option<Child>,
        mirror: bool,
        max_failures: u32,
    ) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            _child: child,
            mirror,
            failures: 0,
            max_failures,
            frames: 0,
            paced: false,
        }
    }

    /// Marks the feed as recorded: the engine reads one line per playing tick.
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }

    pub fn is_paced(&self) -> bool {
        self.paced
    }

    /// Reads the next line. Cancel safe, so it can sit in a `select!`.
    ///
    /// Errors only once `max_failures` consecutive lines were unusable.
    pub async fn next_event(&mut self) -> Result<FeedEvent> {
        let line = match self.lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!(frames = self.frames, "landmark feed closed");
                return Ok(FeedEvent::Closed);
            }
            Err(e) => {
                warn!(error = ?e, "landmark feed read failed");
                return self.fail();
            }
        };
        if line.trim().is_empty() {
            return Ok(FeedEvent::Skipped);
        }
        match parse_frame(&line, self.mirror) {
            Ok(frame) => {
                self.failures = 0;
                self.frames += 1;
                Ok(FeedEvent::Frame(frame))
            }
            Err(e) => {
                warn!(error = %e, "skipping malformed landmark frame");
                self.fail()
            }
        }
    }

    fn fail(&mut self) -> Result<FeedEvent> {
        self.failures += 1;
        debug!(failures = self.failures, max = self.max_failures, "feed failure");
        if self.failures >= self.max_failures {
            bail!("landmark feed failed {} times in a row", self.failures);
        }
        Ok(FeedEvent::Skipped)
    }
}

pub fn parse_frame(line: &str, mirror: bool) -> Result<DetectionFrame> {
    let frame: DetectionFrame = serde_json::from_str(line).context("invalid detection frame")?;
    let frame = frame.sanitize();
    Ok(if mirror { frame.mirrored() } else { frame })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(text: &'static str, max_failures: u32) -> LandmarkFeed {
        LandmarkFeed::from_reader(Box::new(text.as_bytes()), None, false, max_failures)
    }

    #[tokio::test]
    async fn reads_frames_then_closes() {
        let mut f = feed("{\"objects\":[{\"label\":\"cup\",\"confidence\":0.9,\"bbox\":[0,0,0.5,0.5]}]}\n{}\n", 3);
        match f.next_event().await.unwrap() {
            FeedEvent::Frame(frame) => assert_eq!(frame.objects[0].label, "cup"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(f.next_event().await.unwrap(), FeedEvent::Frame(DetectionFrame::default()));
        assert_eq!(f.next_event().await.unwrap(), FeedEvent::Closed);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_until_the_limit() {
        let mut f = feed("nope\n{}\nbad\nworse\n", 2);
        assert_eq!(f.next_event().await.unwrap(), FeedEvent::Skipped);
        assert!(matches!(f.next_event().await.unwrap(), FeedEvent::Frame(_)));
        assert_eq!(f.next_event().await.unwrap(), FeedEvent::Skipped);
        assert!(f.next_event().await.is_err());
    }

    #[tokio::test]
    async fn missing_replay_file_fails_to_open() {
        let spec = FeedSpec::Replay(PathBuf::from("/no/such/replay.jsonl"));
        let err = LandmarkFeed::open(&spec, true, 5).await.err().unwrap();
        assert!(format!("{err:#}").contains("failed to open landmark replay"));
    }

    #[tokio::test]
    async fn replay_files_are_paced() {
        let path = std::env::temp_dir().join(format!("camterm-replay-{}.jsonl", std::process::id()));
        std::fs::write(&path, "{}\n").unwrap();
        let replay = LandmarkFeed::open(&FeedSpec::Replay(path.clone()), false, 5).await.unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(replay.is_paced());
        assert!(!feed("{}\n", 3).is_paced());
    }

    #[tokio::test]
    async fn emulated_spec_opens_nothing() {
        assert!(LandmarkFeed::open(&FeedSpec::Emulated, true, 5).await.unwrap().is_none());
    }
}
