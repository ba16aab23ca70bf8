//! Pointer script: the host pointer-event stream as JSON lines
//!
//! Each non-blank line that does not start with `#` is either a pointer event
//!
//! ```text
//! {"stick":"aim","kind":"down","pointer_id":2,"x":680,"y":300}
//! {"stick":"aim","kind":"move","pointer_id":2,"x":710,"y":340}
//! {"stick":"aim","kind":"up","pointer_id":2}
//! ```
//!
//! or a pause, `{"pause_ms": 120}`, which delays the following lines.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::joystick::{PointerId, StickRole};
use super::vector::Point2;

/// Pointer event type, named after the DOM events it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PointerKind::Down => "pointerdown",
            PointerKind::Move => "pointermove",
            PointerKind::Up => "pointerup",
            PointerKind::Cancel => "pointercancel",
            PointerKind::Leave => "pointerleave",
        };
        write!(f, "{}", name)
    }
}

/// One pointer event addressed to a joystick widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub stick: StickRole,
    pub kind: PointerKind,
    pub pointer_id: PointerId,
    /// Client coordinates; zero for release events that carry none
    pub point: Point2,
}

/// One decoded script line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptLine {
    Pointer(PointerEvent),
    Pause(Duration),
}

#[derive(Debug, Error)]
pub enum PointerScriptError {
    #[error("line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {kind} needs both x and y")]
    MissingPoint { line: usize, kind: PointerKind },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLine {
    Pause {
        pause_ms: u64,
    },
    Pointer {
        stick: StickRole,
        kind: PointerKind,
        pointer_id: PointerId,
        x: Option<f64>,
        y: Option<f64>,
    },
}

/// Decode one script line; `Ok(None)` for blank lines and comments
pub fn parse_line(line: usize, text: &str) -> Result<Option<ScriptLine>, PointerScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let raw: RawLine = serde_json::from_str(text)
        .map_err(|source| PointerScriptError::Malformed { line, source })?;

    let parsed = match raw {
        RawLine::Pause { pause_ms } => ScriptLine::Pause(Duration::from_millis(pause_ms)),
        RawLine::Pointer {
            stick,
            kind,
            pointer_id,
            x,
            y,
        } => {
            let point = match (x, y) {
                (Some(x), Some(y)) => Point2::new(x, y),
                _ if matches!(kind, PointerKind::Down | PointerKind::Move) => {
                    return Err(PointerScriptError::MissingPoint { line, kind });
                }
                _ => Point2::ZERO,
            };
            ScriptLine::Pointer(PointerEvent {
                stick,
                kind,
                pointer_id,
                point,
            })
        }
    };

    Ok(Some(parsed))
}

/// Read a pointer script in the background.
///
/// Pauses are honoured in the reader so the consumer only ever sees events.
/// Malformed lines are logged and skipped. The receiver closes at end of input.
pub fn spawn_reader<R>(reader: R) -> mpsc::Receiver<PointerEvent>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(256);

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        let mut line_no = 0usize;

        loop {
            let text = match lines.next_line().await {
                Ok(Some(text)) => text,
                Ok(None) => break,
                Err(e) => {
                    warn!("Pointer script read error: {}", e);
                    break;
                }
            };
            line_no += 1;

            match parse_line(line_no, &text) {
                Ok(Some(ScriptLine::Pointer(event))) => {
                    if tx.send(event).await.is_err() {
                        debug!("Pointer consumer gone, stopping script reader");
                        return;
                    }
                }
                Ok(Some(ScriptLine::Pause(delay))) => tokio::time::sleep(delay).await,
                Ok(None) => {}
                Err(e) => warn!("Skipping pointer script {}", e),
            }
        }

        info!("Pointer script finished after {} lines", line_no);
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pointer_event() {
        let line = parse_line(1, r#"{"stick":"move","kind":"move","pointer_id":3,"x":10.5,"y":-4}"#)
            .unwrap()
            .unwrap();

        assert_eq!(
            line,
            ScriptLine::Pointer(PointerEvent {
                stick: StickRole::Move,
                kind: PointerKind::Move,
                pointer_id: 3,
                point: Point2::new(10.5, -4.0),
            })
        );
    }

    #[test]
    fn test_release_without_point() {
        let line = parse_line(1, r#"{"stick":"aim","kind":"leave","pointer_id":9}"#)
            .unwrap()
            .unwrap();

        match line {
            ScriptLine::Pointer(event) => {
                assert_eq!(event.kind, PointerKind::Leave);
                assert_eq!(event.point, Point2::ZERO);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pause_blank_and_comment() {
        assert_eq!(
            parse_line(1, r#"{"pause_ms":120}"#).unwrap(),
            Some(ScriptLine::Pause(Duration::from_millis(120)))
        );
        assert_eq!(parse_line(2, "   ").unwrap(), None);
        assert_eq!(parse_line(3, "# warm-up").unwrap(), None);
    }

    #[test]
    fn test_errors_carry_line_number() {
        let err = parse_line(7, "{not json").unwrap_err();
        assert!(err.to_string().starts_with("line 7:"));

        let err = parse_line(8, r#"{"stick":"aim","kind":"move","pointer_id":1,"x":3}"#).unwrap_err();
        assert!(matches!(
            err,
            PointerScriptError::MissingPoint {
                line: 8,
                kind: PointerKind::Move
            }
        ));

        assert!(parse_line(9, r#"{"stick":"left","kind":"down","pointer_id":1,"x":0,"y":0}"#).is_err());
    }

    #[tokio::test]
    async fn test_reader_skips_bad_lines() {
        let script = concat!(
            "# demo\n",
            "{\"stick\":\"aim\",\"kind\":\"down\",\"pointer_id\":1,\"x\":0,\"y\":0}\n",
            "oops\n",
            "{\"pause_ms\":1}\n",
            "{\"stick\":\"aim\",\"kind\":\"up\",\"pointer_id\":1}\n",
        );

        let mut rx = spawn_reader(std::io::Cursor::new(script.as_bytes().to_vec()));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, PointerKind::Down);
        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, PointerKind::Up);
        assert!(rx.recv().await.is_none());
    }
}
