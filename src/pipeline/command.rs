//! Providers backed by a long-lived helper process.
//!
//! The helper is started once and kept running for the whole batch. Requests
//! and responses are single lines of JSON on the helper's stdin and stdout;
//! the helper's stderr is passed through to ours. A response of the form
//! `{"error": "..."}` reports a failure for that request only.
//!
//! | provider  | request                                  | response                       |
//! |-----------|------------------------------------------|--------------------------------|
//! | OCR       | `{"input": "<file>", "output": "<dir>"}` | page result, or array of them  |
//! | corrector | `{"texts": ["...", ...]}`                | `{"texts": ["...", ...]}`      |

use super::{OcrProvider, TextCorrector};
use crate::error::{Error, Result};
use crate::model::PageResult;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Program and arguments of a helper process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to run
    pub program: String,
    /// Arguments passed to it
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a spec from a program and its arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace (no shell quoting).
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::ProviderInit("empty provider command".into()))?;
        Ok(Self::new(program, parts.collect()))
    }
}

/// A running helper that answers one JSON line per request line.
pub struct JsonLineProcess {
    program: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl JsonLineProcess {
    /// Start the helper.
    pub fn spawn(spec: &CommandSpec) -> Result<Self> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::ProviderInit(format!("failed to start {}: {}", spec.program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::ProviderInit(format!("{} has no stdin", spec.program)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ProviderInit(format!("{} has no stdout", spec.program)))?;

        log::info!("Started provider process {} (pid {})", spec.program, child.id());
        Ok(Self {
            program: spec.program.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Send one request and wait for its response.
    ///
    /// Failures are returned as messages so each provider can wrap them in
    /// its own error kind.
    pub fn request<Req, Resp>(&mut self, request: &Req) -> std::result::Result<Resp, String>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let mut line = serde_json::to_string(request).map_err(|e| e.to_string())?;
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .and_then(|_| self.stdin.flush())
            .map_err(|e| format!("{}: write failed: {}", self.program, e))?;

        let mut response = String::new();
        let read = self
            .stdout
            .read_line(&mut response)
            .map_err(|e| format!("{}: read failed: {}", self.program, e))?;
        if read == 0 {
            let status = self
                .child
                .try_wait()
                .ok()
                .flatten()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "still running".into());
            return Err(format!("{} closed its output ({})", self.program, status));
        }

        let value: Value = serde_json::from_str(response.trim())
            .map_err(|e| format!("{}: invalid response: {}", self.program, e))?;
        if let Some(message) = value.get("error").and_then(Value::as_str) {
            return Err(message.to_string());
        }
        serde_json::from_value(value).map_err(|e| format!("{}: unexpected response: {}", self.program, e))
    }
}

impl Drop for JsonLineProcess {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("{} already exited: {}", self.program, e);
        }
        let _ = self.child.wait();
    }
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    input: &'a Path,
    output: &'a Path,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OcrResponse {
    Many(Vec<PageResult>),
    One(PageResult),
}

/// OCR provider backed by a helper process.
pub struct CommandOcrProvider {
    process: JsonLineProcess,
}

impl CommandOcrProvider {
    /// Start the helper process.
    pub fn spawn(spec: &CommandSpec) -> Result<Self> {
        Ok(Self {
            process: JsonLineProcess::spawn(spec)?,
        })
    }
}

impl OcrProvider for CommandOcrProvider {
    fn name(&self) -> &str {
        &self.process.program
    }

    fn predict(&mut self, input: &Path, output_dir: &Path) -> Result<Vec<PageResult>> {
        let request = OcrRequest {
            input,
            output: output_dir,
        };
        match self.process.request(&request).map_err(Error::Ocr)? {
            OcrResponse::Many(results) => Ok(results),
            OcrResponse::One(result) => Ok(vec![result]),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TextBatch {
    texts: Vec<String>,
}

/// Text corrector backed by a helper process.
pub struct CommandCorrector {
    process: JsonLineProcess,
}

impl CommandCorrector {
    /// Start the helper process.
    pub fn spawn(spec: &CommandSpec) -> Result<Self> {
        Ok(Self {
            process: JsonLineProcess::spawn(spec)?,
        })
    }
}

impl TextCorrector for CommandCorrector {
    fn name(&self) -> &str {
        &self.process.program
    }

    fn correct(&mut self, text: &str) -> Result<String> {
        let mut batch = self.correct_batch(&[text.to_string()])?;
        batch
            .pop()
            .ok_or_else(|| Error::Correction("empty response".into()))
    }

    fn correct_batch(&mut self, texts: &[String]) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = TextBatch {
            texts: texts.to_vec(),
        };
        let response: TextBatch = self.process.request(&request).map_err(Error::Correction)?;
        if response.texts.len() != texts.len() {
            return Err(Error::BatchLength {
                expected: texts.len(),
                actual: response.texts.len(),
            });
        }
        Ok(response.texts)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_parse_command_line() {
        let spec = CommandSpec::parse("python3  ocr_server.py --lang vi").unwrap();
        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, ["ocr_server.py", "--lang", "vi"]);
        assert!(matches!(CommandSpec::parse("   "), Err(Error::ProviderInit(_))));
    }

    #[test]
    fn test_spawn_failure_is_init_error() {
        let err = JsonLineProcess::spawn(&CommandSpec::new("/nonexistent/redocx-helper", vec![]))
            .err()
            .unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_ocr_single_result() {
        let mut ocr = CommandOcrProvider::spawn(&sh(
            r#"while read line; do echo '{"parsing_res_list":[{"block_label":"text","block_content":"xin chao"}]}'; done"#,
        ))
        .unwrap();
        let results = ocr.predict(Path::new("1.jpg"), Path::new("out/1")).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].blocks[0].content, "xin chao");
    }

    #[test]
    fn test_error_response() {
        let mut ocr =
            CommandOcrProvider::spawn(&sh(r#"while read line; do echo '{"error":"bad page"}'; done"#))
                .unwrap();
        let err = ocr.predict(Path::new("1.jpg"), Path::new("out/1")).unwrap_err();
        assert!(matches!(err, Error::Ocr(ref m) if m == "bad page"));
    }

    #[test]
    fn test_corrector_batch_round_trip() {
        let mut corrector =
            CommandCorrector::spawn(&sh(r#"while read line; do echo "$line"; done"#)).unwrap();
        let texts = vec!["mot".to_string(), "hai".to_string()];
        assert_eq!(corrector.correct_batch(&texts).unwrap(), texts);
        assert!(corrector.correct_batch(&[]).unwrap().is_empty());
        assert_eq!(corrector.correct("ba").unwrap(), "ba");
    }

    #[test]
    fn test_closed_output_is_error() {
        let mut corrector = CommandCorrector::spawn(&sh("exit 0")).unwrap();
        let err = corrector.correct("x").unwrap_err();
        assert!(matches!(err, Error::Correction(_)));
    }
}
