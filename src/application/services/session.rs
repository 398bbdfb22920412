//! Descriptor editing session service
//!
//! Replays edit scripts against a fresh descriptor tree.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::script::parse_line;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DescriptorTree, DomainError};
use crate::infrastructure::traits::FileSystem;

/// A field write the tree refused; the previous value was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedWrite {
    /// 1-based script line
    pub line: usize,
    pub error: DomainError,
}

/// Result of replaying a script.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub tree: DescriptorTree,
    pub rejected: Vec<RejectedWrite>,
}

/// Service replaying edit scripts.
pub struct SessionService {
    fs: Arc<dyn FileSystem>,
    strict: bool,
}

impl SessionService {
    /// Create a new session service.
    ///
    /// In `strict` mode a rejected field write aborts the replay instead of
    /// being recorded and skipped.
    pub fn new(fs: Arc<dyn FileSystem>, strict: bool) -> Self {
        Self { fs, strict }
    }

    /// Read and replay a script file.
    #[instrument(skip(self))]
    pub fn load(&self, script: &Path) -> ApplicationResult<ReplayOutcome> {
        if !self.fs.exists(script) {
            return Err(ApplicationError::InputNotFound(script.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(script)
            .with_path_context("read script", script)?;
        self.replay(&content)
    }

    /// Replay script text against a new tree.
    ///
    /// Malformed lines and precondition violations abort with the line number.
    pub fn replay(&self, script: &str) -> ApplicationResult<ReplayOutcome> {
        let mut tree = DescriptorTree::new();
        let mut rejected = Vec::new();

        for (lineno, line) in script.lines().enumerate() {
            let line_no = lineno + 1;
            let command = match parse_line(line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    return Err(ApplicationError::Script {
                        line: line_no,
                        message,
                    })
                }
            };

            match command.apply(&mut tree) {
                Ok(()) => {}
                Err(e) if e.is_validation() && !self.strict => {
                    warn!("line {}: {}", line_no, e);
                    rejected.push(RejectedWrite {
                        line: line_no,
                        error: e,
                    });
                }
                Err(e) => {
                    return Err(ApplicationError::Replay {
                        line: line_no,
                        source: e,
                    })
                }
            }
        }

        debug!(
            "replay: {} microservices, {} rejected writes",
            tree.microservices().len(),
            rejected.len()
        );
        Ok(ReplayOutcome { tree, rejected })
    }
}
