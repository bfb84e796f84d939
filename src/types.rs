use std::fmt;
use std::str::FromStr;

/// Opaque job identifier issued by a grid backend.
///
/// Only meaningful within the grid that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Jid(String);

impl Jid {
    pub fn new(id: impl Into<String>) -> Self {
        Jid(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Join dependency identifiers the way grid backends expect them:
/// comma-separated, in the order given.
pub fn join_jids(jids: &[Jid]) -> String {
    jids.iter()
        .map(Jid::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Submission state of a job, derived from its live directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    NotSubmitted,
    Submitted { grid: String, jid: Jid },
    Done,
}

impl JobState {
    /// `Submitted` and `Done` are both terminal from the submitter's point of
    /// view: neither triggers another backend call.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::NotSubmitted)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::NotSubmitted => f.write_str("not-submitted"),
            JobState::Submitted { grid, jid } => write!(f, "submitted\t{grid}\t{jid}"),
            JobState::Done => f.write_str("done"),
        }
    }
}

/// What a filesystem path is, from the resolver's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Holds a `definition/` directory.
    Job,
    /// Holds a `refs` file.
    Reference,
    /// Anything else; only its existence matters.
    Plain,
}

/// Grid name as passed on the command line and stored in `live/grid`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridName(String);

impl GridName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GridName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GridName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("grid name must not be empty".to_string());
        }
        if s.contains('/') || s.contains(std::path::MAIN_SEPARATOR) || s.contains('\n') {
            return Err(format!(
                "invalid grid name '{s}' (must not contain path separators or newlines)"
            ));
        }
        Ok(GridName(s.to_string()))
    }
}
