use std::fmt;
use std::str::FromStr;

/// Stage of the download pipeline. Phases only ever move forward;
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Queued,
    Navigating,
    FillingInput,
    Submitting,
    AwaitingTransfer,
    Materializing,
    Completed,
    Failed,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Queued => "queued",
            JobPhase::Navigating => "navigating",
            JobPhase::FillingInput => "filling-input",
            JobPhase::Submitting => "submitting",
            JobPhase::AwaitingTransfer => "awaiting-transfer",
            JobPhase::Materializing => "materializing",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
        }
    }

    /// Position in the forward walk of the state machine. `Failed` ranks
    /// above every non-terminal phase so it is reachable from any of them.
    pub fn rank(&self) -> u8 {
        match self {
            JobPhase::Queued => 0,
            JobPhase::Navigating => 1,
            JobPhase::FillingInput => 2,
            JobPhase::Submitting => 3,
            JobPhase::AwaitingTransfer => 4,
            JobPhase::Materializing => 5,
            JobPhase::Completed => 6,
            JobPhase::Failed => 7,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }

    /// Advisory progress figure surfaced in status responses.
    pub fn progress_percent(&self) -> u8 {
        match self {
            JobPhase::Queued => 5,
            JobPhase::Navigating => 20,
            JobPhase::FillingInput => 35,
            JobPhase::Submitting => 50,
            JobPhase::AwaitingTransfer => 65,
            JobPhase::Materializing => 85,
            JobPhase::Completed => 100,
            JobPhase::Failed => 100,
        }
    }

    /// Human-readable description shown to pollers.
    pub fn message(&self) -> &'static str {
        match self {
            JobPhase::Queued => "Download queued",
            JobPhase::Navigating => "Opening conversion page",
            JobPhase::FillingInput => "Entering source URL",
            JobPhase::Submitting => "Starting conversion",
            JobPhase::AwaitingTransfer => "Waiting for the transfer to begin",
            JobPhase::Materializing => "Finalizing downloaded file",
            JobPhase::Completed => "Download ready",
            JobPhase::Failed => "Download failed",
        }
    }
}

impl FromStr for JobPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobPhase::Queued),
            "navigating" => Ok(JobPhase::Navigating),
            "filling-input" => Ok(JobPhase::FillingInput),
            "submitting" => Ok(JobPhase::Submitting),
            "awaiting-transfer" => Ok(JobPhase::AwaitingTransfer),
            "materializing" => Ok(JobPhase::Materializing),
            "completed" => Ok(JobPhase::Completed),
            "failed" => Ok(JobPhase::Failed),
            _ => Err(format!("Invalid job phase: {}", s)),
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
