use std::fmt;

/// Execution status as reported by the durable-execution runtime's status
/// oracle. `Unknown` carries the raw code of any status the runtime reports
/// that this engine does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
    Terminated,
    TimedOut,
    ContinuedAsNew,
    Unknown(i32),
}

impl RunStatus {
    /// Whether the run can no longer make progress. `ContinuedAsNew` is not
    /// terminal: the execution carries on under a fresh runtime run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Terminated
                | RunStatus::TimedOut
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => f.write_str("RUNNING"),
            RunStatus::Completed => f.write_str("COMPLETED"),
            RunStatus::Failed => f.write_str("FAILED"),
            RunStatus::Cancelled => f.write_str("CANCELLED"),
            RunStatus::Terminated => f.write_str("TERMINATED"),
            RunStatus::TimedOut => f.write_str("TIMED_OUT"),
            RunStatus::ContinuedAsNew => f.write_str("CONTINUED_AS_NEW"),
            RunStatus::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}
