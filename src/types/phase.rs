use std::fmt;

/// Number of execution phases a transaction passes through.
pub const NUMBER_OF_PHASES: usize = 5;

/// Execution phase of a rule.
///
/// Directive text names phases with the 1-based `phase:N` action; the engine
/// stores the 0-based index. A directive that declares no phase runs in
/// [`Phase::RequestBody`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    RequestHeaders,
    RequestBody,
    ResponseHeaders,
    ResponseBody,
    Logging,
}

impl Phase {
    /// All phases in execution order.
    pub const ALL: [Phase; NUMBER_OF_PHASES] = [
        Phase::RequestHeaders,
        Phase::RequestBody,
        Phase::ResponseHeaders,
        Phase::ResponseBody,
        Phase::Logging,
    ];

    /// Map a 1-based `phase:N` action value. Returns `None` when out of range.
    #[must_use]
    pub fn from_number(number: u64) -> Option<Phase> {
        match number {
            1 => Some(Phase::RequestHeaders),
            2 => Some(Phase::RequestBody),
            3 => Some(Phase::ResponseHeaders),
            4 => Some(Phase::ResponseBody),
            5 => Some(Phase::Logging),
            _ => None,
        }
    }

    /// 1-based phase number as written in directives.
    #[must_use]
    pub fn number(self) -> u64 {
        self.index() as u64 + 1
    }

    /// 0-based index into per-phase tables.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::RequestHeaders => "request-headers",
            Phase::RequestBody => "request-body",
            Phase::ResponseHeaders => "response-headers",
            Phase::ResponseBody => "response-body",
            Phase::Logging => "logging",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_round_trip() {
        for phase in Phase::ALL {
            assert_eq!(Phase::from_number(phase.number()), Some(phase));
        }
    }

    #[test]
    fn out_of_range_numbers_rejected() {
        assert_eq!(Phase::from_number(0), None);
        assert_eq!(Phase::from_number(6), None);
        assert_eq!(Phase::from_number(u64::MAX), None);
    }

    #[test]
    fn indices_cover_table() {
        for (expected, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), expected);
            assert!(phase.index() < NUMBER_OF_PHASES);
        }
    }

    #[test]
    fn display_names() {
        assert_eq!(Phase::RequestHeaders.to_string(), "request-headers");
        assert_eq!(Phase::Logging.to_string(), "logging");
    }
}
