/// Per-request evaluation context handed through to operators.
///
/// The rule engine itself only uses the id for log attribution; operators
/// receive the whole context by reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transaction {
    id: u64,
}

impl Transaction {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip() {
        let tx = Transaction::new(42);
        assert_eq!(tx.id(), 42);
    }
}
