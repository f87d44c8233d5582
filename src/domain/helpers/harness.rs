use std::fmt::Debug;

use super::Decision;

/// Given/when/then harness for [`Decision`]s.
pub struct TestHarness<S> {
    state: S,
}

impl<S> TestHarness<S> {
    pub fn given(state: S) -> Self {
        Self { state }
    }

    pub fn when<D>(self, decision: D) -> Outcome<D::Change, D::Error>
    where
        D: Decision<State = S>,
    {
        Outcome(decision.process(&self.state))
    }
}

pub struct Outcome<C, E>(Result<C, E>);

impl<C, E> Outcome<C, E>
where
    C: PartialEq + Debug,
    E: PartialEq + Debug,
{
    pub fn then(self, expected: C) {
        assert_eq!(self.0, Ok(expected));
    }

    pub fn then_err(self, expected: E) {
        assert_eq!(self.0, Err(expected));
    }
}
