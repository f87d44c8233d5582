/// A command validated against state loaded from the database.
///
/// `process` is pure: it either rejects the command or describes the change to persist.
/// Loading the state and persisting the change is left to the slice that owns the command,
/// which keeps the business rules testable without a database.
pub trait Decision {
    type State;
    type Change;
    type Error;

    fn process(&self, state: &Self::State) -> Result<Self::Change, Self::Error>;
}
