/// The position of a variable in the scope of a propagator.
///
/// Watchers hand it back to the propagator when the variable is modified, so a filter can find
/// the variable that triggered it without searching its scope.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalId(u32);

impl LocalId {
    pub fn at(position: usize) -> LocalId {
        LocalId(position as u32)
    }

    pub fn position(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
