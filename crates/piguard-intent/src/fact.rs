//! Abstract facts tracked per local during the flow analysis.

/// What is known about the Intent held in a local.
///
/// Absence of a fact is the fourth state: nothing is known and the
/// site must be reported as unknown rather than assumed safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    /// The local still holds the method's i-th parameter.
    Param(usize),
    /// The local holds the return value of the named method.
    ReturnOf(String),
    /// The Intent was pinned to an explicit target.
    Safe,
    /// The Intent was constructed without a target.
    Unsafe,
}
