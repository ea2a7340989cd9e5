macro_rules! define_is (
    ($name:ident, $kind:pat) => (
/// Check whether this node is of the given kind.
#[must_use]
pub fn $name(&self) -> bool {
    matches!(self.kind(), $kind)
}
    );
);
