use thiserror::Error;

/// The failure taxonomy of [`Stack`](crate::Stack): storage that cannot be
/// obtained, and a top reference that does not exist.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    /// The global allocator refused a new buffer, or the requested
    /// capacity does not fit the address space. Raised by
    /// `with_capacity`, `assign` and push-driven growth; the receiver
    /// keeps its prior state.
    #[error("unable to allocate a new buffer for stack")]
    Allocation,
    /// `top`/`top_mut` called with no live element to reference.
    #[error("unable to reference the element from an empty stack")]
    Empty,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            StackError::Allocation.to_string(),
            "unable to allocate a new buffer for stack"
        );
        assert_eq!(
            StackError::Empty.to_string(),
            "unable to reference the element from an empty stack"
        );
    }
}
