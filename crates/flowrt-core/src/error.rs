use crate::type_tag::TypeTag;

/// Errors that can occur when assigning a value to an [`crate::port::Input`]
/// or sending through an [`crate::port::Output`].
#[derive(thiserror::Error, Debug)]
pub enum TypeError {
    #[error("type mismatch on port {port}: expected {expected}, got a value that is not {expected}")]
    TypeMismatch { port: String, expected: TypeTag },
}

/// Raised by [`crate::port::Output::send`] when no downstream queue is
/// connected.
#[derive(thiserror::Error, Debug)]
#[error("output {0} has no connected downstream queue")]
pub struct UnconnectedOutputError(pub String);
