//! Bridge from `validator` errors into [`CoreError::Validation`].

use validator::Validate;

use crate::error::CoreError;

/// Run `validator` rules on a request body and flatten failures into a
/// single [`CoreError::Validation`] message.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(errors.to_string()))
}
