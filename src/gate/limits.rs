//! Resource ceiling on requested dimensions.

use super::options::NormalizedParams;
use crate::error::WandError;

/// Reject a request whose width or height exceeds its effective ceiling.
///
/// Zero is exempt: it means "not requested".
pub fn enforce_limits(params: &NormalizedParams) -> Result<(), WandError> {
    let max = params.max_dimension;
    for (dimension, requested) in [("width", params.width), ("height", params.height)] {
        if requested > max {
            return Err(WandError::LimitExceeded {
                dimension,
                requested,
                max,
            });
        }
    }
    Ok(())
}
