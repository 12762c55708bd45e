//! Certificate issuance: unlock policy, get-or-create coordination and the
//! HTTP endpoints that serve letters.

pub mod coordinator;
pub mod handlers;
pub mod model;
pub mod positions;
pub mod unlock;

pub use coordinator::{IssuanceCoordinator, IssuanceError};
pub use unlock::is_unlocked;
