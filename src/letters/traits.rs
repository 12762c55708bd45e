//! Traits for letter assembly.

use super::{LetterError, LetterLayout};

/// Turns domain data into a letter layout.
pub trait Generator<Req: ?Sized> {
    fn assemble(&self, request: &Req) -> Result<LetterLayout, LetterError>;
}
