//! Domain factories for creating domain entities and value objects.

use rand::Rng;

use super::value_object::{SESSION_CODE_ALPHABET, SESSION_CODE_LEN, SessionCode};

/// Factory for generating SessionCode instances.
///
/// Separates code generation from the validation in [`SessionCode::new`].
pub struct SessionCodeFactory;

impl SessionCodeFactory {
    /// Generate a random session code.
    ///
    /// Uniqueness among live sessions is the registry's job.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> SessionCode {
        let code: String = (0..SESSION_CODE_LEN)
            .map(|_| {
                let index = rng.gen_range(0..SESSION_CODE_ALPHABET.len());
                SESSION_CODE_ALPHABET[index] as char
            })
            .collect();
        // every character comes from the alphabet and the length is fixed
        SessionCode::new(code).expect("generated session code is always valid")
    }
}
