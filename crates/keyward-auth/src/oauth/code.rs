//! Authorization code generation.

/// Produces fresh opaque authorization codes.
///
/// Codes must be URL-safe and carry at least 64 bits of entropy. Generation
/// is injected so tests can pin the produced codes.
pub trait CodeGenerator: Send + Sync {
    /// Returns a new authorization code.
    fn generate_code(&self) -> String;
}

/// The standard generator: 8 random bytes, hex-encoded (16 characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct HexCodeGenerator;

impl CodeGenerator for HexCodeGenerator {
    fn generate_code(&self) -> String {
        let mut bytes = [0u8; 8];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes[..]);
        hex::encode(bytes)
    }
}
