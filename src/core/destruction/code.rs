//! Confirmation code generation

use rand::Rng;

/// Smallest 6-digit code
const CODE_MIN: u32 = 100_000;

/// Largest 6-digit code
const CODE_MAX: u32 = 999_999;

/// Source of confirmation codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Uniformly random 6-digit numeric codes (900 000 possible values)
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericCodeGenerator;

impl CodeGenerator for NumericCodeGenerator {
    fn generate(&self) -> String {
        rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
    }
}
