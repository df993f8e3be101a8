#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Upper bound on collected diagnostics, `0` means unbounded.
    pub max_diagnostics: usize,
    /// Report unreachable blocks as warnings instead of errors.
    pub allow_unreachable_blocks: bool,
}

impl VerifierConfig {
    pub fn permissive() -> Self {
        Self {
            allow_unreachable_blocks: true,
            ..Self::default()
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: 200,
            allow_unreachable_blocks: false,
        }
    }
}
