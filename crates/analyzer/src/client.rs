//! The seam between request assembly and the language-model service.

use crate::error::ClientError;
use deck_core::PromptPart;

/// A language-model backend that turns an ordered request into text.
pub trait ModelClient {
    /// Short service name used in user-facing error messages.
    fn service_name(&self) -> &str;

    /// Send `parts` with `system_instruction` and wait for the generated text.
    fn generate(
        &self,
        system_instruction: &str,
        parts: &[PromptPart],
    ) -> Result<String, ClientError>;
}

impl<C: ModelClient + ?Sized> ModelClient for &C {
    fn service_name(&self) -> &str {
        (**self).service_name()
    }

    fn generate(
        &self,
        system_instruction: &str,
        parts: &[PromptPart],
    ) -> Result<String, ClientError> {
        (**self).generate(system_instruction, parts)
    }
}
