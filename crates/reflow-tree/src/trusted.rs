#![forbid(unsafe_code)]

//! Trust marker for pre-sanitized markup.

/// A string the producer asserts is already-safe raw markup.
///
/// This is the explicit trust boundary of the system: wrapping a string
/// in `TrustedString` is the *only* way to get it past the escaping
/// serializer unmodified (besides the trusting normalization mode, which
/// makes the same assertion on the caller's behalf). Whether a value is
/// trusted is a pattern match on this type, never a structural probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedString(String);

impl TrustedString {
    /// Mark `markup` as safe. The caller asserts it is already sanitized.
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// The raw textual payload.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TrustedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
