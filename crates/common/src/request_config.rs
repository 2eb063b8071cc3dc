//! Per-request processor configuration and the mock-setting resolution rule.

/// Configuration the processor applies to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub mock: MockSetting,
    pub validate_request: bool,
    pub validate_response: bool,
    pub check_security: bool,
    /// Turn output-validation violations into errors instead of diagnostics.
    pub errors: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            mock: MockSetting::Enabled(MockConfig::default()),
            validate_request: true,
            validate_response: true,
            check_security: true,
            errors: false,
        }
    }
}

/// Global or effective mock setting.
///
/// `Disabled` is sticky: no per-request signal can turn mocking back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockSetting {
    Disabled,
    Enabled(MockConfig),
}

/// How the processor should produce a mocked response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockConfig {
    /// Generate bodies from schemas instead of serving static examples.
    pub dynamic: bool,
    /// Status code to respond with.
    pub code: Option<u16>,
    /// Key of the named example to serve.
    pub example_key: Option<String>,
}

/// Mock settings requested by a single request. Unset fields defer to the global config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockOverride {
    pub dynamic: Option<bool>,
    pub code: Option<u16>,
    pub example_key: Option<String>,
}

impl MockOverride {
    pub fn is_empty(&self) -> bool {
        self.dynamic.is_none() && self.code.is_none() && self.example_key.is_none()
    }
}

/// Resolve the effective mock setting from the global one and a request override.
///
/// - global `Disabled` → `Disabled`, whatever the override says;
/// - global `Enabled` with no override → the global config unchanged;
/// - otherwise every field set on the override replaces the global field.
pub fn resolve_mock(global: &MockSetting, request: MockOverride) -> MockSetting {
    match global {
        MockSetting::Disabled => MockSetting::Disabled,
        MockSetting::Enabled(base) if request.is_empty() => MockSetting::Enabled(base.clone()),
        MockSetting::Enabled(base) => MockSetting::Enabled(MockConfig {
            dynamic: request.dynamic.unwrap_or(base.dynamic),
            code: request.code.or(base.code),
            example_key: request.example_key.or_else(|| base.example_key.clone()),
        }),
    }
}
