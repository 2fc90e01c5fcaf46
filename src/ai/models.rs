//! Model selection.

/// Preferred models, best first, used when the configured model is not offered.
pub const PREFERRED_MODELS: [&str; 7] = [
    "gemini-2.5-flash",
    "gemini-2.5-flash-latest",
    "gemini-1.5-flash-latest",
    "gemini-1.5-pro-latest",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
    "gemini-pro",
];

/// `(api version, model)` pairs tried in order after a 404.
pub const FALLBACK_ATTEMPTS: [(&str, &str); 4] = [
    ("v1beta", "gemini-1.5-flash"),
    ("v1beta", "gemini-1.5-pro"),
    ("v1beta", "gemini-pro"),
    ("v1", "gemini-pro"),
];

/// Pick the model to call.
///
/// With no model list the configured model is used as-is; `None` means there
/// is neither a list nor a configured name.
pub fn select_model(configured: &str, available: &[String]) -> Option<String> {
    let configured = configured.trim();
    if available.is_empty() {
        return (!configured.is_empty()).then(|| configured.to_string());
    }

    let offered = |name: &str| available.iter().any(|m| m == name);
    if !configured.is_empty() && offered(configured) {
        return Some(configured.to_string());
    }
    PREFERRED_MODELS
        .into_iter()
        .find(|m| offered(m))
        .map(str::to_string)
        .or_else(|| available.first().cloned())
}
