/// Get environment variable with IDV_ prefix, falling back to unprefixed version
///
/// Checks `IDV_{key}` first, then `{key}`, so deployments that already export
/// `DATABASE_URL` or `PORT` work without renaming.
pub fn get_env_with_prefix(key: &str) -> Option<String> {
    std::env::var(format!("IDV_{}", key))
        .or_else(|_| std::env::var(key))
        .ok()
}
