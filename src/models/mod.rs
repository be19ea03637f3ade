/// # Service Status
///
/// Liveness snapshot reported by the `health` query: a fixed `"UP"` status,
/// the RFC 3339 time of the check and the deployment mode the process runs in.
pub mod health;
