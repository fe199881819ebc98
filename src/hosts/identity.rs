//! Resolution of the running node's own identity.

use std::fs;

#[derive(Debug, thiserror::Error)]
#[error("unable to determine node id: set node.id, NODE_ID or HOSTNAME")]
pub struct IdentityError;

/// Resolve this node's id.
///
/// Order: explicit configuration, `NODE_ID`, `HOSTNAME`, `/etc/hostname`.
pub fn resolve_node_id(configured: Option<&str>) -> Result<String, IdentityError> {
    resolve_with(configured, |key| std::env::var(key).ok(), || {
        fs::read_to_string("/etc/hostname").ok()
    })
}

fn resolve_with<E, H>(configured: Option<&str>, env: E, hostname_file: H) -> Result<String, IdentityError>
where
    E: Fn(&str) -> Option<String>,
    H: FnOnce() -> Option<String>,
{
    configured
        .map(str::to_owned)
        .or_else(|| env("NODE_ID"))
        .or_else(|| env("HOSTNAME"))
        .or_else(hostname_file)
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .ok_or(IdentityError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_id_wins() {
        let id = resolve_with(Some("tele2"), |_| Some("env".into()), || None).unwrap();
        assert_eq!(id, "tele2");
    }

    #[test]
    fn test_env_then_hostname_file() {
        let env = |key: &str| (key == "HOSTNAME").then(|| "tele4".to_string());
        assert_eq!(resolve_with(None, env, || None).unwrap(), "tele4");

        let id = resolve_with(None, |_| None, || Some("tele1\n".into())).unwrap();
        assert_eq!(id, "tele1");
    }

    #[test]
    fn test_nothing_available() {
        assert!(resolve_with(None, |_| None, || None).is_err());
        assert!(resolve_with(Some("  "), |_| None, || None).is_err());
    }
}
