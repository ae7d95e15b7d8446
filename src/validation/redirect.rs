//! Post-login redirect targets.
//!
//! The `next` parameter travels through the login form, so it is untrusted.
//! Only paths on this site are followed.

/// Maximum accepted target length.
const MAX_TARGET_LENGTH: usize = 2048;

/// Return `target` if it is a path on this site.
///
/// Accepts `/`-rooted paths with an optional query. Rejects
/// protocol-relative (`//host`) and backslash forms that browsers treat as
/// another origin.
pub fn local_redirect_target(target: &str) -> Option<&str> {
    let target = target.trim();
    if target.is_empty() || target.len() > MAX_TARGET_LENGTH {
        return None;
    }

    let mut chars = target.chars();
    if chars.next() != Some('/') || matches!(chars.next(), Some('/') | Some('\\')) {
        return None;
    }

    if target.chars().any(|c| c == '\\' || c.is_control()) {
        return None;
    }

    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_paths_accepted() {
        assert_eq!(local_redirect_target("/"), Some("/"));
        assert_eq!(
            local_redirect_target("/user/order/list.do?page=2"),
            Some("/user/order/list.do?page=2")
        );
    }

    #[test]
    fn test_foreign_targets_rejected() {
        for target in [
            "",
            "user/order",
            "//evil.example.com/x",
            "/\\evil.example.com",
            "https://evil.example.com/",
            "/user\r\nSet-Cookie: x=1",
        ] {
            assert_eq!(local_redirect_target(target), None, "{:?}", target);
        }
        assert_eq!(local_redirect_target(&format!("/{}", "a".repeat(3000))), None);
    }
}
