use navwait::k8s::USER_AGENT;
use navwait::k8s::client::{USER_AGENT_ENV, resolve_user_agent};

#[test]
fn test_default_user_agent_names_the_crate() {
    assert!(USER_AGENT.starts_with("navwait/"));
    assert!(USER_AGENT.len() > "navwait/".len());
}

#[test]
fn test_caller_user_agent_used_without_override() {
    // An override in the surrounding environment takes precedence
    if std::env::var(USER_AGENT_ENV).is_ok_and(|ua| !ua.trim().is_empty()) {
        return;
    }
    assert_eq!(
        resolve_user_agent(Some("navwait/9.9")),
        Some("navwait/9.9".to_string())
    );
    assert_eq!(resolve_user_agent(None), None);
}
