// Client creation with custom user-agent support for kube 2.x
use crate::error::Result as NwResult;
use hyper::http::{HeaderName, HeaderValue};
use kube::{Client, Config};
use tracing::warn;

/// Environment variable that overrides the user agent sent to the api server
pub const USER_AGENT_ENV: &str = "NAVWAIT_USER_AGENT";

/// Pick the user agent: environment override first, then the caller's choice
#[must_use]
pub fn resolve_user_agent(custom_user_agent: Option<&str>) -> Option<String> {
    std::env::var(USER_AGENT_ENV)
        .ok()
        .filter(|ua| !ua.trim().is_empty())
        .or_else(|| custom_user_agent.map(str::to_string))
}

/// Create a new k8s client to interact with k8s cluster api
///
/// # Errors
///
/// Will return `Err` if the kube config can not be inferred or the client
/// can not be built from it
pub async fn new(custom_user_agent: Option<&str>) -> NwResult<Client> {
    let mut config = Config::infer().await?;

    if let Some(user_agent) = resolve_user_agent(custom_user_agent) {
        match HeaderValue::from_str(&user_agent) {
            Ok(header_value) => {
                config
                    .headers
                    .push((HeaderName::from_static("user-agent"), header_value));
            }
            Err(e) => {
                // Fall back to kube's default user agent
                warn!(user_agent = %user_agent, error = %e, "Ignoring invalid user agent");
            }
        }
    }

    let client = Client::try_from(config)?;

    Ok(client)
}
