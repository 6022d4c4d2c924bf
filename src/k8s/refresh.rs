use crate::error::Result;
use crate::wait::{Observation, Refresh, Status};
use async_trait::async_trait;
use kube::Api;
use kube::Resource;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::debug;

/// Extracts the watcher status from a fetched object
pub type StatusFn<K> = fn(&K) -> Status;

/// Refresh function reading a single named object through the api server.
///
/// A 404 is reported as not found. Any other api failure is returned as is;
/// the `kube` client handles connection-level concerns.
pub struct ApiStatus<K> {
    api: Api<K>,
    name: String,
    status_of: StatusFn<K>,
}

impl<K> ApiStatus<K> {
    pub fn new(api: Api<K>, name: impl Into<String>, status_of: StatusFn<K>) -> Self {
        Self {
            api,
            name: name.into(),
            status_of,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl<K> Refresh for ApiStatus<K>
where
    K: Resource + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    type Resource = K;

    async fn refresh(&self) -> Result<Observation<K>> {
        let observation = match self.api.get_opt(&self.name).await? {
            Some(object) => {
                let status = (self.status_of)(&object);
                Observation::found(object, status)
            }
            None => Observation::not_found(),
        };
        debug!(name = %self.name, status = %observation.status, "🔍 REFRESH");
        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::k8s::status::{POD_RUNNING, pod_phase};
    use hyper::http::{Method, Request, Response, StatusCode};
    use k8s_openapi::api::core::v1::Pod;
    use k8s_openapi::serde_json::{self, json};
    use kube::Client;
    use kube::client::Body;
    use tower_test::mock::{self, Handle};

    type ApiHandle = Handle<Request<Body>, Response<Body>>;

    fn pod_refresh() -> (ApiStatus<Pod>, ApiHandle) {
        let (service, handle) = mock::pair::<Request<Body>, Response<Body>>();
        let client = Client::new(service, "default");
        let refresh = ApiStatus::new(Api::namespaced(client, "default"), "api-0", pod_phase);
        (refresh, handle)
    }

    /// Answer the single GET issued for `pods/api-0`
    async fn respond(mut handle: ApiHandle, status: StatusCode, body: serde_json::Value) {
        let (request, send) = handle.next_request().await.expect("api not called");
        assert_eq!(*request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/api/v1/namespaces/default/pods/api-0");
        let response = Response::builder()
            .status(status)
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        send.send_response(response);
    }

    fn api_status(code: u16, reason: &str) -> serde_json::Value {
        json!({
            "kind": "Status",
            "apiVersion": "v1",
            "metadata": {},
            "status": "Failure",
            "message": format!("pods \"api-0\": {reason}"),
            "reason": reason,
            "code": code
        })
    }

    #[tokio::test]
    async fn test_existing_object_reports_its_status() {
        let (refresh, handle) = pod_refresh();
        let server = tokio::spawn(respond(
            handle,
            StatusCode::OK,
            json!({
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": { "name": "api-0", "namespace": "default" },
                "status": { "phase": "Running" }
            }),
        ));

        let observation = refresh.refresh().await.unwrap();
        server.await.unwrap();

        assert_eq!(observation.status, Status::new(POD_RUNNING));
        let pod = observation.resource.unwrap();
        assert_eq!(pod.metadata.name.as_deref(), Some("api-0"));
        assert_eq!(refresh.name(), "api-0");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let (refresh, handle) = pod_refresh();
        let server = tokio::spawn(respond(
            handle,
            StatusCode::NOT_FOUND,
            api_status(404, "NotFound"),
        ));

        let observation = refresh.refresh().await.unwrap();
        server.await.unwrap();

        assert!(observation.status.is_not_found());
        assert!(observation.resource.is_none());
    }

    #[tokio::test]
    async fn test_api_failure_propagates() {
        let (refresh, handle) = pod_refresh();
        let server = tokio::spawn(respond(
            handle,
            StatusCode::INTERNAL_SERVER_ERROR,
            api_status(500, "InternalError"),
        ));

        let err = refresh.refresh().await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, Error::Kube(_)));
    }
}
