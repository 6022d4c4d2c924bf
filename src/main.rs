use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use k8s_openapi::serde_json;
use kube::{Api, Client, Resource};
use navwait::k8s::config::{
    DEPLOYMENT_DELETE_TIMEOUT, DEPLOYMENT_ROLLOUT_TIMEOUT, NAMESPACE_ACTIVE_TIMEOUT,
    NAMESPACE_DELETE_TIMEOUT, POD_COMPLETED_TIMEOUT, POD_DELETE_TIMEOUT, POD_RUNNING_TIMEOUT,
    REPLICASET_DELETE_TIMEOUT, REPLICASET_READY_TIMEOUT,
};
use navwait::k8s::status::{
    self, DEPLOYMENT_LIVE_STATUSES, NAMESPACE_LIVE_STATUSES, POD_LIVE_STATUSES,
    REPLICASET_LIVE_STATUSES,
};
use navwait::k8s::waiters::{
    WaitOptions, wait_deleted, wait_deployment_rollout, wait_namespace_active,
    wait_pod_completed, wait_pod_running, wait_replicaset_ready,
};
use navwait::k8s::{USER_AGENT, client};
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Pod,
    Namespace,
    Replicaset,
    Deployment,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Condition {
    Running,
    Completed,
    Active,
    Ready,
    Rollout,
    Deleted,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    /// `kind/name condition met`
    Name,
    /// The object as last observed
    Json,
}

/// Wait for a Kubernetes object to reach a condition
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_enum)]
    kind: Kind,

    /// Name of the object to watch
    name: String,

    /// Condition to wait for
    #[arg(long = "for", value_enum)]
    condition: Condition,

    /// Namespace of the object (defaults to the kubeconfig namespace)
    #[arg(short, long, env = "NAVWAIT_NAMESPACE")]
    namespace: Option<String>,

    /// Give up after this many seconds (defaults depend on kind and condition)
    #[arg(long, env = "NAVWAIT_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    /// Poll at a fixed interval instead of backing off
    #[arg(long, value_name = "MS")]
    poll_interval_ms: Option<u64>,

    /// Wait this long before the first poll
    #[arg(long, value_name = "SECS")]
    delay_secs: Option<u64>,

    /// Consecutive matching observations required
    #[arg(long, value_name = "N")]
    occurrences: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = Output::Name)]
    output: Output,
}

impl Args {
    fn options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: self.poll_interval_ms.map(Duration::from_millis),
            delay: self.delay_secs.map(Duration::from_secs),
            occurrences: self.occurrences,
        }
    }

    fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.map_or(default, Duration::from_secs)
    }
}

fn init_log() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("NAVWAIT_LOG")
                .from_env_lossy(),
        )
        .init();
}

/// Cancel `cancel` on the first Ctrl-C
fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("🛑 Ctrl-C received, cancelling wait");
                cancel.cancel();
            }
            Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C"),
        }
    });
}

fn report<K>(output: Output, name: &str, object: Option<&K>) -> anyhow::Result<()>
where
    K: Resource<DynamicType = ()> + Serialize,
{
    match (output, object) {
        (Output::Json, Some(object)) => println!("{}", serde_json::to_string_pretty(object)?),
        _ => println!("{}/{name} condition met", K::kind(&()).to_lowercase()),
    }
    Ok(())
}

async fn run(args: &Args, client: Client, cancel: &CancellationToken) -> anyhow::Result<()> {
    let namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| client.default_namespace().to_string());
    let options = args.options();
    let name = args.name.as_str();

    match (args.kind, args.condition) {
        (Kind::Pod, Condition::Running) => {
            let api = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(POD_RUNNING_TIMEOUT);
            let pod = wait_pod_running(api, name, timeout, &options, cancel).await?;
            report(args.output, name, pod.as_ref())
        }
        (Kind::Pod, Condition::Completed) => {
            let api = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(POD_COMPLETED_TIMEOUT);
            let pod = wait_pod_completed(api, name, timeout, &options, cancel).await?;
            report(args.output, name, pod.as_ref())
        }
        (Kind::Pod, Condition::Deleted) => {
            let api: Api<Pod> = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(POD_DELETE_TIMEOUT);
            wait_deleted(
                api,
                name,
                status::pod_phase,
                &POD_LIVE_STATUSES,
                timeout,
                &options,
                cancel,
            )
            .await?;
            report::<Pod>(args.output, name, None)
        }
        (Kind::Namespace, Condition::Active) => {
            let api = Api::all(client);
            let timeout = args.timeout_or(NAMESPACE_ACTIVE_TIMEOUT);
            let ns = wait_namespace_active(api, name, timeout, &options, cancel).await?;
            report(args.output, name, ns.as_ref())
        }
        (Kind::Namespace, Condition::Deleted) => {
            let api: Api<Namespace> = Api::all(client);
            let timeout = args.timeout_or(NAMESPACE_DELETE_TIMEOUT);
            wait_deleted(
                api,
                name,
                status::namespace_phase,
                &NAMESPACE_LIVE_STATUSES,
                timeout,
                &options,
                cancel,
            )
            .await?;
            report::<Namespace>(args.output, name, None)
        }
        (Kind::Replicaset, Condition::Ready) => {
            let api = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(REPLICASET_READY_TIMEOUT);
            let rs = wait_replicaset_ready(api, name, timeout, &options, cancel).await?;
            report(args.output, name, rs.as_ref())
        }
        (Kind::Replicaset, Condition::Deleted) => {
            let api: Api<ReplicaSet> = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(REPLICASET_DELETE_TIMEOUT);
            wait_deleted(
                api,
                name,
                status::replicaset_readiness,
                &REPLICASET_LIVE_STATUSES,
                timeout,
                &options,
                cancel,
            )
            .await?;
            report::<ReplicaSet>(args.output, name, None)
        }
        (Kind::Deployment, Condition::Rollout) => {
            let api = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(DEPLOYMENT_ROLLOUT_TIMEOUT);
            let deployment = wait_deployment_rollout(api, name, timeout, &options, cancel).await?;
            report(args.output, name, deployment.as_ref())
        }
        (Kind::Deployment, Condition::Deleted) => {
            let api: Api<Deployment> = Api::namespaced(client, &namespace);
            let timeout = args.timeout_or(DEPLOYMENT_DELETE_TIMEOUT);
            wait_deleted(
                api,
                name,
                status::deployment_rollout,
                &DEPLOYMENT_LIVE_STATUSES,
                timeout,
                &options,
                cancel,
            )
            .await?;
            report::<Deployment>(args.output, name, None)
        }
        (kind, condition) => bail!("{kind:?} has no {condition:?} condition"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_log();

    // kube 2 ships rustls without a default crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let client = client::new(Some(USER_AGENT))
        .await
        .context("unable to create kubernetes client")?;

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    run(&args, client, &cancel).await
}
