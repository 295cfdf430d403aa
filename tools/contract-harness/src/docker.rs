//! Container plumbing for managed runs.
//!
//! A managed run owns one throwaway PostgreSQL container. This module
//! creates it through the Docker daemon, reports the database URL it
//! listens on, and removes it afterwards. Every container is tagged with a
//! harness label so leftovers from a crashed run can be swept before the
//! next one starts.

use std::collections::HashMap;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, ListContainersOptionsBuilder,
    RemoveContainerOptions, RemoveContainerOptionsBuilder, StartContainerOptionsBuilder,
    StopContainerOptionsBuilder,
};
use futures::TryStreamExt;

const LABEL_KEY: &str = "medworld.role";
const LABEL_VALUE: &str = "contract-test";

const POSTGRES_IMAGE: &str = "postgres:18";
const POSTGRES_DB: &str = "medworld_test";

/// Daemon handle plus the ids of every container this run launched.
///
/// Dropping the value does not stop anything; call
/// [`teardown`](Self::teardown) on the way out.
pub struct Orchestrator {
    client: Docker,
    /// Address containers are reachable at from this process.
    host: String,
    owned: Vec<String>,
}

impl Orchestrator {
    /// Connect to the daemon at `docker_host` and ping it once.
    ///
    /// `unix://` sockets and unrecognized schemes publish containers on
    /// loopback; a `tcp://HOST:PORT` daemon publishes them on `HOST`.
    pub async fn connect(docker_host: &str) -> Result<Self> {
        let client = match docker_host.split_once("://") {
            Some(("unix", _)) => Docker::connect_with_local_defaults()
                .context("failed to connect to local Docker socket")?,
            Some(("tcp", addr)) => {
                Docker::connect_with_http(addr, 120, bollard::API_DEFAULT_VERSION)
                    .context("failed to connect to remote Docker daemon")?
            }
            _ => Docker::connect_with_defaults().context("failed to connect to Docker daemon")?,
        };

        client
            .ping()
            .await
            .context("Docker daemon did not respond to ping")?;

        Ok(Self {
            client,
            host: publish_host(docker_host),
            owned: Vec::new(),
        })
    }

    /// Remove exited and dead containers carrying the harness label.
    ///
    /// Running ones are left alone; they may belong to a live session on
    /// the same daemon.
    pub async fn sweep_stale(&self) -> Result<()> {
        let filters = HashMap::from([
            (
                "label".to_owned(),
                vec![format!("{LABEL_KEY}={LABEL_VALUE}")],
            ),
            (
                "status".to_owned(),
                vec!["exited".to_owned(), "dead".to_owned()],
            ),
        ]);
        let stale = self
            .client
            .list_containers(Some(
                ListContainersOptionsBuilder::new()
                    .all(true)
                    .filters(&filters)
                    .build(),
            ))
            .await?;

        for id in stale.into_iter().filter_map(|c| c.id) {
            // A removal that fails here resurfaces on the next sweep.
            self.client
                .remove_container(&id, Some(force_remove()))
                .await
                .ok();
        }

        Ok(())
    }

    /// Launch PostgreSQL and wait until it accepts connections.
    ///
    /// Returns the `DATABASE_URL` the service under test should use.
    pub async fn launch_postgres(&mut self) -> Result<String> {
        let env = vec![
            "POSTGRES_USER=postgres".to_owned(),
            "POSTGRES_PASSWORD=postgres".to_owned(),
            format!("POSTGRES_DB={POSTGRES_DB}"),
        ];
        let id = self.launch(POSTGRES_IMAGE, Some(env), "5432/tcp").await?;

        let port = self.published_port(&id, "5432/tcp").await?;
        await_tcp(&self.host, port, Duration::from_secs(30)).await?;

        Ok(format!(
            "postgres://postgres:postgres@{}:{port}/{POSTGRES_DB}",
            self.host
        ))
    }

    /// Stop and remove every container this run launched. Called on the
    /// success and the failure path alike.
    pub async fn teardown(&mut self) -> Result<()> {
        for id in self.owned.drain(..) {
            let _ = self
                .client
                .stop_container(&id, Some(StopContainerOptionsBuilder::new().t(5).build()))
                .await;
            let _ = self
                .client
                .remove_container(&id, Some(force_remove()))
                .await;
        }
        Ok(())
    }

    /// Pull `image` if absent, then create and start a labeled container
    /// with `port` published on a random loopback port.
    async fn launch(
        &mut self,
        image: &str,
        env: Option<Vec<String>>,
        port: &str,
    ) -> Result<String> {
        self.client
            .create_image(
                Some(CreateImageOptionsBuilder::new().from_image(image).build()),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .with_context(|| format!("failed to pull {image}"))?;

        let publish = PortBinding {
            host_ip: Some("127.0.0.1".to_owned()),
            // Empty host port asks Docker for a random free one.
            host_port: Some(String::new()),
        };
        let body = ContainerCreateBody {
            image: Some(image.to_owned()),
            env,
            labels: Some(HashMap::from([(
                LABEL_KEY.to_owned(),
                LABEL_VALUE.to_owned(),
            )])),
            exposed_ports: Some(vec![port.to_owned()]),
            host_config: Some(HostConfig {
                port_bindings: Some(HashMap::from([(port.to_owned(), Some(vec![publish]))])),
                ..Default::default()
            }),
            ..Default::default()
        };

        let id = self
            .client
            .create_container(Some(CreateContainerOptionsBuilder::new().build()), body)
            .await
            .with_context(|| format!("failed to create {image} container"))?
            .id;
        self.client
            .start_container(&id, Some(StartContainerOptionsBuilder::new().build()))
            .await
            .with_context(|| format!("failed to start {image} container"))?;

        self.owned.push(id.clone());
        Ok(id)
    }

    /// Host-side port Docker published for the container's `port`.
    async fn published_port(&self, id: &str, port: &str) -> Result<u16> {
        let inspected = self
            .client
            .inspect_container(id, None)
            .await
            .context("failed to inspect container")?;

        let bindings = inspected
            .network_settings
            .and_then(|net| net.ports)
            .and_then(|mut ports| ports.remove(port))
            .flatten()
            .unwrap_or_default();
        let published = bindings
            .into_iter()
            .find_map(|binding| binding.host_port)
            .ok_or_else(|| anyhow!("no host port published for {port}"))?;

        published
            .parse()
            .with_context(|| format!("invalid port number: {published}"))
    }
}

fn force_remove() -> RemoveContainerOptions {
    RemoveContainerOptionsBuilder::new().force(true).build()
}

/// Block until `host:port` accepts TCP connections or `timeout` passes.
async fn await_tcp(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let addr = format!("{host}:{port}");
    let deadline = Instant::now() + timeout;

    while TcpStream::connect(&addr).is_err() {
        if Instant::now() >= deadline {
            bail!("timed out waiting for {addr} to accept connections");
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    Ok(())
}

/// Address at which the daemon at `url` publishes container ports. Unix
/// sockets and unknown schemes publish on loopback.
fn publish_host(url: &str) -> String {
    match url.split_once("://") {
        Some(("tcp", rest)) => match rest.split_once(':') {
            Some((host, _)) => host.to_owned(),
            None => rest.to_owned(),
        },
        _ => "127.0.0.1".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::publish_host;

    #[test]
    fn should_map_unix_socket_to_loopback() {
        assert_eq!(publish_host("unix:///var/run/docker.sock"), "127.0.0.1");
    }

    #[test]
    fn should_extract_the_host_from_a_tcp_url() {
        assert_eq!(publish_host("tcp://192.168.1.100:2376"), "192.168.1.100");
    }

    #[test]
    fn should_keep_a_portless_tcp_url_whole() {
        assert_eq!(publish_host("tcp://buildhost"), "buildhost");
    }

    #[test]
    fn should_map_unknown_schemes_to_loopback() {
        assert_eq!(publish_host("http://localhost:2375"), "127.0.0.1");
    }
}
