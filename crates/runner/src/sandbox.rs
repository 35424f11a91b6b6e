//! Sandboxed server instance
//!
//! Runs a parsing server in a container and installs the driver under test
//! into it from a local image. The container engine is consumed through
//! [`ContainerRuntime`]; this module only sequences the calls and owns the
//! instance lifetime. The instance is removed on [`ServerInstance::close`],
//! on drop, and when the driver installation fails.
//!
//! The suite runner does not use the sandbox. It is kept for driver
//! developers who want to exercise a driver inside a full server.

use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the sandbox
#[derive(Debug, Error)]
pub enum SandboxError {
    /// The container engine rejected a request
    #[error("container runtime error: {0}")]
    Runtime(String),

    /// Driver installation reported an error
    #[error("driver installation failed: {0}")]
    Install(String),

    /// Installation did not finish in time
    #[error("driver installation timed out after {0:?}")]
    Timeout(Duration),

    /// Writing logs failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SandboxError {
    /// Create a runtime error
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}

/// Container to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Image reference
    pub image: String,
    /// Run privileged
    pub privileged: bool,
    /// Remove the container once it stops
    pub auto_remove: bool,
    /// Volume binds, `host:container`
    pub binds: Vec<String>,
}

/// A started container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Container id
    pub id: String,
    /// Network address of the container
    pub address: String,
}

/// Container engine operations used by the sandbox
pub trait ContainerRuntime: Send + Sync {
    /// Start a container
    fn run(&self, spec: &ContainerSpec) -> Result<ContainerInfo, SandboxError>;

    /// Run `cmd` inside container `id`, returning combined stdout and stderr.
    ///
    /// Must give up with [`SandboxError::Timeout`] after `timeout`.
    fn exec(&self, id: &str, cmd: &[String], timeout: Duration) -> Result<String, SandboxError>;

    /// Copy the container's combined log output into `out`
    fn logs(&self, id: &str, out: &mut dyn Write) -> Result<(), SandboxError>;

    /// Force-remove container `id`
    fn remove(&self, id: &str) -> Result<(), SandboxError>;
}

/// Sandbox settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Server image
    pub image: String,
    /// Engine socket bound into the server, so it can pull driver images
    pub socket: String,
    /// Port the server listens on for clients
    pub port: u16,
    /// Scheme prefix of driver image references
    pub image_scheme: String,
    /// Upper bound on driver installation
    pub install_timeout: Duration,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: "bblfsh/bblfshd".to_string(),
            socket: "/var/run/docker.sock".to_string(),
            port: 9432,
            image_scheme: "docker-daemon:".to_string(),
            install_timeout: Duration::from_secs(3 * 60),
        }
    }
}

impl SandboxConfig {
    fn container_spec(&self) -> ContainerSpec {
        ContainerSpec {
            image: self.image.clone(),
            privileged: true,
            auto_remove: true,
            binds: vec![format!("{}:{}", self.socket, self.socket)],
        }
    }

    fn install_command(&self, lang: &str, image_id: &str) -> Vec<String> {
        vec![
            "bblfshctl".to_string(),
            "driver".to_string(),
            "install".to_string(),
            lang.to_string(),
            format!("{}{}", self.image_scheme, image_id),
        ]
    }
}

/// A running server with a driver installed
pub struct ServerInstance {
    runtime: Arc<dyn ContainerRuntime>,
    container: ContainerInfo,
    port: u16,
    closed: Mutex<bool>,
}

impl std::fmt::Debug for ServerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerInstance")
            .field("container", &self.container)
            .field("port", &self.port)
            .finish()
    }
}

impl ServerInstance {
    /// Start the default server image and install driver image `image_id`
    /// for `lang`
    pub fn run_with_driver(
        runtime: Arc<dyn ContainerRuntime>,
        lang: &str,
        image_id: &str,
    ) -> Result<Self, SandboxError> {
        Self::run_with_config(runtime, &SandboxConfig::default(), lang, image_id)
    }

    /// Same as [`ServerInstance::run_with_driver`] with explicit settings
    pub fn run_with_config(
        runtime: Arc<dyn ContainerRuntime>,
        config: &SandboxConfig,
        lang: &str,
        image_id: &str,
    ) -> Result<Self, SandboxError> {
        let spec = config.container_spec();
        info!(target: "drivercheck::sandbox", image = %spec.image, "Starting server");
        let container = runtime.run(&spec)?;

        let instance = Self {
            runtime,
            container,
            port: config.port,
            closed: Mutex::new(false),
        };

        let cmd = config.install_command(lang, image_id);
        info!(target: "drivercheck::sandbox", command = %cmd.join(" "), "Installing driver");
        if let Err(e) = instance.install(&cmd, config.install_timeout) {
            if let Err(close_err) = instance.close() {
                warn!(target: "drivercheck::sandbox", error = %close_err, "Failed to remove server");
            }
            return Err(e);
        }
        Ok(instance)
    }

    fn install(&self, cmd: &[String], timeout: Duration) -> Result<(), SandboxError> {
        let output = self.runtime.exec(&self.container.id, cmd, timeout)?;
        if output.to_lowercase().contains("error") {
            return Err(SandboxError::Install(output.trim().to_string()));
        }
        debug!(target: "drivercheck::sandbox", output = %output.trim(), "Driver installed");
        Ok(())
    }

    /// Container id
    pub fn id(&self) -> &str {
        &self.container.id
    }

    /// Client endpoint, `address:port`
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.container.address, self.port)
    }

    /// Copy the server logs into `out`
    pub fn dump_logs(&self, out: &mut dyn Write) -> Result<(), SandboxError> {
        self.runtime.logs(&self.container.id, out)
    }

    /// Remove the server container. Later calls do nothing.
    pub fn close(&self) -> Result<(), SandboxError> {
        let mut closed = self.closed.lock();
        if *closed {
            return Ok(());
        }
        *closed = true;
        self.runtime.remove(&self.container.id)?;
        info!(target: "drivercheck::sandbox", id = %self.container.id, "Server removed");
        Ok(())
    }
}

impl Drop for ServerInstance {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(target: "drivercheck::sandbox", error = %e, "Failed to remove server");
        }
    }
}
