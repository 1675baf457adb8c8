//! # Network Module
//!
//! Networking abstractions over ZMQ, the transport used between the
//! controller and the arm hardware server.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use zmq::{Context, Socket, SocketEvent, SocketType};

// Export zmq
pub use zmq;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

/// Number of monitors that are registered. Used to provide unique IDs for
/// each monitor endpoint.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Network parameters for the executable.
#[derive(Serialize, Deserialize)]
pub struct NetParams {
    /// Network endpoint for the arm joint state socket
    pub arm_state_endpoint: String,

    /// Network endpoint for the arm demands socket
    pub arm_dems_endpoint: String,
}

/// A zmq socket which is monitored providing additional information.
///
/// A background thread watches activity on the socket and keeps a flag of
/// whether the socket is actually connected, which plain zmq sockets do not
/// expose.
pub struct MonitoredSocket {
    socket: Socket,

    shutdown: Arc<AtomicBool>,

    connected: Arc<AtomicBool>,
}

/// Options which can be set on a monitored socket.
///
/// Timeouts and intervals are in milliseconds and correspond to the options
/// found in the [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt)
/// documentation.
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint. Servers
    /// should have this value set as `true`, clients should have it set as
    /// `false`.
    pub bind: bool,

    /// If true `MonitoredSocket::new()` will block until the socket is
    /// connected, or return a `CouldNotConnect` error if the connect timeout
    /// elapses first.
    pub block_on_first_connect: bool,

    /// `ZMQ_CONNECT_TIMEOUT`: Set `connect()` timeout
    pub connect_timeout: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with
    /// `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with
    /// `EAGAIN`
    pub send_timeout: i32,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_HEARTBEAT_IVL`: Set interval between sending ZMTP heartbeats
    pub heartbeat_ivl: i32,

    /// `ZMQ_HEARTBEAT_TIMEOUT`: Set timeout for ZMTP heartbeats
    pub heartbeat_timeout: i32,

    /// `ZMQ_HEARTBEAT_TTL`: Set the TTL (time to live) value for ZMTP
    /// heartbeats
    pub heartbeat_ttl: i32,

    /// `ZMQ_REQ_CORRELATE`: Match replies with requests
    pub req_correlate: bool,

    /// `ZMQ_REQ_RELAXED`: relax strict alternation between request and reply
    pub req_relaxed: bool,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum MonitoredSocketError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not connect the socket: {0:?}")]
    CouldNotConnect(Option<zmq::Error>),

    #[error("Could not read event from monitor socket: {0}")]
    EventReadError(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(&'static str, zmq::Error),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl MonitoredSocket {
    /// Create a new monitored socket.
    ///
    /// # Arguments
    /// - `ctx`: the zmq context which will be used to create the socket
    /// - `socket_type`: the type of zmq socket to create
    /// - `socket_options`: a [`SocketOptions`] struct specifying how to
    ///   configure the socket
    /// - `endpoint`: a zmq endpoint string, such as `"tcp://localhost:4000"`
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        socket_options: SocketOptions,
        endpoint: &str,
    ) -> Result<Self, MonitoredSocketError> {
        // Create atomics
        let shutdown = Arc::new(AtomicBool::new(false));
        let connected = Arc::new(AtomicBool::new(false));

        // Create socket
        let socket = ctx
            .socket(socket_type)
            .map_err(MonitoredSocketError::CreateSocketError)?;

        // Create monitor endpoint, a unique inproc address for this socket
        let monitor_endpoint = format!(
            "inproc://monitor_{}",
            NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
        );

        // Enable, create, and connect monitor
        socket
            .monitor(&monitor_endpoint, SocketEvent::ALL as i32)
            .map_err(MonitoredSocketError::MonitoringEnableError)?;
        let monitor = ctx
            .socket(zmq::PAIR)
            .map_err(MonitoredSocketError::CreateSocketError)?;
        monitor
            .connect(&monitor_endpoint)
            .map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        // Set the options on the socket
        socket_options.set(&socket)?;

        // Connect or bind the socket to its endpoint
        match socket_options.bind {
            false => socket.connect(endpoint),
            true => socket.bind(endpoint),
        }
        .map_err(|e| MonitoredSocketError::CouldNotConnect(Some(e)))?;

        // If the block on first connect flag is set wait for the monitor to
        // signal connection
        if socket_options.block_on_first_connect {
            loop {
                let event = read_event(&monitor)
                    .map_err(MonitoredSocketError::EventReadError)?;

                match event {
                    SocketEvent::CONNECTED => break,
                    SocketEvent::CONNECT_DELAYED => continue,
                    _ => return Err(MonitoredSocketError::CouldNotConnect(None)),
                }
            }

            connected.store(true, Ordering::Relaxed);
        }

        // Spawn the monitor thread
        let shutdown_clone = shutdown.clone();
        let connected_clone = connected.clone();
        thread::spawn(move || monitor_socket(monitor, shutdown_clone, connected_clone));

        Ok(Self {
            socket,
            shutdown,
            connected,
        })
    }

    /// Return if the socket is connected or not.
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

impl Drop for MonitoredSocket {
    fn drop(&mut self) {
        // Signal the monitor thread to stop. The thread may be blocked
        // waiting on an event so it is not joined here.
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl std::ops::Deref for MonitoredSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl std::ops::DerefMut for MonitoredSocket {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}

impl SocketOptions {
    /// Set these options on the given socket.
    pub fn set(&self, socket: &Socket) -> Result<(), MonitoredSocketError> {
        use MonitoredSocketError::SocketOptionError;

        socket
            .set_connect_timeout(self.connect_timeout)
            .map_err(|e| SocketOptionError("connect_timeout", e))?;
        socket
            .set_rcvtimeo(self.recv_timeout)
            .map_err(|e| SocketOptionError("rcvtimeo", e))?;
        socket
            .set_sndtimeo(self.send_timeout)
            .map_err(|e| SocketOptionError("sndtimeo", e))?;
        socket
            .set_linger(self.linger)
            .map_err(|e| SocketOptionError("linger", e))?;
        socket
            .set_heartbeat_ivl(self.heartbeat_ivl)
            .map_err(|e| SocketOptionError("heartbeat_ivl", e))?;
        socket
            .set_heartbeat_timeout(self.heartbeat_timeout)
            .map_err(|e| SocketOptionError("heartbeat_timeout", e))?;
        socket
            .set_heartbeat_ttl(self.heartbeat_ttl)
            .map_err(|e| SocketOptionError("heartbeat_ttl", e))?;

        // If the socket is a req type set the req-specific options
        if let Ok(SocketType::REQ) = socket.get_socket_type() {
            socket
                .set_req_correlate(self.req_correlate)
                .map_err(|e| SocketOptionError("req_correlate", e))?;
            socket
                .set_req_relaxed(self.req_relaxed)
                .map_err(|e| SocketOptionError("req_relaxed", e))?;
        }

        Ok(())
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            block_on_first_connect: true,
            connect_timeout: 0,
            recv_timeout: -1,
            send_timeout: 0,
            linger: 30_000,
            heartbeat_ivl: 0,
            heartbeat_timeout: 0,
            heartbeat_ttl: 0,
            req_correlate: false,
            req_relaxed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Read an event from a monitor socket.
fn read_event(socket: &Socket) -> Result<SocketEvent, zmq::Error> {
    let msg = socket.recv_msg(0)?;

    let event = u16::from_ne_bytes([msg[0], msg[1]]);

    assert!(
        socket.get_rcvmore()?,
        "Monitor socket should have two messages per event"
    );

    // the address, we'll ignore it
    let _ = socket.recv_msg(0)?;

    Ok(SocketEvent::from_raw(event))
}

/// Watch the monitor socket and keep the connected flag up to date.
fn monitor_socket(monitor: Socket, shutdown: Arc<AtomicBool>, connected: Arc<AtomicBool>) {
    while !shutdown.load(Ordering::Relaxed) {
        let event = match read_event(&monitor) {
            Ok(e) => e,
            Err(e) => {
                // The monitor endpoint is gone, typically because the
                // context is terminating
                log::warn!("Could not read from a socket monitor: {}", e);
                break;
            }
        };

        match event {
            SocketEvent::CONNECTED => connected.store(true, Ordering::Relaxed),
            SocketEvent::DISCONNECTED => connected.store(false, Ordering::Relaxed),
            _ => (),
        }
    }
}
