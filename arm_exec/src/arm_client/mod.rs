//! # Arm Client
//!
//! This module provides networking abstractions to connect to the arm
//! hardware server: one request/reply socket for reading the joint state and
//! one for sending velocity demands.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use hw_if::{
    arm::{ArmDems, ArmDemsResponse, ArmJointState, ArmStateRequest},
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct ArmClient {
    state_socket: MonitoredSocket,

    dems_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ArmClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("Could not send a message to the server: {0}")]
    SendError(zmq::Error),

    #[error("Could not receive a message from the server: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the data: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the server: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmClient {
    /// Create a new instance of the arm client.
    ///
    /// Both sockets must connect within the configured timeout for the
    /// client to be created, matching the fail-fast initialisation contract
    /// of the executable.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, ArmClientError> {
        // Tight timeouts on both sockets, a request that cannot complete
        // within a few cycles is already useless to the control loop
        let socket_options = SocketOptions {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let state_socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.arm_state_endpoint,
        )
        .map_err(ArmClientError::SocketError)?;

        let socket_options = SocketOptions {
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let dems_socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.arm_dems_endpoint,
        )
        .map_err(ArmClientError::SocketError)?;

        Ok(Self {
            state_socket,
            dems_socket,
        })
    }

    /// Get the current joint state from the server.
    ///
    /// Called once per cycle. A failure here means the state source is lost,
    /// which the executable treats as fatal.
    pub fn get_joint_state(&mut self) -> Result<ArmJointState, ArmClientError> {
        if !self.state_socket.connected() {
            return Err(ArmClientError::NotConnected);
        }

        let request_str = serde_json::to_string(&ArmStateRequest)
            .map_err(ArmClientError::SerializationError)?;

        self.state_socket
            .send(&request_str, 0)
            .map_err(ArmClientError::SendError)?;

        let msg = self
            .state_socket
            .recv_msg(0)
            .map_err(ArmClientError::RecvError)?;

        serde_json::from_str(msg.as_str().unwrap_or(""))
            .map_err(ArmClientError::DeserializeError)
    }

    /// Send velocity demands to the server.
    ///
    /// Sends the given demands to the server. If the server acknowledges the
    /// demands within the configured timeout then its response is returned,
    /// otherwise an `Err()` is returned.
    pub fn send_demands(&mut self, demands: &ArmDems) -> Result<ArmDemsResponse, ArmClientError> {
        // If not connected return now
        if !self.dems_socket.connected() {
            return Err(ArmClientError::NotConnected);
        }

        // Serialize the demands
        let dems_str =
            serde_json::to_string(demands).map_err(ArmClientError::SerializationError)?;

        // Send the demands to the server
        self.dems_socket
            .send(&dems_str, 0)
            .map_err(ArmClientError::SendError)?;

        // Receive response back from the server
        let msg = self
            .dems_socket
            .recv_msg(0)
            .map_err(ArmClientError::RecvError)?;

        serde_json::from_str(msg.as_str().unwrap_or(""))
            .map_err(ArmClientError::DeserializeError)
    }
}
