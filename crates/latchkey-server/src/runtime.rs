//! Control loop.
//!
//! The [`Runtime`] owns the controller. Nothing else touches it: HTTP
//! handlers hold a [`ControllerHandle`] that posts [`Request`]s into a
//! bounded inbox and waits for the reply. Each loop cycle runs the three
//! controller steps in order and then sleeps one poll interval:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ poll_input(now)      button                  │
//! │ try_recv() until empty, handle each request  │
//! │ poll_timers(now)     auto-lock               │
//! │ sleep(poll_interval) or shutdown             │
//! └──────────────────────────────────────────────┘
//! ```

use latchkey_core::{
    AuditStore, Controller, Environment, InputPin, Intent, IntentOutcome, LockState, Origin,
    OutputPin,
};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::error::ServerError;

/// A unit of work for the control loop.
#[derive(Debug)]
pub enum Request {
    /// Lock or unlock.
    Intent {
        /// Requester
        origin: Origin,
        /// Requested change
        intent: Intent,
        /// Outcome channel
        reply: oneshot::Sender<IntentOutcome>,
    },
    /// Report the current state (audited).
    State {
        /// Requester
        origin: Origin,
        /// State channel
        reply: oneshot::Sender<LockState>,
    },
    /// Read the audit log.
    Log {
        /// Log content channel
        reply: oneshot::Sender<String>,
    },
}

/// Cloneable sender side of the control loop inbox.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    inbox: mpsc::Sender<Request>,
}

impl ControllerHandle {
    /// Submit an intent and wait for its outcome.
    pub async fn intent(
        &self,
        origin: Origin,
        intent: Intent,
    ) -> Result<IntentOutcome, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.call(Request::Intent { origin, intent, reply }, rx).await
    }

    /// Query the lock state.
    pub async fn state(&self, origin: Origin) -> Result<LockState, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.call(Request::State { origin, reply }, rx).await
    }

    /// Fetch the audit log content.
    pub async fn log(&self) -> Result<String, ServerError> {
        let (reply, rx) = oneshot::channel();
        self.call(Request::Log { reply }, rx).await
    }

    async fn call<T>(&self, request: Request, rx: oneshot::Receiver<T>) -> Result<T, ServerError> {
        self.inbox.send(request).await.map_err(|_| ServerError::RuntimeGone)?;
        rx.await.map_err(|_| ServerError::RuntimeGone)
    }
}

/// The control loop and the controller it owns.
#[derive(Debug)]
pub struct Runtime<E, Out, In, S> {
    env: E,
    controller: Controller<Out, In, S>,
    inbox: mpsc::Receiver<Request>,
}

impl<E, Out, In, S> Runtime<E, Out, In, S>
where
    E: Environment,
    Out: OutputPin,
    In: InputPin,
    S: AuditStore,
{
    /// Wrap `controller` with an inbox of `capacity` pending requests.
    pub fn new(
        env: E,
        controller: Controller<Out, In, S>,
        capacity: usize,
    ) -> (Self, ControllerHandle) {
        let (tx, inbox) = mpsc::channel(capacity.max(1));
        (Self { env, controller, inbox }, ControllerHandle { inbox: tx })
    }

    /// Run one cycle: button, queued requests, timers.
    pub fn cycle(&mut self) {
        let now = self.env.now();
        if let Some(outcome) = self.controller.poll_input(now) {
            debug!(?outcome, "button handled");
        }

        while let Ok(request) = self.inbox.try_recv() {
            self.serve(request);
        }

        let now = self.env.now();
        for outcome in self.controller.poll_timers(now) {
            debug!(?outcome, "auto-lock fired");
        }
    }

    /// Cycle until `shutdown` changes or its sender is dropped. Returns the
    /// controller.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Controller<Out, In, S> {
        let interval = self.controller.config().poll_interval;
        info!(?interval, "control loop started");
        loop {
            self.cycle();
            tokio::select! {
                _ = shutdown.changed() => break,
                () = self.env.sleep(interval) => {},
            }
        }
        info!("control loop stopped");
        self.controller
    }

    /// The owned controller.
    pub fn controller(&self) -> &Controller<Out, In, S> {
        &self.controller
    }

    fn serve(&mut self, request: Request) {
        let now = self.env.now();
        // A dropped receiver means the client went away; the work still
        // happened and is audited.
        match request {
            Request::Intent { origin, intent, reply } => {
                let outcome = self.controller.handle(&origin, intent, now);
                let _ = reply.send(outcome);
            },
            Request::State { origin, reply } => {
                let state = self.controller.query_state(&origin, now);
                let _ = reply.send(state);
            },
            Request::Log { reply } => {
                let _ = reply.send(self.controller.audit_content());
            },
        }
    }
}
