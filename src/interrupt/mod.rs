
use crate::context::ExecutionContext;
use std::future::Future;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// A source of interrupt notifications.
///
/// `recv` resolves with `Some(())` for each delivered interrupt and `None`
/// once the source can no longer deliver any.
pub trait InterruptSource: Send + 'static {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send;
}

impl InterruptSource for Signal {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send {
        Signal::recv(self)
    }
}

impl InterruptSource for mpsc::Receiver<()> {
    fn recv(&mut self) -> impl Future<Output = Option<()>> + Send {
        mpsc::Receiver::recv(self)
    }
}

/// Register for SIGINT.
///
/// Interrupts that arrive after this returns are buffered until the bridge
/// starts listening.
pub fn register_interrupt() -> std::io::Result<Signal> {
    signal(SignalKind::interrupt())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Listening,
    Cancelled,
    Idle,
}

/// Background listener that cancels a context on the first interrupt.
///
/// Dropping the bridge stops the listener and releases the interrupt source.
pub struct InterruptBridge {
    state: watch::Receiver<BridgeState>,
    task: JoinHandle<()>,
}

impl InterruptBridge {
    pub fn spawn<S: InterruptSource>(mut source: S, ctx: ExecutionContext) -> Self {
        let (state_tx, state) = watch::channel(BridgeState::Listening);

        let task = tokio::spawn(async move {
            if source.recv().await.is_some() {
                tracing::warn!(signal = "SIGINT", "Received interrupt, cancelling restore");
                ctx.cancel();
                state_tx.send_replace(BridgeState::Cancelled);
            }
            // Release the registration before reporting idle so no further
            // interrupts are routed to this bridge.
            drop(source);
            state_tx.send_replace(BridgeState::Idle);
        });

        Self { state, task }
    }

    pub fn state(&self) -> BridgeState {
        *self.state.borrow()
    }

    /// Wait until the listener task has terminated on its own.
    pub async fn wait_idle(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == BridgeState::Idle)
            .await;
    }
}

impl Drop for InterruptBridge {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!("Releasing interrupt listener");
        }
        self.task.abort();
    }
}
