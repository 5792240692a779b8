use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::core::core_state::CoreState;
use crate::core::io::api_message::APIMessage;
use crate::core::TickHandle;
use crate::errors::Fatal;
use crate::storage::membership::NodeId;
use crate::Config;
use crate::Metrics;
use crate::OptionalSend;
use crate::TypeConfig;

/// The state shared by all clones of a [`Raft`](crate::Raft) handle.
///
/// It owns the sending ends of the channels to `Core` and keeps track of the
/// `Core` task, so that a failed call can tell why `Core` is gone.
pub(in crate::raft) struct RaftInner<C>
where C: TypeConfig
{
    pub(in crate::raft) id: NodeId,
    pub(in crate::raft) config: Arc<Config>,
    pub(in crate::raft) runtime_config: Arc<RuntimeConfig>,
    pub(in crate::raft) tick_handle: TickHandle,
    pub(in crate::raft) tx_api: mpsc::UnboundedSender<APIMessage<C>>,
    pub(in crate::raft) rx_metrics: watch::Receiver<Metrics>,
    pub(in crate::raft) tx_shutdown: Mutex<Option<oneshot::Sender<()>>>,
    pub(in crate::raft) core_state: Mutex<CoreState>,
}

impl<C> RaftInner<C>
where C: TypeConfig
{
    /// Hand a message to `Core` without waiting for it to be handled.
    pub(crate) async fn send_msg(
        &self,
        msg: APIMessage<C>,
    ) -> Result<(), Fatal> {
        if let Err(e) = self.tx_api.send(msg) {
            let summary = e.0.to_string();
            return Err(self.core_stopped_error("send", &summary).await);
        }
        Ok(())
    }

    /// Wait for the reply to a message sent earlier.
    ///
    /// The reply channel is dropped without a value only if `Core` quits, the
    /// reason `Core` quit is returned then.
    pub(crate) async fn recv_msg<T, E>(
        &self,
        rx: impl Future<Output = Result<T, E>>,
    ) -> Result<T, Fatal>
    where
        T: OptionalSend,
        E: OptionalSend,
    {
        match rx.await {
            Ok(x) => Ok(x),
            Err(_) => Err(self.core_stopped_error("recv", "reply").await),
        }
    }

    /// Send a message to `Core` and wait for its reply.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) async fn call_core<T>(
        &self,
        msg: APIMessage<C>,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, Fatal>
    where
        T: OptionalSend,
    {
        debug!("id={} call_core: {}", self.id, msg);

        self.send_msg(msg).await?;
        self.recv_msg(rx).await
    }

    /// Returns what the `Core` task returned, if it has been joined.
    pub(in crate::raft) fn core_result(
        &self,
    ) -> Option<Result<Infallible, Fatal>> {
        match &*self.core_state.lock().unwrap() {
            CoreState::Done(res) => Some(res.clone()),
            _ => None,
        }
    }

    /// Join `Core` and return the error it quit with.
    async fn core_stopped_error(&self, when: &str, what: &str) -> Fatal {
        self.join_core_task().await;

        let fatal = match self.core_result() {
            Some(Err(fatal)) => fatal,
            Some(Ok(never)) => match never {},
            None => Fatal::Stopped,
        };

        error!(
            "id={} Core is gone when {} {}: {}",
            self.id, when, what, fatal
        );
        fatal
    }

    /// Wait for the `Core` task to quit and record its result.
    ///
    /// The first caller awaits the `JoinHandle`, other callers wait on a watch
    /// channel until the first caller records the result.
    #[tracing::instrument(level = "debug", skip_all)]
    pub(in crate::raft) async fn join_core_task(&self) {
        let joining = {
            let mut state = self.core_state.lock().unwrap();

            match std::mem::replace(&mut *state, CoreState::Done(Err(Fatal::Stopped))) {
                CoreState::Running(join_handle) => {
                    let (tx, rx) = watch::channel(false);
                    *state = CoreState::Joining(rx);
                    Ok((join_handle, tx))
                }
                CoreState::Joining(rx) => {
                    *state = CoreState::Joining(rx.clone());
                    Err(rx)
                }
                done @ CoreState::Done(_) => {
                    *state = done;
                    return;
                }
            }
        };

        match joining {
            Ok((join_handle, tx)) => {
                let res = match join_handle.await {
                    Ok(returned) => returned,
                    Err(e) if e.is_panic() => Err(Fatal::Panicked),
                    Err(_) => Err(Fatal::Stopped),
                };
                info!("id={} Core quit: {:?}", self.id, res);

                *self.core_state.lock().unwrap() = CoreState::Done(res);
                tx.send(true).ok();
            }
            Err(mut rx) => {
                // Returns Err if the joining caller is dropped, then there is
                // nothing left to wait for.
                rx.wait_for(|joined| *joined).await.ok();
            }
        }
    }
}
