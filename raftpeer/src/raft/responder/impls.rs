use tokio::sync::oneshot;

use crate::raft::responder::Responder;
use crate::raft::write_result::WriteResult;
use crate::TypeConfig;

/// A [`Responder`] implementation that sends the response via a oneshot
/// channel.
///
/// This could be used when the [`Raft::write`] caller want to wait for the
/// response.
///
/// [`Raft::write`]: `crate::Raft::write`
pub struct OneshotResponder<C>
where C: TypeConfig
{
    tx: oneshot::Sender<WriteResult>,
    _p: std::marker::PhantomData<C>,
}

impl<C> OneshotResponder<C>
where C: TypeConfig
{
    /// Create a new instance from a [`oneshot::Sender`].
    pub fn new(tx: oneshot::Sender<WriteResult>) -> Self {
        Self {
            tx,
            _p: Default::default(),
        }
    }
}

impl<C> Responder<C> for OneshotResponder<C>
where C: TypeConfig
{
    type Receiver = oneshot::Receiver<WriteResult>;

    fn from_app_data(
        app_data: C::AppData,
    ) -> (C::AppData, Self, Self::Receiver)
    where Self: Sized {
        let (tx, rx) = oneshot::channel();
        (app_data, Self::new(tx), rx)
    }

    fn send(self, res: WriteResult) {
        let res = self.tx.send(res);

        if res.is_ok() {
            tracing::debug!("OneshotResponder.tx.send: is_ok: {}", res.is_ok());
        } else {
            tracing::warn!("OneshotResponder.tx.send: is_ok: {}", res.is_ok());
        }
    }
}
