//! # `ableton_osc`
//!
//! Drive Ableton Live through the [AbletonOSC](https://github.com/ideoforms/AbletonOSC)
//! remote script.
//!
//! Every operation the bridge understands is described once, as data, in
//! [`live`]; typed wrappers ([`AbletonOSC::song`], [`AbletonOSC::track`], ...)
//! and the JSON [`tools::ToolSurface`] are both built on that table.
//!
//! ```no_run
//! # async fn demo() -> Result<(), ableton_osc::Error> {
//! let live = ableton_osc::AbletonOSC::connect(ableton_osc::Config::default()).await?;
//! live.song().set_tempo(120.0).await?;
//! assert_eq!(live.song().get_tempo().await?, 120.0);
//! # Ok(()) }
//! ```

mod config;
mod correlation;
mod error;
mod operation;
pub mod payload;
mod tasks;
mod transport;

pub mod live;
pub mod theory;
pub mod tools;

use std::{net::SocketAddr, sync::Arc};

pub use config::Config;
pub use correlation::{CallKey, Dispatch, Updates};
pub use error::Error;
pub use operation::{ArgType, Bounds, Kind, Level, Operation, Param, Shape};
pub use rosc::{OscMessage, OscType};
pub use transport::Transport;

use correlation::Correlator;
use live::{
    application::Application, clip::Clip, clip_slot::ClipSlot, device::Device, scene::Scene,
    song::Song, track::Track, view::View,
};
use payload::FromOsc;
use tasks::receiver_task;
use tokio::task::JoinHandle;

/// A connection to one AbletonOSC instance.
///
/// Owns the UDP socket pair and the task that routes replies. Dropping the
/// client (or calling [`AbletonOSC::shutdown`]) stops that task and fails
/// every call still waiting.
pub struct AbletonOSC {
    config: Config,
    transport: Arc<Transport>,
    correlator: Arc<Correlator>,
    receiver_task_handle: Option<JoinHandle<()>>,
}

impl AbletonOSC {
    /// Binds the sockets described by `config` and starts routing replies.
    ///
    /// Nothing is sent, so this succeeds whether or not Live is running;
    /// see [`Application::test`] for a liveness check.
    pub async fn connect(config: Config) -> Result<AbletonOSC, Error> {
        let transport = Arc::new(Transport::bind(&config).await?);
        let correlator = Arc::new(Correlator::new(config.unmatched_capacity));

        let receiver_task_handle = tokio::spawn(receiver_task(transport.clone(), correlator.clone()));
        log::info!(
            "AbletonOSC client ready: sending to {}, replies on {}",
            transport.remote_addr(),
            transport.local_addr()?
        );

        Ok(AbletonOSC {
            config,
            transport,
            correlator,
            receiver_task_handle: Some(receiver_task_handle),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The address replies are received on.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        self.transport.local_addr()
    }

    /// Runs a catalog operation.
    ///
    /// `indices` are the object indices the operation's [`Level`] needs,
    /// `values` the remaining arguments. Returns the reply payload with the
    /// index prefix stripped, or nothing for operations without a reply.
    pub async fn execute(
        &self,
        op: &Operation,
        indices: &[u32],
        values: Vec<OscType>,
    ) -> Result<Vec<OscType>, Error> {
        let prefix = prefix(op, indices)?;
        op.check_args(&values)?;

        let key = CallKey::new(op.address, prefix);
        let mut args: Vec<OscType> = key.prefix.iter().copied().map(OscType::Int).collect();
        args.extend(values);

        if !op.awaits_reply() {
            self.correlator.send(&self.transport, key, args).await?;
            return Ok(Vec::new());
        }
        let mut reply = self
            .correlator
            .request(&self.transport, key, args, self.config.timeout)
            .await?;
        Ok(reply.split_off(op.prefix_len()))
    }

    /// Sends `address` with `prefix` followed by `args` and waits for the
    /// reply echoing `prefix`. For addresses the catalog does not cover.
    ///
    /// Returns the payload after the prefix.
    pub async fn query(&self, address: &str, prefix: &[i32], args: Vec<OscType>) -> Result<Vec<OscType>, Error> {
        let key = CallKey::new(address, prefix.to_vec());
        let mut message: Vec<OscType> = prefix.iter().copied().map(OscType::Int).collect();
        message.extend(args);
        let mut reply = self
            .correlator
            .request(&self.transport, key, message, self.config.timeout)
            .await?;
        Ok(reply.split_off(prefix.len()))
    }

    /// Sends a message that expects no reply.
    pub async fn send(&self, address: &str, args: Vec<OscType>) -> Result<(), Error> {
        let prefix = args
            .iter()
            .map_while(|arg| match arg {
                OscType::Int(v) => Some(*v),
                _ => None,
            })
            .collect();
        self.correlator
            .send(&self.transport, CallKey::new(address, prefix), args)
            .await
    }

    /// Receives every inbound message whose address matches `pattern`
    /// (`*` and `?` wildcards), e.g. the updates a `start_listen` produces.
    pub fn subscribe(&self, pattern: &str) -> Updates {
        self.correlator.subscribe(pattern)
    }

    /// Ends the streams [`AbletonOSC::subscribe`] returned for `pattern`.
    /// Returns how many there were.
    pub fn unsubscribe(&self, pattern: &str) -> usize {
        self.correlator.unlisten(&CallKey::new(pattern, Vec::new()))
    }

    /// Replies no call was waiting for, oldest first, up to
    /// [`Config::unmatched_capacity`].
    pub fn drain_unmatched(&self) -> Vec<OscMessage> {
        self.correlator.drain_unmatched()
    }

    /// Count of unmatched replies since connect, evicted ones included.
    pub fn unmatched_total(&self) -> u64 {
        self.correlator.unmatched_total()
    }

    /// Asks AbletonOSC to reload its handlers. No reply is sent.
    pub async fn reload(&self) -> Result<(), Error> {
        self.execute(&live::api::RELOAD, &[], Vec::new()).await.map(|_| ())
    }

    pub fn application(&self) -> Application<'_> {
        Application::new(self)
    }

    pub fn song(&self) -> Song<'_> {
        Song::new(self)
    }

    pub fn track(&self) -> Track<'_> {
        Track::new(self)
    }

    pub fn clip_slot(&self) -> ClipSlot<'_> {
        ClipSlot::new(self)
    }

    pub fn clip(&self) -> Clip<'_> {
        Clip::new(self)
    }

    pub fn device(&self) -> Device<'_> {
        Device::new(self)
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene::new(self)
    }

    pub fn view(&self) -> View<'_> {
        View::new(self)
    }

    /// Waits for the receiver task to finish. It only does so after
    /// [`AbletonOSC::shutdown`].
    pub async fn join(&mut self) -> Result<(), Error> {
        if let Some(handle) = self.receiver_task_handle.take() {
            match handle.await {
                Err(err) if err.is_cancelled() => {}
                other => other?,
            }
        }
        Ok(())
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.receiver_task_handle.as_ref() {
            handle.abort();
        }
        self.correlator.close();
        log::debug!("AbletonOSC client shut down");
    }

    pub(crate) async fn get<T: FromOsc>(&self, op: &Operation, indices: &[u32]) -> Result<T, Error> {
        let payload = self.execute(op, indices, Vec::new()).await?;
        payload::scalar(op.address, &payload)
    }

    /// Updates on `op`'s address for the object at `indices` only.
    pub(crate) fn listen(&self, op: &Operation, indices: &[u32]) -> Result<Updates, Error> {
        Ok(self.correlator.listen(CallKey::new(op.address, prefix(op, indices)?)))
    }

    pub(crate) fn unlisten(&self, op: &Operation, indices: &[u32]) -> Result<(), Error> {
        self.correlator.unlisten(&CallKey::new(op.address, prefix(op, indices)?));
        Ok(())
    }

    pub(crate) async fn put(&self, op: &Operation, indices: &[u32], values: Vec<OscType>) -> Result<(), Error> {
        self.execute(op, indices, values).await.map(|_| ())
    }
}

/// Checks `indices` against `op`'s level and converts them to the wire prefix.
fn prefix(op: &Operation, indices: &[u32]) -> Result<Vec<i32>, Error> {
    let names = op.level.index_names();
    if indices.len() != names.len() {
        return Err(Error::validation(
            op.name,
            format!("expected {} index value(s), got {}", names.len(), indices.len()),
        ));
    }
    names
        .iter()
        .zip(indices)
        .map(|(name, value)| payload::index(name, *value))
        .collect()
}

impl Drop for AbletonOSC {
    fn drop(&mut self) {
        self.shutdown();
    }
}
