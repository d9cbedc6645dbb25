//! Matching replies to requests.
//!
//! AbletonOSC has no request IDs. A reply is attributed to a call purely by
//! structure: the reply address equals the request address and the reply's
//! leading values echo the request's index arguments. At most one call per
//! [`CallKey`] is in flight; later callers on the same key wait their turn.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

use rosc::{OscMessage, OscType};
use tokio::sync::{mpsc, oneshot, Semaphore};
use wildmatch::WildMatch;

use crate::{transport::Transport, Error};

/// Address AbletonOSC reports handler exceptions on.
pub const ERROR_ADDRESS: &str = "/live/error";

const BRIDGE_ERROR_CAPACITY: usize = 16;

/// Identifies one in-flight call: the address and the index values echoed
/// at the head of its reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallKey {
    pub address: String,
    pub prefix: Vec<i32>,
}

impl CallKey {
    pub fn new(address: impl Into<String>, prefix: Vec<i32>) -> Self {
        CallKey {
            address: address.into(),
            prefix,
        }
    }

    /// Whether `args` starts with this key's index prefix.
    fn matches(&self, args: &[OscType]) -> bool {
        args.len() >= self.prefix.len()
            && self
                .prefix
                .iter()
                .zip(args)
                .all(|(index, arg)| matches!(arg, OscType::Int(value) if value == index))
    }
}

/// What happened to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handed to the pending call it answers. Listeners do not see it.
    Delivered,
    /// No pending call, but at least one listener received it.
    Listened,
    /// Nobody wanted it; kept in the unmatched buffer.
    Unmatched,
    /// A `/live/error` report from the bridge.
    BridgeError,
}

/// Stream of pushed updates for a listener pattern.
pub type Updates = mpsc::UnboundedReceiver<OscMessage>;

struct Waiter {
    id: u64,
    key: CallKey,
    tx: oneshot::Sender<Vec<OscType>>,
}

struct Listener {
    pattern: WildMatch,
    /// The pattern as given, plus the leading indices a message must carry.
    filter: CallKey,
    tx: mpsc::UnboundedSender<OscMessage>,
}

pub struct Correlator {
    next_id: AtomicU64,
    closed: AtomicBool,
    pending: Mutex<HashMap<String, Vec<Waiter>>>,
    turns: Mutex<HashMap<CallKey, Arc<Semaphore>>>,
    listeners: Mutex<Vec<Listener>>,
    unmatched: Mutex<VecDeque<OscMessage>>,
    unmatched_capacity: usize,
    unmatched_total: AtomicU64,
    bridge_errors: Mutex<VecDeque<(Instant, String)>>,
}

impl Correlator {
    pub fn new(unmatched_capacity: usize) -> Self {
        Correlator {
            next_id: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            pending: Mutex::new(HashMap::new()),
            turns: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
            unmatched: Mutex::new(VecDeque::new()),
            unmatched_capacity,
            unmatched_total: AtomicU64::new(0),
            bridge_errors: Mutex::new(VecDeque::new()),
        }
    }

    /// Sends a request and waits for the reply matching `key`.
    ///
    /// Returns the complete reply arguments, index prefix included.
    pub async fn request(
        &self,
        transport: &Transport,
        key: CallKey,
        args: Vec<OscType>,
        timeout: Duration,
    ) -> Result<Vec<OscType>, Error> {
        self.ensure_open()?;
        let _turn = self.turn(&key).await;
        let started = Instant::now();
        let (pending, rx) = self.register(key.clone());
        transport.send(&key.address, args).await?;

        let result = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => {
                let bridge_error = self.bridge_error_since(started);
                log::debug!("{} {:?} timed out after {:?}", key.address, key.prefix, timeout);
                Err(Error::Timeout {
                    address: key.address.clone(),
                    prefix: key.prefix.clone(),
                    timeout,
                    bridge_error,
                })
            }
        };
        drop(pending);
        result
    }

    /// Sends a message that expects no reply, in turn with other calls on `key`.
    pub async fn send(&self, transport: &Transport, key: CallKey, args: Vec<OscType>) -> Result<(), Error> {
        self.ensure_open()?;
        let _turn = self.turn(&key).await;
        transport.send(&key.address, args).await
    }

    /// Routes one inbound message. Called by the receiver task.
    pub fn dispatch(&self, message: OscMessage) -> Dispatch {
        if message.addr == ERROR_ADDRESS {
            let text = message
                .args
                .iter()
                .filter_map(|arg| match arg {
                    OscType::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(" ");
            log::warn!("AbletonOSC reported an error: {}", text);
            let mut errors = lock(&self.bridge_errors);
            if errors.len() == BRIDGE_ERROR_CAPACITY {
                errors.pop_front();
            }
            errors.push_back((Instant::now(), text));
            return Dispatch::BridgeError;
        }

        let waiter = {
            let mut pending = lock(&self.pending);
            let waiter = pending.get_mut(&message.addr).and_then(|waiters| {
                let position = waiters.iter().position(|w| w.key.matches(&message.args))?;
                Some(waiters.swap_remove(position))
            });
            if pending.get(&message.addr).is_some_and(|waiters| waiters.is_empty()) {
                pending.remove(&message.addr);
            }
            waiter
        };

        let message = match waiter {
            Some(waiter) => {
                log::trace!("reply on {} matched {:?}", message.addr, waiter.key.prefix);
                match waiter.tx.send(message.args) {
                    Ok(()) => return Dispatch::Delivered,
                    // The caller gave up between matching and delivery.
                    Err(args) => OscMessage {
                        addr: message.addr,
                        args,
                    },
                }
            }
            None => message,
        };

        if self.notify_listeners(&message) {
            return Dispatch::Listened;
        }
        self.keep_unmatched(message)
    }

    /// Registers a listener for every inbound message whose address matches
    /// `pattern` (`*` and `?` wildcards).
    pub fn subscribe(&self, pattern: &str) -> Updates {
        self.listen(CallKey::new(pattern, Vec::new()))
    }

    /// Like [`Correlator::subscribe`], but only for messages whose leading
    /// values echo `filter.prefix`.
    pub fn listen(&self, filter: CallKey) -> Updates {
        let (tx, rx) = mpsc::unbounded_channel();
        log::debug!("listening on {} {:?}", filter.address, filter.prefix);
        lock(&self.listeners).push(Listener {
            pattern: WildMatch::new(&filter.address),
            filter,
            tx,
        });
        rx
    }

    /// Removes the listeners registered with exactly this pattern and
    /// prefix. Their [`Updates`] streams end once drained.
    pub fn unlisten(&self, filter: &CallKey) -> usize {
        let mut listeners = lock(&self.listeners);
        let before = listeners.len();
        listeners.retain(|listener| listener.filter != *filter);
        let removed = before - listeners.len();
        log::debug!("stopped {} listener(s) on {} {:?}", removed, filter.address, filter.prefix);
        removed
    }

    /// Takes the buffered unmatched messages, oldest first.
    pub fn drain_unmatched(&self) -> Vec<OscMessage> {
        lock(&self.unmatched).drain(..).collect()
    }

    /// Number of unmatched messages seen since start, evicted ones included.
    pub fn unmatched_total(&self) -> u64 {
        self.unmatched_total.load(Ordering::Relaxed)
    }

    /// Number of calls currently waiting for a reply.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).values().map(Vec::len).sum()
    }

    /// Fails every pending call with [`Error::Closed`] and refuses new ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        log::debug!("closing with {} pending call(s)", self.pending_count());
        lock(&self.pending).clear();
        lock(&self.listeners).clear();
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        Ok(())
    }

    async fn turn(&self, key: &CallKey) -> Turn<'_> {
        let slot = lock(&self.turns)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone();
        // Built before waiting so a cancelled wait still prunes the slot.
        let mut turn = Turn {
            correlator: self,
            key: key.clone(),
            slot,
            held: false,
        };
        // Turn semaphores are never closed, so acquiring only ever waits.
        if let Ok(permit) = turn.slot.acquire().await {
            permit.forget();
            turn.held = true;
        }
        turn
    }

    fn register(&self, key: CallKey) -> (PendingGuard<'_>, oneshot::Receiver<Vec<OscType>>) {
        let (tx, rx) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let address = key.address.clone();
        lock(&self.pending)
            .entry(address.clone())
            .or_default()
            .push(Waiter { id, key, tx });
        (
            PendingGuard {
                correlator: self,
                address,
                id,
            },
            rx,
        )
    }

    fn notify_listeners(&self, message: &OscMessage) -> bool {
        let mut listeners = lock(&self.listeners);
        let mut delivered = false;
        listeners.retain(|listener| {
            if !listener.pattern.matches(&message.addr) || !listener.filter.matches(&message.args) {
                return !listener.tx.is_closed();
            }
            match listener.tx.send(message.clone()) {
                Ok(()) => {
                    delivered = true;
                    true
                }
                Err(_) => false,
            }
        });
        delivered
    }

    fn keep_unmatched(&self, message: OscMessage) -> Dispatch {
        self.unmatched_total.fetch_add(1, Ordering::Relaxed);
        log::debug!("discarding unmatched reply on {} {:?}", message.addr, message.args);
        if self.unmatched_capacity > 0 {
            let mut unmatched = lock(&self.unmatched);
            while unmatched.len() >= self.unmatched_capacity {
                unmatched.pop_front();
            }
            unmatched.push_back(message);
        }
        Dispatch::Unmatched
    }

    fn bridge_error_since(&self, since: Instant) -> Option<String> {
        lock(&self.bridge_errors)
            .iter()
            .rev()
            .find(|(at, _)| *at >= since)
            .map(|(_, text)| text.clone())
    }
}

/// Exclusive right to issue a call on one key, or a wait for it.
struct Turn<'a> {
    correlator: &'a Correlator,
    key: CallKey,
    slot: Arc<Semaphore>,
    held: bool,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        if self.held {
            self.slot.add_permits(1);
        }
        let mut turns = lock(&self.correlator.turns);
        // Only the map's handle and ours left: nobody else holds or awaits this key.
        if turns
            .get(&self.key)
            .is_some_and(|slot| Arc::ptr_eq(slot, &self.slot) && Arc::strong_count(slot) == 2)
        {
            turns.remove(&self.key);
        }
    }
}

/// Removes a waiter that never got its reply (timeout or cancellation).
struct PendingGuard<'a> {
    correlator: &'a Correlator,
    address: String,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = lock(&self.correlator.pending);
        if let Some(waiters) = pending.get_mut(&self.address) {
            waiters.retain(|w| w.id != self.id);
            if waiters.is_empty() {
                pending.remove(&self.address);
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
