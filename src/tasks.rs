use std::{io::ErrorKind, sync::Arc, time::Duration};

use crate::{correlation::Correlator, transport::Transport, Error};

/// Reads replies from the transport forever and routes each message
/// through the correlator.
pub(crate) async fn receiver_task(transport: Arc<Transport>, correlator: Arc<Correlator>) {
    loop {
        match transport.receive(None).await {
            Ok(messages) => {
                for message in messages {
                    correlator.dispatch(message);
                }
            }
            Err(Error::Protocol(err)) => {
                log::warn!("Dropping malformed OSC datagram: {}", err);
            }
            // Windows reports an ICMP port-unreachable from an earlier send
            // this way when Live is not listening yet.
            Err(Error::Io(err)) if err.kind() == ErrorKind::ConnectionReset => {
                log::debug!("Reply socket reset ({}), is AbletonOSC running?", err);
            }
            Err(err) => {
                log::error!(
                    "Failed to receive on {:?}: {}",
                    transport.local_addr().ok(),
                    err
                );
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
