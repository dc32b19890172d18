//! Per-operation deadlines and shutdown propagation.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Cause, EngineError, EngineResult};

/// Bounds collaborator calls by a deadline and, optionally, by shutdown.
#[derive(Debug, Clone)]
pub(crate) struct Guard {
    timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Guard {
    pub(crate) const fn new(timeout: Duration, shutdown: watch::Receiver<bool>) -> Self {
        Self { timeout, shutdown }
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run `future` under the deadline only; shutdown does not interrupt it.
    pub(crate) async fn bounded<T, E, F>(
        &self,
        operation: &'static str,
        subject: &str,
        future: F,
    ) -> EngineResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Cause,
    {
        match tokio::time::timeout(self.timeout, future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.wrap(operation, subject)),
            Err(_) => Err(EngineError::Timeout {
                operation,
                subject: subject.to_string(),
                after: self.timeout,
            }),
        }
    }

    /// Run `future` under the deadline, abandoning it once shutdown fires.
    pub(crate) async fn cancellable<T, E, F>(
        &self,
        operation: &'static str,
        subject: &str,
        future: F,
    ) -> EngineResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Cause,
    {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            () = wait_for_shutdown(&mut shutdown) => Err(EngineError::Cancelled {
                operation,
                subject: subject.to_string(),
            }),
            result = self.bounded(operation, subject, future) => result,
        }
    }
}

/// Resolves once `true` is published. A dropped sender never resolves.
pub(crate) async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edi_transport::TransportError;

    fn ok_after(delay: Duration) -> impl Future<Output = Result<u8, TransportError>> {
        async move {
            tokio::time::sleep(delay).await;
            Ok(7)
        }
    }

    #[tokio::test]
    async fn bounded_reports_timeouts() {
        let (_tx, rx) = watch::channel(false);
        let guard = Guard::new(Duration::from_millis(20), rx);
        let fast = guard
            .bounded("op", "item", ok_after(Duration::ZERO))
            .await;
        assert_eq!(fast.ok(), Some(7));
        let slow = guard
            .bounded("op", "item", ok_after(Duration::from_secs(5)))
            .await;
        assert!(matches!(
            slow,
            Err(EngineError::Timeout { operation: "op", .. })
        ));
    }

    #[tokio::test]
    async fn cancellable_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let guard = Guard::new(Duration::from_secs(30), rx);
        let pending = guard.cancellable("op", "item", ok_after(Duration::from_secs(30)));
        let trigger = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(true);
        };
        let (result, ()) = tokio::join!(pending, trigger);
        assert!(matches!(result, Err(EngineError::Cancelled { .. })));
        assert!(guard.shutdown_requested());

        let after = guard
            .cancellable("op", "item", ok_after(Duration::ZERO))
            .await;
        assert!(matches!(after, Err(EngineError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn dropped_sender_never_cancels() {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        let guard = Guard::new(Duration::from_secs(1), rx);
        let result = guard
            .cancellable("op", "item", ok_after(Duration::from_millis(5)))
            .await;
        assert_eq!(result.ok(), Some(7));
    }
}
