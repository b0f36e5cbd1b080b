//! Background enumeration on the tokio blocking pool.
//!
//! A [`PendingEnumeration`] drains one module's stream off the interactive
//! thread. It carries the selection epoch it was started for, so the
//! controller can drop results that a newer selection has superseded.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{drain_symbols, SymbolStore};
use crate::core::{Module, SymbolSet};
use crate::engine::SymbolEnumerator;
use crate::error::{Result, SymbolViewError};
use crate::timeout::{with_timeout, CancellationToken, TimeoutConfig};

/// Enumeration running on the blocking pool
pub struct PendingEnumeration {
    module: Module,
    epoch: u64,
    token: CancellationToken,
    timeout_seconds: u64,
    handle: JoinHandle<Result<SymbolSet>>,
}

/// Outcome of a [`PendingEnumeration`], tagged with its selection epoch
#[derive(Debug)]
pub struct CompletedEnumeration {
    pub module: Module,
    pub epoch: u64,
    pub result: Result<SymbolSet>,
}

impl PendingEnumeration {
    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Ask the drain to stop at the next symbol
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the drain, bounded by the configured timeout (zero waits
    /// without a bound).
    ///
    /// On timeout the drain is cancelled so the blocking thread is released.
    pub async fn finish(self) -> CompletedEnumeration {
        let PendingEnumeration {
            module,
            epoch,
            token,
            timeout_seconds,
            handle,
        } = self;

        let joined = async move {
            handle
                .await
                .map_err(|e| SymbolViewError::Internal(format!("enumeration task failed: {e}")))?
        };
        let result = if timeout_seconds == 0 {
            joined.await
        } else {
            let config =
                TimeoutConfig::new(timeout_seconds, format!("enumerate {}", module.name));
            with_timeout(config, joined).await
        };

        if matches!(result, Err(SymbolViewError::Timeout { .. })) {
            token.cancel();
        }

        CompletedEnumeration {
            module,
            epoch,
            result,
        }
    }
}

impl<E> SymbolStore<E>
where
    E: SymbolEnumerator + Send + Sync + 'static,
{
    /// Start enumerating `module` on the tokio blocking pool.
    ///
    /// The cache is not consulted or updated; the caller decides what to do
    /// with the [`CompletedEnumeration`]. Fails when called outside a tokio
    /// runtime.
    pub fn spawn_enumeration(&self, module: Module, epoch: u64) -> Result<PendingEnumeration> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SymbolViewError::Internal(format!("no async runtime: {e}")))?;

        let token = CancellationToken::new();
        let engine = Arc::clone(self.engine());
        let config = self.config().clone();
        let task_module = module.clone();
        let task_token = token.clone();

        debug!(module = %module.name, epoch, "spawning background enumeration");
        let handle = runtime.spawn_blocking(move || {
            drain_symbols(engine.as_ref(), &task_module, &config, Some(task_token))
        });

        Ok(PendingEnumeration {
            module,
            epoch,
            token,
            timeout_seconds: self.config().async_timeout_seconds,
            handle,
        })
    }
}
