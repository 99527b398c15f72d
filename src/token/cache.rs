use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use jiff::Timestamp;
use tracing::debug;

use crate::errors::Error;
use crate::telemetry::refresh::RefreshTelemetry;

use super::{RefreshPolicy, TokenClaims, codec};

type RefreshFuture = Shared<BoxFuture<'static, Result<CachedToken, Error>>>;

#[derive(Clone, Debug)]
struct CachedToken {
    value: String,
    // None when the token could not be decoded; such a token is always expiring.
    claims: Option<TokenClaims>,
}

enum Slot {
    Empty,
    Pending {
        generation: u64,
        refresh: RefreshFuture,
        // Callers currently awaiting `refresh`.
        waiters: usize,
    },
    Ready(CachedToken),
}

// Counts one caller awaiting a published refresh; the last one to leave
// before it settles clears the slot.
struct Waiter<'a> {
    cache: &'a TokenCache,
    generation: u64,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.cache.leave(self.generation);
    }
}

/// Holds at most one bearer token and at most one outstanding refresh.
///
/// The refresh decision and the publication of the in-flight operation happen
/// under a synchronous lock that is never held across an `.await`, so callers
/// arriving while a refresh is outstanding join it instead of starting another.
pub struct TokenCache {
    slot: Mutex<Slot>,
    generation: AtomicU64,
    policy: RefreshPolicy,
    context: String,
}

impl TokenCache {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
            generation: AtomicU64::new(0),
            policy,
            context: String::from("token_cache"),
        }
    }

    /// Labels refresh telemetry emitted by this cache.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Places an externally obtained token in the cache.
    ///
    /// A token that cannot be decoded is kept but treated as expiring.
    pub fn seed(&self, value: impl Into<String>) {
        let value = value.into();
        let claims = match codec::decode(&value) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "seeded token is not decodable; will refresh on next use");
                None
            }
        };
        *self.lock_slot() = Slot::Ready(CachedToken { value, claims });
    }

    /// Drops any cached token or in-flight refresh.
    pub fn clear(&self) {
        *self.lock_slot() = Slot::Empty;
    }

    /// Returns the cached token, or the result of the single refresh `fetch` starts.
    ///
    /// `fetch` is only invoked when this call has to start a refresh itself.
    pub async fn get_token<F, Fut>(&self, force_refresh: bool, fetch: F) -> Result<String, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, Error>> + Send + 'static,
    {
        let (generation, refresh) = {
            let mut slot = self.lock_slot();
            let now = Timestamp::now().as_second();
            if let Slot::Ready(token) = &*slot
                && !force_refresh
                && !self.is_expiring(token, now)
            {
                debug!("token cache hit");
                return Ok(token.value.clone());
            }
            let joined = match &mut *slot {
                Slot::Pending {
                    generation,
                    refresh,
                    waiters,
                } if !force_refresh => {
                    *waiters += 1;
                    debug!(generation = *generation, "joining in-flight token refresh");
                    Some((*generation, refresh.clone()))
                }
                _ => None,
            };
            match joined {
                Some(pending) => pending,
                None => {
                    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                    let telemetry = RefreshTelemetry::new(self.context.clone());
                    let refresh = start_refresh(fetch(), telemetry);
                    *slot = Slot::Pending {
                        generation,
                        refresh: refresh.clone(),
                        waiters: 1,
                    };
                    (generation, refresh)
                }
            }
        };

        let _waiter = Waiter {
            cache: self,
            generation,
        };
        let outcome = refresh.await;
        self.settle(generation, &outcome);
        outcome.map(|token| token.value)
    }

    fn is_expiring(&self, token: &CachedToken, now: i64) -> bool {
        match &token.claims {
            Some(claims) => self.policy.is_expiring(claims, now),
            None => true,
        }
    }

    // Only the refresh that is still published may update the slot; a forced
    // refresh started meanwhile owns it instead.
    fn settle(&self, generation: u64, outcome: &Result<CachedToken, Error>) {
        let mut slot = self.lock_slot();
        if let Slot::Pending {
            generation: current,
            ..
        } = &*slot
            && *current == generation
        {
            *slot = match outcome {
                Ok(token) => Slot::Ready(token.clone()),
                Err(_) => Slot::Empty,
            };
        }
    }

    // A refresh nobody awaits any more is dropped, which cancels its I/O.
    fn leave(&self, generation: u64) {
        let mut slot = self.lock_slot();
        let abandoned = match &mut *slot {
            Slot::Pending {
                generation: current,
                waiters,
                ..
            } if *current == generation => {
                *waiters -= 1;
                *waiters == 0
            }
            _ => false,
        };
        if abandoned {
            debug!(generation, "token refresh abandoned by every caller");
            *slot = Slot::Empty;
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(RefreshPolicy::default())
    }
}

fn start_refresh<Fut>(fetch: Fut, telemetry: RefreshTelemetry) -> RefreshFuture
where
    Fut: Future<Output = Result<String, Error>> + Send + 'static,
{
    async move {
        telemetry.emit_start(Timestamp::now());
        let result: Result<CachedToken, Error> = async {
            let value = fetch.await?;
            let claims = codec::decode(&value)?;
            Ok(CachedToken {
                value,
                claims: Some(claims),
            })
        }
        .await;
        match &result {
            Ok(token) => telemetry.emit_success(
                token.claims.map(|c| c.expires_at).unwrap_or_default(),
                Timestamp::now(),
            ),
            Err(err) => telemetry.emit_failure(err, Timestamp::now()),
        }
        result
    }
    .boxed()
    .shared()
}
