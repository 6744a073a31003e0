//! # session
//!
//! One [`Session`] per form user: its current [`TradeParameters`] and the
//! [`LadderStore`] built from them.
//!
//! ## Concurrency
//!
//! * [`SessionRegistry`] maps `Uuid → Arc<Mutex<Session>>` behind a
//!   `tokio::sync::RwLock`.  The map lock is held only long enough to clone
//!   a handle out.
//! * Every reset / extend is a read-modify-write over one ladder (read the
//!   max/min, then append/prepend), so each session has its own `Mutex`.
//!   Two sessions never contend; two requests on the same session run one
//!   after the other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::{ResultProjector, SettlementCalculator, TickSchedule};
use crate::error::SimError;
use crate::ladder::{LadderStore, Side};
use crate::models::{SettlementRow, TradeParameters};

// ─── Session ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Session {
    pub id:          Uuid,
    params:          TradeParameters,
    store:           LadderStore,
    pub created_at:  DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// What a `GET` on a session returns.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id:  Uuid,
    pub params:      TradeParameters,
    pub ladder_size: usize,
    pub created_at:  DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub rows:        Vec<SettlementRow>,
}

impl Session {
    /// Create and perform the initial reset around `params.entry_price()`.
    pub fn open(
        params:    TradeParameters,
        canonical: &Arc<TickSchedule>,
        run_len:   usize,
    ) -> Result<Self, SimError> {
        let mut store = LadderStore::new(schedule_for(&params, canonical)?, run_len);
        store.reset(params.entry_price())?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            params,
            store,
            created_at: now,
            last_active: now,
        })
    }

    pub fn params(&self) -> &TradeParameters {
        &self.params
    }

    pub fn ladder(&self) -> &LadderStore {
        &self.store
    }

    /// Replace the parameters.  The ladder is rebuilt only when the entry
    /// price or price step changed; share count, discount, trade type and
    /// direction feed the projection alone.  Returns whether a reset happened.
    ///
    /// The replacement ladder is built and projected before anything is
    /// committed: on error the session keeps its previous params and ladder.
    pub fn apply_params(
        &mut self,
        next:       TradeParameters,
        canonical:  &Arc<TickSchedule>,
        calculator: &SettlementCalculator,
    ) -> Result<bool, SimError> {
        self.touch();

        let reset = self.params.requires_reset(&next);
        let store = if !reset {
            None
        } else if self.params.price_step() == next.price_step() {
            let mut store = self.store.clone();
            store.reset(next.entry_price())?;
            Some(store)
        } else {
            let mut store = LadderStore::new(schedule_for(&next, canonical)?, self.store.run_len());
            store.reset(next.entry_price())?;
            Some(store)
        };

        let ladder = store.as_ref().unwrap_or(&self.store);
        ResultProjector::new(calculator).project(ladder.prices(), &next)?;

        if let Some(store) = store {
            self.store = store;
        }
        self.params = next;
        Ok(reset)
    }

    pub fn extend(&mut self, side: Side) -> Result<usize, SimError> {
        self.touch();
        self.store.extend(side)
    }

    pub fn project(&self, calculator: &SettlementCalculator) -> Result<Vec<SettlementRow>, SimError> {
        ResultProjector::new(calculator).project(self.store.prices(), &self.params)
    }

    pub fn view(&self, calculator: &SettlementCalculator) -> Result<SessionView, SimError> {
        Ok(SessionView {
            session_id:  self.id,
            params:      self.params.clone(),
            ladder_size: self.store.len(),
            created_at:  self.created_at,
            last_active: self.last_active,
            rows:        self.project(calculator)?,
        })
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn idle_for_at_least(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        (now - self.last_active)
            .to_std()
            .map(|idle| idle >= ttl)
            .unwrap_or(false)
    }
}

/// Canonical exchange schedule, or a uniform one when the user fixed a step.
fn schedule_for(
    params:    &TradeParameters,
    canonical: &Arc<TickSchedule>,
) -> Result<Arc<TickSchedule>, SimError> {
    match params.price_step() {
        Some(step) => Ok(Arc::new(TickSchedule::uniform(step)?)),
        None => Ok(Arc::clone(canonical)),
    }
}

// ─── SessionRegistry ──────────────────────────────────────────────────────────

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: Session) -> SessionHandle {
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        debug!(session_id = %id, "session registered");
        handle
    }

    /// Clone the handle out so the map lock is released before the caller
    /// locks the session itself.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions untouched for `ttl`.  A session whose lock is held right
    /// now is in use and therefore not idle.
    pub async fn evict_idle(&self, ttl: Duration) -> Vec<Uuid> {
        let now = Utc::now();
        let mut map = self.sessions.write().await;

        let expired: Vec<Uuid> = map
            .iter()
            .filter(|(_, handle)| {
                handle
                    .try_lock()
                    .map(|s| s.idle_for_at_least(ttl, now))
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            map.remove(id);
        }

        if !expired.is_empty() {
            info!(evicted = expired.len(), remaining = map.len(), "🧹 idle sessions evicted");
        }
        expired
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, TradeType};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn canonical() -> Arc<TickSchedule> {
        Arc::new(TickSchedule::canonical())
    }

    fn make_params(entry: Decimal, shares: i64, step: Option<Decimal>) -> TradeParameters {
        TradeParameters::new(entry, shares, dec!(2.8), TradeType::Intraday, Direction::Long, step)
            .unwrap()
    }

    #[test]
    fn test_open_resets_ladder() {
        let s = Session::open(make_params(dec!(100), 1000, None), &canonical(), 5).unwrap();
        assert_eq!(s.ladder().len(), 11);
        assert_eq!(s.ladder().entry(), Some(dec!(100)));
    }

    #[test]
    fn test_share_change_keeps_ladder() {
        let sched = canonical();
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &sched, 5).unwrap();
        s.extend(Side::Up).unwrap();

        let reset = s.apply_params(make_params(dec!(100), 2000, None), &sched, &calc).unwrap();
        assert!(!reset);
        assert_eq!(s.ladder().len(), 16);
        assert_eq!(s.params().share_count(), 2000);
    }

    #[test]
    fn test_entry_change_resets_ladder() {
        let sched = canonical();
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &sched, 5).unwrap();
        s.extend(Side::Down).unwrap();

        assert!(s.apply_params(make_params(dec!(50), 1000, None), &sched, &calc).unwrap());
        assert_eq!(s.ladder().len(), 11);
        assert_eq!(s.ladder().entry(), Some(dec!(50)));
    }

    #[test]
    fn test_step_change_switches_schedule() {
        let sched = canonical();
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &sched, 5).unwrap();

        assert!(s.apply_params(make_params(dec!(100), 1000, Some(dec!(1))), &sched, &calc).unwrap());
        let prices: Vec<_> = s.ladder().prices().collect();
        assert_eq!(prices.first(), Some(&dec!(95)));
        assert_eq!(prices.last(), Some(&dec!(105)));
    }

    #[test]
    fn test_failed_reset_keeps_old_params() {
        let sched = canonical();
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &sched, 5).unwrap();

        assert!(s.apply_params(make_params(dec!(0.03), 1000, None), &sched, &calc).is_err());
        assert_eq!(s.params().entry_price(), dec!(100));
        assert_eq!(s.ladder().len(), 11);
    }

    #[test]
    fn test_failed_projection_keeps_session_usable() {
        let sched = canonical();
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &sched, 5).unwrap();
        s.extend(Side::Up).unwrap();

        // fee overflows on the new ladder
        let huge = SettlementCalculator { fee_rate: Decimal::MAX, ..Default::default() };
        assert_eq!(
            s.apply_params(make_params(dec!(200), 1000, None), &sched, &huge),
            Err(SimError::AmountOverflow),
        );

        assert_eq!(s.params().entry_price(), dec!(100));
        assert_eq!(s.ladder().len(), 16);
        assert_eq!(s.view(&calc).unwrap().rows.len(), 16);
    }

    #[test]
    fn test_projection_rows_sorted() {
        let calc = SettlementCalculator::default();
        let mut s = Session::open(make_params(dec!(100), 1000, None), &canonical(), 5).unwrap();
        s.extend(Side::Down).unwrap();
        let rows = s.project(&calc).unwrap();
        assert_eq!(rows.len(), 16);
        assert!(rows.windows(2).all(|w| w[0].exit_price < w[1].exit_price));
    }

    #[tokio::test]
    async fn test_registry_roundtrip() {
        let reg = SessionRegistry::new();
        let s = Session::open(make_params(dec!(100), 1000, None), &canonical(), 5).unwrap();
        let id = s.id;

        reg.insert(s).await;
        assert_eq!(reg.len().await, 1);
        assert!(reg.get(id).await.is_some());
        assert!(reg.remove(id).await);
        assert!(!reg.remove(id).await);
        assert!(reg.is_empty().await);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let reg = SessionRegistry::new();
        let mut stale = Session::open(make_params(dec!(100), 1000, None), &canonical(), 5).unwrap();
        stale.last_active = Utc::now() - chrono::Duration::hours(2);
        let stale_id = stale.id;
        let fresh = Session::open(make_params(dec!(200), 1000, None), &canonical(), 5).unwrap();
        let fresh_id = fresh.id;

        reg.insert(stale).await;
        reg.insert(fresh).await;

        let evicted = reg.evict_idle(Duration::from_secs(3600)).await;
        assert_eq!(evicted, vec![stale_id]);
        assert!(reg.get(fresh_id).await.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_extensions_stay_sorted() {
        let reg = Arc::new(SessionRegistry::new());
        let s = Session::open(make_params(dec!(100), 1000, None), &canonical(), 5).unwrap();
        let id = s.id;
        reg.insert(s).await;

        let mut tasks = Vec::new();
        for i in 0..16 {
            let reg = Arc::clone(&reg);
            tasks.push(tokio::spawn(async move {
                let handle = reg.get(id).await.unwrap();
                let side = if i % 2 == 0 { Side::Up } else { Side::Down };
                handle.lock().await.extend(side).unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let handle = reg.get(id).await.unwrap();
        let session = handle.lock().await;
        let prices: Vec<_> = session.ladder().prices().collect();
        assert_eq!(prices.len(), 11 + 16 * 5);
        assert!(prices.windows(2).all(|w| w[0] < w[1]));
    }
}
