//! The persisted collection of open offers.
//!
//! Adding and removing entries queues a coalesced save, and reloading runs
//! an explicit normalization pass: a crash while an offer was RESERVED must
//! not leave a dangling reservation, since the in-memory timer that would
//! have reverted it was lost with the process.

use std::sync::Arc;

use opentrade_types::{Offer, OfferId, OpentradeError, Result};

use crate::open_offer::{OpenOffer, OpenOfferState};
use crate::persistence::{OpenOfferRecord, PersistenceGateway};
use crate::timer::TimerService;

/// All open offers of one node, backed by a single persistence facade.
pub struct OpenOfferBook {
    offers: Vec<OpenOffer>,
    timer: Arc<dyn TimerService>,
    persistence: Arc<dyn PersistenceGateway>,
}

impl OpenOfferBook {
    #[must_use]
    pub fn new(timer: Arc<dyn TimerService>, persistence: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            offers: Vec::new(),
            timer,
            persistence,
        }
    }

    /// Publish an offer: wrap it in a state machine, bind the shared
    /// facade, and queue a save.
    ///
    /// # Errors
    /// Returns [`OpentradeError::DuplicateOffer`] if the ID is already open.
    pub fn add(&mut self, offer: Offer) -> Result<OpenOffer> {
        if self.get(&offer.id).is_some() {
            return Err(OpentradeError::DuplicateOffer(offer.id));
        }
        let open_offer = OpenOffer::new(offer, self.timer.clone());
        open_offer.bind_persistence(self.persistence.clone());
        tracing::debug!(offer = %open_offer.short_id(), "Offer published");
        self.offers.push(open_offer.clone());
        self.persistence.queue_save();
        Ok(open_offer)
    }

    /// Remove an offer from the collection and queue a save. The returned
    /// entry keeps its current state; removal itself is not a transition.
    ///
    /// # Errors
    /// Returns [`OpentradeError::OfferNotFound`] if the ID is not open.
    pub fn remove(&mut self, id: &OfferId) -> Result<OpenOffer> {
        let index = self
            .offers
            .iter()
            .position(|o| o.id() == *id)
            .ok_or(OpentradeError::OfferNotFound(*id))?;
        let open_offer = self.offers.remove(index);
        tracing::debug!(offer = %open_offer.short_id(), "Offer removed");
        self.persistence.queue_save();
        Ok(open_offer)
    }

    #[must_use]
    pub fn get(&self, id: &OfferId) -> Option<&OpenOffer> {
        self.offers.iter().find(|o| o.id() == *id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpenOffer> {
        self.offers.iter()
    }

    /// Records for the storage engine's next whole-collection write.
    #[must_use]
    pub fn snapshot(&self) -> Vec<OpenOfferRecord> {
        self.offers.iter().map(OpenOffer::to_record).collect()
    }

    /// Rebuild the collection from loaded records.
    ///
    /// Runs [`normalize_loaded`] first, then binds the (fresh, post-restart)
    /// facade handle to every entry. No timeouts are armed and no save is
    /// queued — the facade just wrote the snapshot these records came from;
    /// normalized state reaches disk with the next genuine transition.
    #[must_use]
    pub fn restore(
        records: Vec<OpenOfferRecord>,
        timer: Arc<dyn TimerService>,
        persistence: Arc<dyn PersistenceGateway>,
    ) -> Self {
        let mut book = Self::new(timer, persistence);
        for record in normalize_loaded(records) {
            let open_offer = OpenOffer::from_record(record, book.timer.clone());
            open_offer.bind_persistence(book.persistence.clone());
            book.offers.push(open_offer);
        }
        tracing::debug!(offers = book.len(), "Open-offer book restored");
        book
    }
}

/// Post-load normalization pass over a freshly deserialized collection.
///
/// - Records written by a newer schema than this build understands are
///   skipped (logged, never fatal).
/// - RESERVED records are reset to AVAILABLE: no protocol context survives
///   a restart, so a reservation without its timer must not be revived.
#[must_use]
pub fn normalize_loaded(records: Vec<OpenOfferRecord>) -> Vec<OpenOfferRecord> {
    records
        .into_iter()
        .filter_map(|mut record| {
            if !record.is_supported() {
                tracing::warn!(
                    offer = %record.offer.short_id(),
                    schema = record.schema_version,
                    "Skipping open-offer record from a newer build"
                );
                return None;
            }
            if record.state == OpenOfferState::Reserved {
                tracing::warn!(
                    offer = %record.offer.short_id(),
                    "RESERVED state found on load, resetting to AVAILABLE"
                );
                record.state = OpenOfferState::Available;
            }
            Some(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use opentrade_types::{Offer, constants};

    use super::*;
    use crate::testutil::{CountingGateway, ManualTimer};

    fn empty_book() -> (OpenOfferBook, Arc<CountingGateway>, Arc<ManualTimer>) {
        let timer = Arc::new(ManualTimer::default());
        let gateway = Arc::new(CountingGateway::default());
        let book = OpenOfferBook::new(timer.clone(), gateway.clone());
        (book, gateway, timer)
    }

    #[test]
    fn add_queues_save_and_binds_facade() {
        let (mut book, gateway, _) = empty_book();
        let open_offer = book.add(Offer::dummy_buy()).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(gateway.saves(), 1);

        // Bound facade: a state change saves through the shared gateway.
        open_offer.set_state(OpenOfferState::Reserved).unwrap();
        assert_eq!(gateway.saves(), 2);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let (mut book, _, _) = empty_book();
        let offer = Offer::dummy_buy();
        book.add(offer.clone()).unwrap();

        let err = book.add(offer.clone()).unwrap_err();
        assert!(matches!(err, OpentradeError::DuplicateOffer(id) if id == offer.id));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let (mut book, _, _) = empty_book();
        let err = book.remove(&OfferId::new()).unwrap_err();
        assert!(matches!(err, OpentradeError::OfferNotFound(_)));
    }

    #[test]
    fn remove_queues_save() {
        let (mut book, gateway, _) = empty_book();
        let open_offer = book.add(Offer::dummy_buy()).unwrap();
        book.remove(&open_offer.id()).unwrap();
        assert!(book.is_empty());
        assert_eq!(gateway.saves(), 2);
    }

    #[test]
    fn normalize_resets_reserved_records() {
        let records = vec![
            OpenOfferRecord::new(Offer::dummy_buy(), OpenOfferState::Reserved),
            OpenOfferRecord::new(Offer::dummy_buy(), OpenOfferState::Closed),
        ];
        let normalized = normalize_loaded(records);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].state, OpenOfferState::Available);
        assert_eq!(normalized[1].state, OpenOfferState::Closed);
    }

    #[test]
    fn normalize_skips_newer_schema_records() {
        let mut newer = OpenOfferRecord::new(Offer::dummy_buy(), OpenOfferState::Available);
        newer.schema_version = constants::TRADABLE_SCHEMA_VERSION + 1;
        let keep = OpenOfferRecord::new(Offer::dummy_buy(), OpenOfferState::Available);

        let normalized = normalize_loaded(vec![newer, keep.clone()]);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0], keep);
    }

    #[test]
    fn restore_yields_available_entries_without_timers_or_saves() {
        let (mut book, _, _) = empty_book();
        let open_offer = book.add(Offer::dummy_buy()).unwrap();
        open_offer.set_state(OpenOfferState::Reserved).unwrap();
        let records = book.snapshot();
        assert_eq!(records[0].state, OpenOfferState::Reserved);

        // Simulated restart: fresh timer and facade.
        let timer = Arc::new(ManualTimer::default());
        let gateway = Arc::new(CountingGateway::default());
        let restored = OpenOfferBook::restore(records, timer.clone(), gateway.clone());

        let entry = restored.get(&open_offer.id()).unwrap();
        assert_eq!(entry.state(), OpenOfferState::Available);
        assert!(!entry.has_active_timeout());
        assert_eq!(timer.scheduled(), 0);
        assert_eq!(gateway.saves(), 0);
    }

    #[test]
    fn restored_entries_save_through_rebound_facade() {
        let (mut book, _, _) = empty_book();
        book.add(Offer::dummy_buy()).unwrap();
        let records = book.snapshot();

        let timer = Arc::new(ManualTimer::default());
        let gateway = Arc::new(CountingGateway::default());
        let restored = OpenOfferBook::restore(records, timer, gateway.clone());

        let entry = restored.iter().next().unwrap();
        entry.set_state(OpenOfferState::Canceled).unwrap();
        assert_eq!(gateway.saves(), 1);
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let (mut book, _, _) = empty_book();
        let first = book.add(Offer::dummy_buy()).unwrap();
        let second = book.add(Offer::dummy_buy()).unwrap();

        let records = book.snapshot();
        assert_eq!(records[0].offer.id, first.id());
        assert_eq!(records[1].offer.id, second.id());
    }
}
