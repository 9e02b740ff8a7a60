use crate::ctw::Predictor;
use crate::utils::check_symbol;
use crate::utils::probability::to_u16;

use super::model::Model;

/// A model that predicts the next bit with Context Tree Weighting over
/// contexts of up to DEPTH bits. The history starts with DEPTH zero bits.
pub struct CtwModel<const DEPTH: usize> {
    predictor: Predictor,
}

impl<const DEPTH: usize> CtwModel<DEPTH> {
    /// Returns the predictor that holds the state of the model.
    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }
}

impl<const DEPTH: usize> Model for CtwModel<DEPTH> {
    fn new() -> Self {
        Self {
            predictor: Predictor::seeded(vec![0; DEPTH]),
        }
    }

    fn predict(&self) -> u16 {
        to_u16(self.predictor.probability_of(1))
    }

    /// Observe 'bit'. A value other than 0 or 1 is a caller bug: it trips a
    /// debug assertion, and release builds drop it without touching the
    /// state.
    fn update(&mut self, bit: u8) {
        debug_assert!(bit < 2, "Invalid bit {}", bit);
        match check_symbol(bit) {
            Ok(bit) => self.predictor.push(bit),
            Err(err) => log::error!("Ignoring update: {}", err),
        }
    }
}

#[test]
fn test_ctw_model() {
    {
        let mut model = CtwModel::<3>::new();
        // Nothing was seen yet.
        assert_eq!(model.predict(), 32768);
        for _ in 0..200 {
            model.update(1);
            model.update(0);
        }

        // Predict a '1'.
        let pred = model.predict();
        assert!(pred > 60_000);
        model.update(1);

        // Predict a zero.
        let pred = model.predict();
        assert!(pred < 5_000);
    }

    {
        let mut model = CtwModel::<2>::new();
        for _ in 0..300 {
            model.update(1);
        }
        // The prediction needs to be close to one.
        let pred = model.predict();
        assert!(pred > 65_000);
        assert_eq!(model.predictor().history().len(), 302);
    }
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "Invalid bit 2")]
fn test_invalid_update_asserts() {
    let mut model = CtwModel::<2>::new();
    model.update(2);
}

#[test]
#[cfg(not(debug_assertions))]
fn test_invalid_update_is_dropped() {
    let mut model = CtwModel::<2>::new();
    model.update(1);
    model.update(2);
    model.update(3);
    assert_eq!(model.predictor().history(), &[0, 0, 1]);
    assert_eq!(model.predictor().tree().total(), 1);
}
