#![no_main]

use ctw::utils::bits::bytes_to_bits;
use ctw::{ContextTree, Predictor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let depth = (data[0] % 6) as usize;
    let bits = bytes_to_bits(&data[1..]);
    if bits.len() < depth {
        return;
    }

    let mut predictor = Predictor::new(&bits[..depth], depth).unwrap();
    for &bit in &bits[depth..] {
        let p0 = predictor.predict(0).unwrap();
        let p1 = predictor.predict(1).unwrap();
        assert!(p0 > 0.0 && p1 > 0.0);
        assert!((p0 + p1 - 1.0).abs() < 1e-6);
        predictor = predictor.advance(bit).unwrap();
    }
    let compiled = ContextTree::compile(&bits, depth).unwrap();
    assert_eq!(predictor.tree(), &compiled);
});
