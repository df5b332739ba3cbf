#![allow(dead_code)]

use diagnos_classifiers::data_handling::{Dataset, Diagnosis, Record};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Two noisy clusters: malignant rows are shifted on the first half of the
/// features, the rest is pure noise. Benign rows come first.
pub fn synthetic_dataset(benign: usize, malignant: usize, n_features: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut records = Vec::with_capacity(benign + malignant);
    for (label, count) in [(Diagnosis::Benign, benign), (Diagnosis::Malignant, malignant)] {
        for _ in 0..count {
            let features = (0..n_features)
                .map(|j| {
                    let shift = if label.is_positive() && j < n_features / 2 {
                        2.5
                    } else {
                        0.0
                    };
                    shift + (j as f64 + 1.0) * rng.gen_range(-1.0..1.0)
                })
                .collect();
            records.push(Record::new(features, label));
        }
    }
    Dataset::from_records(&records, vec![]).unwrap()
}

pub fn labels(benign: usize, malignant: usize) -> Vec<Diagnosis> {
    let mut y = vec![Diagnosis::Benign; benign];
    y.extend(vec![Diagnosis::Malignant; malignant]);
    y
}
