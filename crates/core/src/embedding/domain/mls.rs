//! Mutual Likelihood Score between probabilistic face embeddings.
//!
//! `MLS = -Σ (μ1 - μ2)² / (σ1² + σ2²) - Σ ln(σ1² + σ2²)`
//!
//! The first term punishes mean differences harder in dimensions where both
//! faces are confident. The second term punishes uncertainty itself, so
//! inflating variance can never buy a better score. Higher (less negative)
//! means more likely the same person.

use ndarray::ArrayView1;

use crate::embedding::domain::pfe::Pfe;

/// General elementwise MLS. Callers guarantee equal lengths and positive variances.
pub fn mls(
    mu1: ArrayView1<f64>,
    sigma1: ArrayView1<f64>,
    mu2: ArrayView1<f64>,
    sigma2: ArrayView1<f64>,
) -> f64 {
    let combined = &sigma1 + &sigma2;
    let diff = &mu1 - &mu2;
    let mahalanobis = (&diff * &diff / &combined).sum();
    let log_det = combined.mapv(f64::ln).sum();
    -mahalanobis - log_det
}

/// MLS between two PFEs.
///
/// With uniform variance on both sides the log term collapses to
/// `n · ln(σ1² + σ2²)`, skipping 2n logarithms per pair.
pub fn pfe_mls(a: &Pfe, b: &Pfe) -> f64 {
    match (a.uniform_sigma_sq(), b.uniform_sigma_sq()) {
        (Some(s1), Some(s2)) => {
            let combined = s1 + s2;
            let sq_dist: f64 = a
                .mu()
                .iter()
                .zip(b.mu().iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum();
            -(sq_dist / combined) - a.dim() as f64 * combined.ln()
        }
        _ => mls(a.mu(), a.sigma_sq(), b.mu(), b.sigma_sq()),
    }
}
