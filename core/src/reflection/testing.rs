//! Shared checks for scattering model tests.

use super::*;
use crate::rng::RNG;

/// Generates `n` lobe selection samples and `n` 2D direction samples.
///
/// * `seed` - Sequence index for the generator.
/// * `n`    - Number of samples.
pub fn random_samples(seed: u64, n: usize) -> (Vec<Float>, Vec<Point2f>) {
    let mut rng = RNG::new(seed, 0);
    let uc = (0..n).map(|_| rng.uniform_float()).collect();
    let u2 = (0..n)
        .map(|_| Point2f::new(rng.uniform_float(), rng.uniform_float()))
        .collect();
    (uc, u2)
}

/// Outgoing directions at several incidence angles in the xz-plane.
pub fn incidence_directions() -> Vec<Vector3f> {
    [1.0, 0.9, 0.5, 0.2]
        .iter()
        .map(|&cos_theta: &Float| {
            let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
            Vector3f::new(sin_theta, 0.0, cos_theta)
        })
        .collect()
}

/// Estimates directional albedo for `wo` with `n` samples.
///
/// * `bxdf` - The scattering model.
/// * `wo`   - Outgoing direction.
/// * `n`    - Number of samples.
pub fn white_furnace<B: BxDFI>(bxdf: &B, wo: &Vector3f, n: usize) -> Spectrum {
    let (uc, u2) = random_samples(17, n);
    bxdf.rho_hd(wo, &uc, &u2)
}

/// Checks that every non-specular sample reports the same value and density as
/// `f()` and `pdf()` for the sampled direction, and that no sample violates
/// the request flags.
///
/// * `bxdf`  - The scattering model.
/// * `wo`    - Outgoing direction.
/// * `mode`  - Transport mode.
/// * `flags` - Request flags.
/// * `n`     - Number of samples.
pub fn assert_sample_matches_pdf<B: BxDFI>(
    bxdf: &B,
    wo: &Vector3f,
    mode: TransportMode,
    flags: BxDFReflTransFlags,
    n: usize,
) {
    let (uc, u2) = random_samples(29, n);
    for (uc, u) in uc.iter().zip(u2.iter()) {
        let bs = match bxdf.sample_f(wo, *uc, u, mode, flags) {
            Some(bs) => bs,
            None => continue,
        };

        if same_hemisphere(wo, &bs.wi) {
            assert!(flags.allows_reflection(), "reflection sampled under {flags:?}");
        } else {
            assert!(flags.allows_transmission(), "transmission sampled under {flags:?}");
        }
        if bs.is_specular() || bs.pdf_is_proportional {
            continue;
        }

        let pdf = bxdf.pdf(wo, &bs.wi, mode, flags);
        assert!(
            abs(pdf - bs.pdf) <= 0.01 * max(1.0, bs.pdf),
            "pdf {} != sampled pdf {} for wi {}",
            pdf,
            bs.pdf,
            bs.wi
        );

        let f = bxdf.f(wo, &bs.wi, mode);
        for i in 0..N_SPECTRUM_SAMPLES {
            assert!(
                abs(f[i] - bs.f[i]) <= 0.01 * max(1.0, bs.f[i]),
                "f {} != sampled f {} for wi {}",
                f,
                bs.f,
                bs.wi
            );
        }
    }
}
