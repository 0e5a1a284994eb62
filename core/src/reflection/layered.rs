//! Layered

use super::*;
use crate::hash;
use crate::medium::*;
use crate::options::*;
use crate::rng::*;

/// Parameters controlling the stochastic estimators of `LayeredBxDF`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayeredTuning {
    /// Random walk depth after which Russian roulette may terminate a path.
    pub rr_depth: usize,

    /// Throughput below which Russian roulette is applied.
    pub rr_threshold: Float,

    /// Weight of the stochastic estimate in the returned PDF. The remainder is
    /// a uniform spherical density.
    pub pdf_mix: Float,
}

impl Default for LayeredTuning {
    fn default() -> Self {
        Self {
            rr_depth: 3,
            rr_threshold: 0.25,
            pdf_mix: 0.9,
        }
    }
}

/// Borrows either interface of a `LayeredBxDF`.
pub enum TopOrBottomBxDF<'a, T, B> {
    Top(&'a T),
    Bottom(&'a B),
}

impl<'a, T: BxDFI, B: BxDFI> TopOrBottomBxDF<'a, T, B> {
    /// Returns the value of the distribution function.
    ///
    /// * `wo`   - Outgoing direction.
    /// * `wi`   - Incident direction.
    /// * `mode` - Transport mode.
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        match self {
            Self::Top(bxdf) => bxdf.f(wo, wi, mode),
            Self::Bottom(bxdf) => bxdf.f(wo, wi, mode),
        }
    }

    /// Samples an incident direction.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `uc`           - Uniform sample used to choose between lobes.
    /// * `u`            - The 2D uniform random values.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Restricts sampling to reflection and/or transmission.
    pub fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        match self {
            Self::Top(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Bottom(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
        }
    }

    /// Returns the sampling density.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `wi`           - Incident direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Restricts sampling to reflection and/or transmission.
    pub fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        match self {
            Self::Top(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Bottom(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
        }
    }

    /// Returns the lobes present.
    pub fn flags(&self) -> BxDFFlags {
        match self {
            Self::Top(bxdf) => bxdf.flags(),
            Self::Bottom(bxdf) => bxdf.flags(),
        }
    }
}

/// Two interfaces separated by a slab of homogeneous participating medium.
/// Light transport inside the slab is estimated stochastically with a random
/// walk, so `f()` and `pdf()` are unbiased estimates and sampled PDFs are only
/// proportional to the true density.
///
/// When `TWO_SIDED` is set, directions below the surface are mirrored so light
/// always enters through the top interface.
#[derive(Clone, Debug)]
pub struct LayeredBxDF<T, B, const TWO_SIDED: bool> {
    /// Interface at z = thickness.
    top: T,

    /// Interface at z = 0.
    bottom: B,

    /// Thickness of the medium in units of mean free path.
    thickness: Float,

    /// Henyey-Greenstein asymmetry parameter of the medium.
    g: Float,

    /// Single scattering albedo. Black means no medium.
    albedo: Spectrum,

    /// Maximum number of scattering events per walk.
    max_depth: usize,

    /// Number of walks averaged by `f()` and `pdf()`.
    n_samples: usize,

    /// Estimator parameters.
    tuning: LayeredTuning,
}

/// Dielectric coating over a diffuse base.
pub type CoatedDiffuseBxDF = LayeredBxDF<DielectricBxDF, DiffuseBxDF, true>;

/// Dielectric coating over a conductor.
pub type CoatedConductorBxDF = LayeredBxDF<DielectricBxDF, ConductorBxDF, true>;

impl<T: BxDFI, B: BxDFI, const TWO_SIDED: bool> LayeredBxDF<T, B, TWO_SIDED> {
    /// Create a new instance of `LayeredBxDF`.
    ///
    /// * `top`       - Interface at the top of the slab.
    /// * `bottom`    - Interface at the bottom of the slab.
    /// * `thickness` - Slab thickness.
    /// * `albedo`    - Medium scattering albedo.
    /// * `g`         - Medium Henyey-Greenstein asymmetry parameter.
    /// * `max_depth` - Maximum random walk depth.
    /// * `n_samples` - Number of estimates to average.
    pub fn new(
        top: T,
        bottom: B,
        thickness: Float,
        albedo: Spectrum,
        g: Float,
        max_depth: usize,
        n_samples: usize,
    ) -> Self {
        debug_assert!(
            top.flags().is_transmissive() || bottom.flags().is_transmissive(),
            "at least one layer interface must transmit"
        );

        let thickness = if thickness < Float::MIN_POSITIVE {
            warn!(
                "Layer thickness {} is not positive; using {}.",
                thickness,
                Float::MIN_POSITIVE
            );
            Float::MIN_POSITIVE
        } else {
            thickness
        };
        let n_samples = if n_samples == 0 {
            warn!("Layered BxDF needs at least one sample; using 1.");
            1
        } else {
            n_samples
        };

        Self {
            top,
            bottom,
            thickness,
            g,
            albedo,
            max_depth,
            n_samples,
            tuning: LayeredTuning::default(),
        }
    }

    /// Replace the estimator parameters.
    ///
    /// * `tuning` - Estimator parameters.
    pub fn with_tuning(mut self, tuning: LayeredTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Returns the slab thickness.
    pub fn thickness(&self) -> Float {
        self.thickness
    }

    /// Returns the top interface.
    pub fn top(&self) -> &T {
        &self.top
    }

    /// Returns the bottom interface.
    pub fn bottom(&self) -> &B {
        &self.bottom
    }

    fn top_interface(&self) -> TopOrBottomBxDF<'_, T, B> {
        TopOrBottomBxDF::Top(&self.top)
    }

    fn bottom_interface(&self) -> TopOrBottomBxDF<'_, T, B> {
        TopOrBottomBxDF::Bottom(&self.bottom)
    }

    /// Returns true if light enters the slab through the top for `wo`.
    fn enters_top(wo: &Vector3f) -> bool {
        TWO_SIDED || wo.z > 0.0
    }
}

/// Transmittance through a slab of unit extinction over a vertical distance
/// `dz` along `w`.
///
/// * `dz` - Vertical distance.
/// * `w`  - Direction.
#[inline]
fn tr(dz: Float, w: &Vector3f) -> Float {
    if abs(dz) <= Float::MIN_POSITIVE {
        1.0
    } else {
        (-abs(dz / w.z)).exp()
    }
}

/// Returns true if an interface sample can continue a walk.
fn is_usable(bs: &BSDFSample) -> bool {
    bs.f.is_nonzero() && bs.pdf > 0.0 && bs.wi.z != 0.0
}

impl<T: BxDFI, B: BxDFI, const TWO_SIDED: bool> BxDFI for LayeredBxDF<T, B, TWO_SIDED> {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        let (mut wo, mut wi) = (*wo, *wi);
        if TWO_SIDED && wo.z < 0.0 {
            wo = -wo;
            wi = -wi;
        }

        let entered_top = Self::enters_top(&wo);
        let enter = if entered_top {
            self.top_interface()
        } else {
            self.bottom_interface()
        };

        let is_reflection = same_hemisphere(&wo, &wi);
        let exit_at_bottom = is_reflection ^ entered_top;
        let (exit, non_exit) = if exit_at_bottom {
            (self.bottom_interface(), self.top_interface())
        } else {
            (self.top_interface(), self.bottom_interface())
        };
        let exit_z = if exit_at_bottom { 0.0 } else { self.thickness };
        let exit_specular = exit.flags().is_specular();
        let non_exit_specular = non_exit.flags().is_specular();

        let n = self.n_samples as Float;
        let mut f = if is_reflection {
            n * enter.f(&wo, &wi, mode)
        } else {
            Spectrum::ZERO
        };

        let seed = options().seed;
        let mut rng = RNG::new(hash!(seed, wo), hash!(wi));
        let mut r = || min(rng.uniform_float(), ONE_MINUS_EPSILON);

        let thickness = self.thickness;
        let phase = HGPhaseFunction::new(self.g);
        let transmission = BxDFReflTransFlags::TRANSMISSION;
        let reflection = BxDFReflTransFlags::REFLECTION;

        for _ in 0..self.n_samples {
            // Transmission through the entrance interface.
            let uc = r();
            let u = Point2f::new(r(), r());
            let wos = match enter
                .sample_f(&wo, uc, &u, mode, transmission)
                .filter(is_usable)
            {
                Some(bs) => bs,
                None => continue,
            };

            // Virtual light sample from `wi` through the exit interface.
            let uc = r();
            let u = Point2f::new(r(), r());
            let wis = match exit
                .sample_f(&wi, uc, &u, !mode, transmission)
                .filter(is_usable)
            {
                Some(bs) => bs,
                None => continue,
            };

            let mut beta = wos.f * abs_cos_theta(&wos.wi) / wos.pdf;
            let mut z = if entered_top { thickness } else { 0.0 };
            let mut w = wos.wi;

            for depth in 0..self.max_depth {
                trace!("depth: {}, beta: {}, w: {}, f: {}", depth, beta, w, f);

                let max_beta = beta.max_component_value();
                if depth > self.tuning.rr_depth && max_beta < self.tuning.rr_threshold {
                    let q = max(0.0, 1.0 - max_beta);
                    if r() < q {
                        break;
                    }
                    beta /= 1.0 - q;
                    trace!("after RR with q = {}, beta: {}", q, beta);
                }

                if self.albedo.is_black() {
                    // Advance to the other interface.
                    z = if z == thickness { 0.0 } else { thickness };
                    beta *= tr(thickness, &w);
                } else {
                    let sigma_t = 1.0;
                    let dz = sample_exponential(r(), sigma_t / abs(w.z));
                    let zp = if w.z > 0.0 { z + dz } else { z - dz };
                    if z == zp {
                        continue;
                    }

                    if 0.0 < zp && zp < thickness {
                        // Scattering inside the medium; connect to the virtual
                        // light through the exit interface.
                        let wt = if exit_specular {
                            1.0
                        } else {
                            power_heuristic(1, wis.pdf, 1, phase.pdf(&-w, &-wis.wi))
                        };
                        f += beta
                            * self.albedo
                            * (phase.p(&-w, &-wis.wi) * wt * tr(zp - exit_z, &wis.wi))
                            * wis.f
                            / wis.pdf;

                        let u = Point2f::new(r(), r());
                        let ps = match phase.sample_p(&-w, &u) {
                            Some(ps) if ps.pdf > 0.0 && ps.wi.z != 0.0 => ps,
                            _ => continue,
                        };
                        beta *= self.albedo * ps.p / ps.pdf;
                        w = ps.wi;
                        z = zp;

                        let heads_to_exit = (z < exit_z && w.z > 0.0) || (z > exit_z && w.z < 0.0);
                        if heads_to_exit && !exit_specular {
                            let f_exit = exit.f(&-w, &wi, mode);
                            if f_exit.is_nonzero() {
                                // Density of `wis` producing `-w`.
                                let exit_pdf = exit.pdf(&wi, &-w, !mode, transmission);
                                let wt = power_heuristic(1, ps.pdf, 1, exit_pdf);
                                f += beta * tr(zp - exit_z, &ps.wi) * f_exit * wt;
                            }
                        }
                        continue;
                    }
                    z = clamp(zp, 0.0, thickness);
                }

                if z == exit_z {
                    // Reflect off the exit interface back into the slab.
                    let uc = r();
                    let u = Point2f::new(r(), r());
                    let bs = match exit
                        .sample_f(&-w, uc, &u, mode, reflection)
                        .filter(is_usable)
                    {
                        Some(bs) => bs,
                        None => break,
                    };
                    beta *= bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                    w = bs.wi;
                } else {
                    if !non_exit_specular {
                        // Connect to the virtual light along `wis`.
                        let wt = if exit_specular {
                            1.0
                        } else {
                            let non_exit_pdf =
                                non_exit.pdf(&-w, &-wis.wi, mode, BxDFReflTransFlags::ALL);
                            power_heuristic(1, wis.pdf, 1, non_exit_pdf)
                        };
                        f += beta
                            * non_exit.f(&-w, &-wis.wi, mode)
                            * (abs_cos_theta(&wis.wi) * wt * tr(thickness, &wis.wi))
                            * wis.f
                            / wis.pdf;
                    }

                    let uc = r();
                    let u = Point2f::new(r(), r());
                    let bs = match non_exit
                        .sample_f(&-w, uc, &u, mode, reflection)
                        .filter(is_usable)
                    {
                        Some(bs) => bs,
                        None => break,
                    };
                    beta *= bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                    w = bs.wi;

                    if !exit_specular {
                        // Connect through the exit interface along the new
                        // direction.
                        let f_exit = exit.f(&-w, &wi, mode);
                        if f_exit.is_nonzero() {
                            let wt = if non_exit_specular {
                                1.0
                            } else {
                                let exit_pdf = exit.pdf(&wi, &-w, !mode, transmission);
                                power_heuristic(1, bs.pdf, 1, exit_pdf)
                            };
                            f += beta * tr(thickness, &bs.wi) * f_exit * wt;
                        }
                    }
                }
            }
        }

        f / n
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let mut wo = *wo;
        let flip_wi = TWO_SIDED && wo.z < 0.0;
        if flip_wi {
            wo = -wo;
        }

        // Initial direction from the entrance interface.
        let entered_top = Self::enters_top(&wo);
        let enter = if entered_top {
            self.top_interface()
        } else {
            self.bottom_interface()
        };
        let bs = enter
            .sample_f(&wo, uc, u, mode, BxDFReflTransFlags::ALL)
            .filter(is_usable)?;
        if bs.is_reflection() {
            if !sample_flags.allows_reflection() {
                return None;
            }
            let wi = if flip_wi { -bs.wi } else { bs.wi };
            return Some(BSDFSample { wi, ..bs }.with_proportional_pdf(true));
        }

        let mut w = bs.wi;
        let mut specular_path = bs.is_specular();

        let seed = options().seed;
        let mut rng = RNG::new(hash!(seed, wo), hash!(uc, u));
        let mut r = || min(rng.uniform_float(), ONE_MINUS_EPSILON);

        let thickness = self.thickness;
        let mut f = bs.f * abs_cos_theta(&bs.wi);
        let mut pdf = bs.pdf;
        let mut z = if entered_top { thickness } else { 0.0 };
        let phase = HGPhaseFunction::new(self.g);

        for depth in 0..self.max_depth {
            trace!("depth: {}, f: {}, pdf: {}, w: {}", depth, f, pdf, w);

            let rr_beta = f.max_component_value() / pdf;
            if depth > self.tuning.rr_depth && rr_beta < self.tuning.rr_threshold {
                let q = max(0.0, 1.0 - rr_beta);
                if r() < q {
                    return None;
                }
                pdf *= 1.0 - q;
            }
            if w.z == 0.0 {
                return None;
            }

            if self.albedo.is_nonzero() {
                // Potential scattering event inside the medium.
                let sigma_t = 1.0;
                let dz = sample_exponential(r(), sigma_t / abs_cos_theta(&w));
                let zp = if w.z > 0.0 { z + dz } else { z - dz };
                if zp == z {
                    return None;
                }
                if 0.0 < zp && zp < thickness {
                    let u = Point2f::new(r(), r());
                    let ps = phase
                        .sample_p(&-w, &u)
                        .filter(|ps| ps.pdf > 0.0 && ps.wi.z != 0.0)?;
                    f *= self.albedo * ps.p;
                    pdf *= ps.pdf;
                    specular_path = false;
                    w = ps.wi;
                    z = zp;
                    continue;
                }
                z = clamp(zp, 0.0, thickness);
            } else {
                z = if z == thickness { 0.0 } else { thickness };
                f *= tr(thickness, &w);
            }

            let interface = if z == 0.0 {
                self.bottom_interface()
            } else {
                self.top_interface()
            };

            let uc = r();
            let u = Point2f::new(r(), r());
            let bs = interface
                .sample_f(&-w, uc, &u, mode, BxDFReflTransFlags::ALL)
                .filter(is_usable)?;
            f *= bs.f;
            pdf *= bs.pdf;
            specular_path &= bs.is_specular();
            w = bs.wi;

            if bs.is_transmission() {
                // The path left the slab.
                let exits_reflected = same_hemisphere(&wo, &w);
                if exits_reflected && !sample_flags.allows_reflection()
                    || !exits_reflected && !sample_flags.allows_transmission()
                {
                    return None;
                }

                let lobe = if exits_reflected {
                    BxDFFlags::REFLECTION
                } else {
                    BxDFFlags::TRANSMISSION
                };
                let flags = lobe
                    | if specular_path {
                        BxDFFlags::SPECULAR
                    } else {
                        BxDFFlags::GLOSSY
                    };
                let wi = if flip_wi { -w } else { w };
                return Some(BSDFSample::new(f, wi, pdf, flags).with_proportional_pdf(true));
            }

            f *= abs_cos_theta(&bs.wi);
        }
        None
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        let (mut wo, mut wi) = (*wo, *wi);
        if TWO_SIDED && wo.z < 0.0 {
            wo = -wo;
            wi = -wi;
        }

        let is_reflection = same_hemisphere(&wo, &wi);
        if is_reflection && !sample_flags.allows_reflection()
            || !is_reflection && !sample_flags.allows_transmission()
        {
            return 0.0;
        }

        let seed = options().seed;
        let mut rng = RNG::new(hash!(seed, wi), hash!(wo));
        let mut r = || min(rng.uniform_float(), ONE_MINUS_EPSILON);

        let all = BxDFReflTransFlags::ALL;
        let transmission = BxDFReflTransFlags::TRANSMISSION;
        let entered_top = Self::enters_top(&wo);
        let n = self.n_samples as Float;

        // Reflection at the entrance interface.
        let mut pdf_sum = 0.0;
        if is_reflection {
            let enter = if entered_top {
                self.top_interface()
            } else {
                self.bottom_interface()
            };
            pdf_sum += n * enter.pdf(&wo, &wi, mode, BxDFReflTransFlags::REFLECTION);
        }

        let has_value = |bs: &BSDFSample| bs.f.is_nonzero() && bs.pdf > 0.0;

        for _ in 0..self.n_samples {
            if is_reflection {
                // Transmit, reflect, transmit.
                let (r_interface, t_interface) = if entered_top {
                    (self.bottom_interface(), self.top_interface())
                } else {
                    (self.top_interface(), self.bottom_interface())
                };

                let uc = r();
                let u = Point2f::new(r(), r());
                let wos = t_interface
                    .sample_f(&wo, uc, &u, mode, transmission)
                    .filter(has_value);
                let uc = r();
                let u = Point2f::new(r(), r());
                let wis = t_interface
                    .sample_f(&wi, uc, &u, !mode, transmission)
                    .filter(has_value);

                let (wos, wis) = match (wos, wis) {
                    (Some(wos), Some(wis)) => (wos, wis),
                    _ => continue,
                };

                if !t_interface.flags().is_non_specular() {
                    pdf_sum += r_interface.pdf(&-wos.wi, &-wis.wi, mode, all);
                } else {
                    let uc = r();
                    let u = Point2f::new(r(), r());
                    let rs = match r_interface
                        .sample_f(&-wos.wi, uc, &u, mode, all)
                        .filter(has_value)
                    {
                        Some(rs) => rs,
                        None => continue,
                    };

                    if !r_interface.flags().is_non_specular() {
                        pdf_sum += t_interface.pdf(&-rs.wi, &wi, mode, all);
                    } else {
                        // Combine both factorings of the path density.
                        let r_pdf = r_interface.pdf(&-wos.wi, &-wis.wi, mode, all);
                        pdf_sum += power_heuristic(1, wis.pdf, 1, r_pdf) * r_pdf;

                        let t_pdf = t_interface.pdf(&-rs.wi, &wi, mode, all);
                        pdf_sum += power_heuristic(1, rs.pdf, 1, t_pdf) * t_pdf;
                    }
                }
            } else {
                // Transmit, transmit.
                let (to_interface, ti_interface) = if entered_top {
                    (self.top_interface(), self.bottom_interface())
                } else {
                    (self.bottom_interface(), self.top_interface())
                };

                let uc = r();
                let u = Point2f::new(r(), r());
                let wos = match to_interface
                    .sample_f(&wo, uc, &u, mode, all)
                    .filter(|bs| is_usable(bs) && !bs.is_reflection())
                {
                    Some(bs) => bs,
                    None => continue,
                };

                let uc = r();
                let u = Point2f::new(r(), r());
                let wis = match ti_interface
                    .sample_f(&wi, uc, &u, !mode, all)
                    .filter(|bs| is_usable(bs) && !bs.is_reflection())
                {
                    Some(bs) => bs,
                    None => continue,
                };

                pdf_sum += if to_interface.flags().is_specular() {
                    ti_interface.pdf(&-wos.wi, &wi, mode, all)
                } else if ti_interface.flags().is_specular() {
                    to_interface.pdf(&wo, &-wis.wi, mode, all)
                } else {
                    (to_interface.pdf(&wo, &-wis.wi, mode, all)
                        + ti_interface.pdf(&-wos.wi, &wi, mode, all))
                        / 2.0
                };
            }
        }

        lerp(self.tuning.pdf_mix, INV_FOUR_PI, pdf_sum / n)
    }

    fn flags(&self) -> BxDFFlags {
        let top_flags = self.top.flags();
        let bottom_flags = self.bottom.flags();

        let mut flags = BxDFFlags::REFLECTION;
        if top_flags.is_specular() {
            flags |= BxDFFlags::SPECULAR;
        }

        if top_flags.is_diffuse() || bottom_flags.is_diffuse() || self.albedo.is_nonzero() {
            flags |= BxDFFlags::DIFFUSE;
        } else if top_flags.is_glossy() || bottom_flags.is_glossy() {
            flags |= BxDFFlags::GLOSSY;
        }

        if top_flags.is_transmissive() && bottom_flags.is_transmissive() {
            flags |= BxDFFlags::TRANSMISSION;
        }
        flags
    }

    fn regularize(&mut self) {
        self.top.regularize();
        self.bottom.regularize();
    }
}

impl<T: fmt::Display, B: fmt::Display, const TWO_SIDED: bool> fmt::Display
    for LayeredBxDF<T, B, TWO_SIDED>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ LayeredBxDF top: {} bottom: {} thickness: {} albedo: {} g: {} \
             maxDepth: {} nSamples: {} twoSided: {} ]",
            self.top,
            self.bottom,
            self.thickness,
            self.albedo,
            self.g,
            self.max_depth,
            self.n_samples,
            TWO_SIDED
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::microfacet::*;
    use float_cmp::*;

    fn smooth() -> TrowbridgeReitzDistribution {
        TrowbridgeReitzDistribution::new(0.0, 0.0)
    }

    fn coated_medium(alpha: Float, thickness: Float, albedo: Float, g: Float) -> CoatedDiffuseBxDF {
        CoatedDiffuseBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(alpha, alpha)),
            DiffuseBxDF::new(Spectrum::ONE),
            thickness,
            Spectrum::new(albedo),
            g,
            100,
            1,
        )
    }

    /// Estimates directional albedo by integrating `f` over cosine weighted
    /// directions.
    fn integrate_f<B: BxDFI>(bxdf: &B, wo: &Vector3f, n: usize) -> Float {
        let (_, u2) = random_samples(41, n);
        let sum: Float = u2
            .iter()
            .map(|u| {
                let wi = cosine_sample_hemisphere(u);
                bxdf.f(wo, &wi, TransportMode::Radiance)[0] * PI
            })
            .sum();
        sum / n as Float
    }

    fn coated_diffuse(eta: Float, alpha: Float, r: Float, thickness: Float) -> CoatedDiffuseBxDF {
        CoatedDiffuseBxDF::new(
            DielectricBxDF::new(eta, TrowbridgeReitzDistribution::new(alpha, alpha)),
            DiffuseBxDF::new(Spectrum::new(r)),
            thickness,
            Spectrum::ZERO,
            0.0,
            10,
            1,
        )
    }

    #[test]
    fn non_positive_thickness_is_clamped() {
        let bxdf = coated_diffuse(1.5, 0.0, 0.5, 0.0);
        assert_eq!(bxdf.thickness(), Float::MIN_POSITIVE);
    }

    #[test]
    fn flags_combine_interfaces() {
        let bxdf = coated_diffuse(1.5, 0.0, 0.5, 0.01);
        assert_eq!(
            bxdf.flags(),
            BxDFFlags::REFLECTION | BxDFFlags::SPECULAR | BxDFFlags::DIFFUSE
        );

        let metal = CoatedConductorBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(0.2, 0.2)),
            ConductorBxDF::new(
                TrowbridgeReitzDistribution::new(0.3, 0.3),
                Spectrum::new(0.2),
                Spectrum::new(3.0),
            ),
            0.01,
            Spectrum::ZERO,
            0.0,
            10,
            1,
        );
        assert_eq!(metal.flags(), BxDFFlags::GLOSSY_REFLECTION);
    }

    #[test]
    fn white_furnace_coated_diffuse() {
        for (eta, alpha) in [(1.5, 0.0), (1.33, 0.3)] {
            let bxdf = coated_diffuse(eta, alpha, 1.0, 0.01);
            for wo in incidence_directions() {
                let r = white_furnace(&bxdf, &wo, 4096);
                assert!(r[0] <= 1.02, "albedo {} for {} at {}", r[0], bxdf, wo);
                assert!(r[0] > 0.5, "albedo {} for {} at {}", r[0], bxdf, wo);
            }
        }
    }

    #[test]
    fn index_matched_thin_slab_is_its_base() {
        let r = 0.5;
        let layered = coated_diffuse(1.0, 0.0, r, 1e-5);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        for wi in [
            Vector3f::new(0.0, 0.6, 0.8),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(-0.8, 0.0, 0.6),
        ] {
            let f = layered.f(&wo, &wi, TransportMode::Radiance);
            assert!(
                approx_eq!(Float, f[0], r * INV_PI, epsilon = 0.001),
                "f {} for wi {}",
                f,
                wi
            );
        }
    }

    #[test]
    fn russian_roulette_is_unbiased() {
        let base = CoatedDiffuseBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(0.3, 0.3)),
            DiffuseBxDF::new(Spectrum::new(0.8)),
            0.1,
            Spectrum::ZERO,
            0.0,
            32,
            4096,
        );
        let never = base.clone().with_tuning(LayeredTuning {
            rr_depth: 0,
            rr_threshold: 0.0,
            pdf_mix: 0.9,
        });
        let always = base.with_tuning(LayeredTuning {
            rr_depth: 0,
            rr_threshold: 1.0,
            pdf_mix: 0.9,
        });

        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let wi = Vector3f::new(0.0, 0.28, 0.96);
        let a = never.f(&wo, &wi, TransportMode::Radiance)[0];
        let b = always.f(&wo, &wi, TransportMode::Radiance)[0];
        assert!(a > 0.0);
        assert!(abs(a - b) <= 0.05 * a, "{} vs {}", a, b);
    }

    #[test]
    fn smooth_coated_conductor_is_reproducible_and_matches_trt() {
        let eta = Spectrum::new(0.2);
        let k = Spectrum::new(3.0);
        let thickness = 0.01;
        let bxdf = CoatedConductorBxDF::new(
            DielectricBxDF::new(1.5, smooth()),
            ConductorBxDF::new(smooth(), eta, k),
            thickness,
            Spectrum::ZERO,
            0.0,
            10,
            1,
        );

        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let mode = TransportMode::Radiance;
        let all = BxDFReflTransFlags::ALL;

        // Transmit, reflect off the conductor, transmit back out.
        let fc = fr_complex_spectrum(1.0, &eta, &k)[0];
        let t = 1.0 - fr_dielectric(1.0, 1.5);
        let tr2 = (-2.0 * thickness).exp();
        let weight = tr2 * fc;

        let mut found_trt = false;
        for i in 0..16 {
            let u = Point2f::new(i as Float / 16.0, 0.5);
            let a = bxdf.sample_f(&wo, 0.5, &u, mode, all);
            let b = bxdf.sample_f(&wo, 0.5, &u, mode, all);
            assert_eq!(a, b);

            if let Some(bs) = a {
                assert!(bs.pdf_is_proportional);
                assert_eq!(bs.flags, BxDFFlags::SPECULAR_REFLECTION);
                assert!(approx_eq!(Float, bs.wi.z, 1.0, epsilon = 0.0001));

                let throughput = bs.f[0] * abs_cos_theta(&bs.wi) / bs.pdf;
                if approx_eq!(Float, throughput, weight, epsilon = 0.0001) {
                    found_trt = true;
                    assert!(approx_eq!(Float, bs.pdf, t * t, epsilon = 0.0001));
                }
            }
        }
        assert!(found_trt);

        let wi = Vector3f::new(0.0, 0.0, 1.0);
        assert_eq!(bxdf.f(&wo, &wi, mode), bxdf.f(&wo, &wi, mode));
        assert_eq!(bxdf.pdf(&wo, &wi, mode, all), bxdf.pdf(&wo, &wi, mode, all));
    }

    #[test]
    fn evaluated_albedo_matches_sampled_albedo() {
        let rough = CoatedDiffuseBxDF::new(
            DielectricBxDF::new(1.5, TrowbridgeReitzDistribution::new(0.3, 0.3)),
            DiffuseBxDF::new(Spectrum::ONE),
            0.01,
            Spectrum::ZERO,
            0.0,
            50,
            1,
        );
        for cos_theta in [1.0, 0.5] {
            let wo = Vector3f::new(safe_sqrt(1.0 - sqr(cos_theta)), 0.0, cos_theta);
            let sampled = white_furnace(&rough, &wo, 32768)[0];
            let evaluated = integrate_f(&rough, &wo, 32768);
            assert!(
                abs(sampled - evaluated) <= 0.025,
                "sampled {} vs evaluated {} at {}",
                sampled,
                evaluated,
                wo
            );
        }
    }

    #[test]
    fn evaluated_albedo_matches_sampled_albedo_with_medium() {
        let bxdf = coated_medium(0.3, 0.5, 1.0, 0.3);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let sampled = white_furnace(&bxdf, &wo, 32768)[0];
        let evaluated = integrate_f(&bxdf, &wo, 32768);
        assert!(sampled > 0.0);
        assert!(
            abs(sampled - evaluated) <= 0.04,
            "sampled {} vs evaluated {}",
            sampled,
            evaluated
        );
    }

    #[test]
    fn white_furnace_with_scattering_medium() {
        for (thickness, g) in [(0.5, 0.0), (2.0, 0.3), (0.1, -0.3)] {
            let bxdf = coated_medium(0.0, thickness, 1.0, g);
            for wo in incidence_directions() {
                let r = white_furnace(&bxdf, &wo, 4096);
                assert!(r[0] <= 1.02, "albedo {} for {} at {}", r[0], bxdf, wo);
                assert!(r[0] > 0.2, "albedo {} for {} at {}", r[0], bxdf, wo);
            }
        }
    }

    #[test]
    fn single_bounce_rough_conductor_matches_trt() {
        let eta = 1.5;
        let thickness = 0.01;
        let conductor = ConductorBxDF::new(
            TrowbridgeReitzDistribution::new(0.3, 0.3),
            Spectrum::new(0.2),
            Spectrum::new(3.0),
        );
        let bxdf = CoatedConductorBxDF::new(
            DielectricBxDF::new(eta, smooth()),
            conductor,
            thickness,
            Spectrum::ZERO,
            0.0,
            1,
            1,
        );

        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let mode = TransportMode::Radiance;
        let up = Vector3f::new(0.0, 0.0, 1.0);
        let (w, _) = refract(&wo, &up, eta).unwrap();
        let (w_light, _) = refract(&wi, &up, eta).unwrap();

        // Refract in, one conductor reflection, refract out.
        let t_in = 1.0 - fr_dielectric(wo.z, eta);
        let t_out = 1.0 - fr_dielectric(wi.z, eta);
        let fc = conductor.f(&-w, &-w_light, mode)[0];
        let expected =
            t_in / sqr(eta) * tr(thickness, &w) * fc * tr(thickness, &w_light) * t_out;

        let f = bxdf.f(&wo, &wi, mode)[0];
        assert!(expected > 0.0);
        assert!(
            approx_eq!(Float, f, expected, epsilon = 1e-4 * expected),
            "f {} vs {}",
            f,
            expected
        );
    }

    #[test]
    fn request_flags_mask_hemispheres() {
        let bxdf = coated_diffuse(1.5, 0.2, 0.7, 0.05);
        for wo in incidence_directions() {
            assert_sample_matches_pdf(
                &bxdf,
                &wo,
                TransportMode::Radiance,
                BxDFReflTransFlags::REFLECTION,
                64,
            );

            let (uc, u2) = random_samples(5, 64);
            for (uc, u) in uc.iter().zip(u2.iter()) {
                let bs = bxdf.sample_f(
                    &wo,
                    *uc,
                    u,
                    TransportMode::Radiance,
                    BxDFReflTransFlags::TRANSMISSION,
                );
                assert!(bs.is_none());
            }

            let wi = Vector3f::new(0.0, 0.6, 0.8);
            let mode = TransportMode::Radiance;
            assert_eq!(
                bxdf.pdf(&wo, &wi, mode, BxDFReflTransFlags::TRANSMISSION),
                0.0
            );
            assert!(bxdf.pdf(&wo, &wi, mode, BxDFReflTransFlags::ALL) > 0.0);
        }
    }

    #[test]
    fn two_sided_mirrors_lower_hemisphere() {
        let bxdf = coated_diffuse(1.5, 0.3, 0.5, 0.05);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let wi = Vector3f::new(0.0, 0.6, 0.8);
        let mode = TransportMode::Radiance;
        assert_eq!(bxdf.f(&wo, &wi, mode), bxdf.f(&-wo, &-wi, mode));
    }
}
