//! Reflection and surface scattering models

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;
use std::fmt;

mod bxdf_flags;
mod bxdf_sample;
mod common;
mod conductor;
mod dielectric;
mod diffuse;
mod diffuse_transmission;
mod disney;
mod fresnel;
mod hair;
mod layered;
mod measured;
mod normalized_fresnel;
mod thin_dielectric;

#[cfg(test)]
mod testing;

// Re-export
pub use bxdf_flags::*;
pub use bxdf_sample::*;
pub use common::*;
pub use conductor::*;
pub use dielectric::*;
pub use diffuse::*;
pub use diffuse_transmission::*;
pub use disney::*;
pub use fresnel::*;
pub use hair::*;
pub use layered::*;
pub use measured::*;
pub use normalized_fresnel::*;
pub use thin_dielectric::*;

/// Common interface of all scattering models. Directions are unit vectors in
/// the local shading frame where the surface normal is the +z axis.
pub trait BxDFI {
    /// Returns the value of the distribution function for the given pair of
    /// directions.
    ///
    /// * `wo`   - Outgoing direction.
    /// * `wi`   - Incident direction.
    /// * `mode` - Transport mode.
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum;

    /// Samples an incident direction for the given outgoing direction. Returns
    /// `None` when no valid scattering event exists.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `uc`           - Uniform sample used to choose between lobes.
    /// * `u`            - The 2D uniform random values.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Restricts sampling to reflection and/or transmission.
    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample>;

    /// Evaluates the density `sample_f()` would have produced `wi` with.
    ///
    /// * `wo`           - Outgoing direction.
    /// * `wi`           - Incident direction.
    /// * `mode`         - Transport mode.
    /// * `sample_flags` - Restricts sampling to reflection and/or transmission.
    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float;

    /// Returns the lobes present.
    fn flags(&self) -> BxDFFlags;

    /// Increase roughness of near-specular lobes.
    fn regularize(&mut self);

    /// Computes the hemispherical-directional reflectance ρ_hd with Monte Carlo
    /// estimation.
    ///
    /// * `wo` - Outgoing direction.
    /// * `uc` - Samples used to choose lobes.
    /// * `u2` - Samples used to choose directions.
    fn rho_hd(&self, wo: &Vector3f, uc: &[Float], u2: &[Point2f]) -> Spectrum {
        debug_assert_eq!(uc.len(), u2.len());
        if wo.z == 0.0 || uc.is_empty() {
            return Spectrum::ZERO;
        }

        let mut r = Spectrum::ZERO;
        for (uc, u) in uc.iter().zip(u2.iter()) {
            if let Some(bs) =
                self.sample_f(wo, *uc, u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            {
                if bs.pdf > 0.0 {
                    r += bs.f * abs_cos_theta(&bs.wi) / bs.pdf;
                }
            }
        }
        r / uc.len() as Float
    }

    /// Computes the hemispherical-hemispherical reflectance ρ_hh with Monte
    /// Carlo estimation.
    ///
    /// * `u1` - Samples used to choose outgoing directions.
    /// * `uc` - Samples used to choose lobes.
    /// * `u2` - Samples used to choose incident directions.
    fn rho_hh(&self, u1: &[Point2f], uc: &[Float], u2: &[Point2f]) -> Spectrum {
        debug_assert_eq!(u1.len(), uc.len());
        debug_assert_eq!(uc.len(), u2.len());
        if uc.is_empty() {
            return Spectrum::ZERO;
        }

        let mut r = Spectrum::ZERO;
        for i in 0..uc.len() {
            let wo = uniform_sample_hemisphere(&u1[i]);
            if wo.z == 0.0 {
                continue;
            }
            let pdfo = uniform_hemisphere_pdf();
            if let Some(bs) = self.sample_f(
                &wo,
                uc[i],
                &u2[i],
                TransportMode::Radiance,
                BxDFReflTransFlags::ALL,
            ) {
                if bs.pdf > 0.0 {
                    r += bs.f * abs_cos_theta(&bs.wi) * abs_cos_theta(&wo) / (pdfo * bs.pdf);
                }
            }
        }
        r / (PI * uc.len() as Float)
    }
}

/// BxDF for BRDFs and BTDFs.
///
/// NOTES:
///
/// Every model is enumerated directly so dispatch is a `match` and the value
/// can live on the stack for the duration of a shading query.
#[derive(Clone, Debug)]
pub enum BxDF {
    Diffuse(DiffuseBxDF),
    DiffuseTransmission(DiffuseTransmissionBxDF),
    Conductor(ConductorBxDF),
    Dielectric(DielectricBxDF),
    ThinDielectric(ThinDielectricBxDF),
    NormalizedFresnel(NormalizedFresnelBxDF),
    Disney(DisneyBxDF),
    CoatedDiffuse(CoatedDiffuseBxDF),
    CoatedConductor(CoatedConductorBxDF),
    Hair(HairBxDF),
    Measured(MeasuredBxDF),
}

impl BxDF {
    /// Returns the name of the scattering model.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Diffuse(_) => "DiffuseBxDF",
            Self::DiffuseTransmission(_) => "DiffuseTransmissionBxDF",
            Self::Conductor(_) => "ConductorBxDF",
            Self::Dielectric(_) => "DielectricBxDF",
            Self::ThinDielectric(_) => "ThinDielectricBxDF",
            Self::NormalizedFresnel(_) => "NormalizedFresnelBxDF",
            Self::Disney(_) => "DisneyBxDF",
            Self::CoatedDiffuse(_) => "CoatedDiffuseBxDF",
            Self::CoatedConductor(_) => "CoatedConductorBxDF",
            Self::Hair(_) => "HairBxDF",
            Self::Measured(_) => "MeasuredBxDF",
        }
    }
}

impl BxDFI for BxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        match self {
            Self::Diffuse(bxdf) => bxdf.f(wo, wi, mode),
            Self::DiffuseTransmission(bxdf) => bxdf.f(wo, wi, mode),
            Self::Conductor(bxdf) => bxdf.f(wo, wi, mode),
            Self::Dielectric(bxdf) => bxdf.f(wo, wi, mode),
            Self::ThinDielectric(bxdf) => bxdf.f(wo, wi, mode),
            Self::NormalizedFresnel(bxdf) => bxdf.f(wo, wi, mode),
            Self::Disney(bxdf) => bxdf.f(wo, wi, mode),
            Self::CoatedDiffuse(bxdf) => bxdf.f(wo, wi, mode),
            Self::CoatedConductor(bxdf) => bxdf.f(wo, wi, mode),
            Self::Hair(bxdf) => bxdf.f(wo, wi, mode),
            Self::Measured(bxdf) => bxdf.f(wo, wi, mode),
        }
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        match self {
            Self::Diffuse(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::DiffuseTransmission(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Conductor(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Dielectric(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::ThinDielectric(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::NormalizedFresnel(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Disney(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::CoatedDiffuse(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::CoatedConductor(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Hair(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
            Self::Measured(bxdf) => bxdf.sample_f(wo, uc, u, mode, sample_flags),
        }
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        match self {
            Self::Diffuse(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::DiffuseTransmission(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Conductor(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Dielectric(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::ThinDielectric(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::NormalizedFresnel(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Disney(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::CoatedDiffuse(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::CoatedConductor(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Hair(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
            Self::Measured(bxdf) => bxdf.pdf(wo, wi, mode, sample_flags),
        }
    }

    fn flags(&self) -> BxDFFlags {
        match self {
            Self::Diffuse(bxdf) => bxdf.flags(),
            Self::DiffuseTransmission(bxdf) => bxdf.flags(),
            Self::Conductor(bxdf) => bxdf.flags(),
            Self::Dielectric(bxdf) => bxdf.flags(),
            Self::ThinDielectric(bxdf) => bxdf.flags(),
            Self::NormalizedFresnel(bxdf) => bxdf.flags(),
            Self::Disney(bxdf) => bxdf.flags(),
            Self::CoatedDiffuse(bxdf) => bxdf.flags(),
            Self::CoatedConductor(bxdf) => bxdf.flags(),
            Self::Hair(bxdf) => bxdf.flags(),
            Self::Measured(bxdf) => bxdf.flags(),
        }
    }

    fn regularize(&mut self) {
        match self {
            Self::Diffuse(bxdf) => bxdf.regularize(),
            Self::DiffuseTransmission(bxdf) => bxdf.regularize(),
            Self::Conductor(bxdf) => bxdf.regularize(),
            Self::Dielectric(bxdf) => bxdf.regularize(),
            Self::ThinDielectric(bxdf) => bxdf.regularize(),
            Self::NormalizedFresnel(bxdf) => bxdf.regularize(),
            Self::Disney(bxdf) => bxdf.regularize(),
            Self::CoatedDiffuse(bxdf) => bxdf.regularize(),
            Self::CoatedConductor(bxdf) => bxdf.regularize(),
            Self::Hair(bxdf) => bxdf.regularize(),
            Self::Measured(bxdf) => bxdf.regularize(),
        }
    }
}

impl fmt::Display for BxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diffuse(bxdf) => write!(f, "{bxdf}"),
            Self::DiffuseTransmission(bxdf) => write!(f, "{bxdf}"),
            Self::Conductor(bxdf) => write!(f, "{bxdf}"),
            Self::Dielectric(bxdf) => write!(f, "{bxdf}"),
            Self::ThinDielectric(bxdf) => write!(f, "{bxdf}"),
            Self::NormalizedFresnel(bxdf) => write!(f, "{bxdf}"),
            Self::Disney(bxdf) => write!(f, "{bxdf}"),
            Self::CoatedDiffuse(bxdf) => write!(f, "[ CoatedDiffuseBxDF {bxdf} ]"),
            Self::CoatedConductor(bxdf) => write!(f, "[ CoatedConductorBxDF {bxdf} ]"),
            Self::Hair(bxdf) => write!(f, "{bxdf}"),
            Self::Measured(bxdf) => write!(f, "{bxdf}"),
        }
    }
}

macro_rules! bxdf_from {
    ($t: ty, $variant: ident) => {
        impl From<$t> for BxDF {
            fn from(bxdf: $t) -> Self {
                Self::$variant(bxdf)
            }
        }
    };
}

bxdf_from!(DiffuseBxDF, Diffuse);
bxdf_from!(DiffuseTransmissionBxDF, DiffuseTransmission);
bxdf_from!(ConductorBxDF, Conductor);
bxdf_from!(DielectricBxDF, Dielectric);
bxdf_from!(ThinDielectricBxDF, ThinDielectric);
bxdf_from!(NormalizedFresnelBxDF, NormalizedFresnel);
bxdf_from!(DisneyBxDF, Disney);
bxdf_from!(CoatedDiffuseBxDF, CoatedDiffuse);
bxdf_from!(CoatedConductorBxDF, CoatedConductor);
bxdf_from!(HairBxDF, Hair);
bxdf_from!(MeasuredBxDF, Measured);
