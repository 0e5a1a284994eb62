//! Measured

use super::*;
use std::sync::Arc;

/// Raw tables of a measured isotropic or anisotropic BRDF in the RGL
/// parameterization. Tables are stored row-major with x varying fastest.
#[derive(Copy, Clone, Debug)]
pub struct MeasuredTables<'a> {
    /// Incident elevations in radians.
    pub theta_i: &'a [Float],

    /// Incident azimuths in radians. At most two values mean the material is
    /// isotropic.
    pub phi_i: &'a [Float],

    /// Wavelengths in nm of the spectral table.
    pub wavelengths: &'a [Float],

    /// Resolution (x, y) of `ndf`.
    pub ndf_size: [usize; 2],

    /// Microfacet normal distribution.
    pub ndf: &'a [Float],

    /// Resolution (x, y) of `sigma`.
    pub sigma_size: [usize; 2],

    /// Projected microfacet area.
    pub sigma: &'a [Float],

    /// Resolution (x, y) of `vndf`, `luminance` and `spectra`.
    pub size: [usize; 2],

    /// Visible normal distribution for each incident direction.
    pub vndf: &'a [Float],

    /// Luminance of the warped BRDF for each incident direction.
    pub luminance: &'a [Float],

    /// Warped spectral BRDF for each incident direction and wavelength.
    pub spectra: &'a [Float],
}

/// Tabulated distributions of a measured BRDF.
#[derive(Clone, Debug)]
pub struct MeasuredBxDFData {
    /// Tabulated wavelengths.
    wavelengths: Vec<Float>,

    /// Warped spectral BRDF over (φi, θi, λ).
    spectra: PiecewiseLinear2D<3>,

    /// Microfacet normal distribution.
    ndf: PiecewiseLinear2D<0>,

    /// Visible normal distribution over (φi, θi).
    vndf: PiecewiseLinear2D<2>,

    /// Projected microfacet area.
    sigma: PiecewiseLinear2D<0>,

    /// True if the BRDF only depends on the azimuth difference.
    isotropic: bool,

    /// Luminance of the warped BRDF over (φi, θi).
    luminance: PiecewiseLinear2D<2>,
}

impl MeasuredBxDFData {
    /// Build the distributions from raw tables.
    ///
    /// * `tables` - The raw tables.
    pub fn new(tables: &MeasuredTables) -> Result<Self, String> {
        let [x, y] = tables.size;
        let ndf = PiecewiseLinear2D::new(
            tables.ndf,
            tables.ndf_size[0],
            tables.ndf_size[1],
            [],
            false,
            false,
        )
        .map_err(|e| format!("Invalid NDF table: {e}"))?;
        let sigma = PiecewiseLinear2D::new(
            tables.sigma,
            tables.sigma_size[0],
            tables.sigma_size[1],
            [],
            false,
            false,
        )
        .map_err(|e| format!("Invalid sigma table: {e}"))?;
        let vndf = PiecewiseLinear2D::new(
            tables.vndf,
            x,
            y,
            [tables.phi_i, tables.theta_i],
            true,
            true,
        )
        .map_err(|e| format!("Invalid VNDF table: {e}"))?;
        let luminance = PiecewiseLinear2D::new(
            tables.luminance,
            x,
            y,
            [tables.phi_i, tables.theta_i],
            true,
            true,
        )
        .map_err(|e| format!("Invalid luminance table: {e}"))?;
        let spectra = PiecewiseLinear2D::new(
            tables.spectra,
            x,
            y,
            [tables.phi_i, tables.theta_i, tables.wavelengths],
            false,
            false,
        )
        .map_err(|e| format!("Invalid spectral table: {e}"))?;

        let isotropic = tables.phi_i.len() <= 2;
        debug!(
            "Measured BRDF with {}x{} tables, {} wavelengths, isotropic: {}",
            x,
            y,
            tables.wavelengths.len(),
            isotropic
        );

        Ok(Self {
            wavelengths: tables.wavelengths.to_vec(),
            spectra,
            ndf,
            vndf,
            sigma,
            isotropic,
            luminance,
        })
    }

    /// Returns true if the BRDF only depends on the azimuth difference.
    pub fn isotropic(&self) -> bool {
        self.isotropic
    }

    /// Returns the tabulated wavelengths.
    pub fn wavelengths(&self) -> &[Float] {
        &self.wavelengths
    }
}

/// BRDF interpolated from measured data at a set of wavelengths.
#[derive(Clone, Debug)]
pub struct MeasuredBxDF {
    /// Shared tables.
    data: Arc<MeasuredBxDFData>,

    /// Wavelengths to evaluate.
    lambda: SampledWavelengths,
}

impl MeasuredBxDF {
    /// Create a new instance of `MeasuredBxDF`.
    ///
    /// * `data`   - Shared tables.
    /// * `lambda` - Wavelengths to evaluate.
    pub fn new(data: Arc<MeasuredBxDFData>, lambda: SampledWavelengths) -> Self {
        Self { data, lambda }
    }

    /// Interpolates the spectral table at a warped sample.
    ///
    /// * `u`       - Warped sample.
    /// * `phi_o`   - Outgoing azimuth.
    /// * `theta_o` - Outgoing elevation.
    fn spectrum(&self, u: Point2f, phi_o: Float, theta_o: Float) -> Spectrum {
        let mut fr = Spectrum::ZERO;
        for i in 0..N_SPECTRUM_SAMPLES {
            let param = [phi_o, theta_o, self.lambda.lambda(i)];
            fr[i] = max(0.0, self.data.spectra.evaluate(u, &param));
        }
        fr
    }

    /// Maps the microfacet normal for `wo` and `wi` to the unit square.
    /// Returns `None` when the directions cancel.
    ///
    /// * `wo`    - Outgoing direction in the upper hemisphere.
    /// * `wi`    - Incident direction in the upper hemisphere.
    /// * `phi_o` - Outgoing azimuth.
    fn half_vector(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        phi_o: Float,
    ) -> Option<(Vector3f, Point2f)> {
        let wm = *wi + *wo;
        if wm.length_squared() == 0.0 {
            return None;
        }
        let wm = wm.normalize();

        // atan2 keeps small elevations accurate where acos(z) rounds to 0.
        let theta_m = (sqr(wm.x) + sqr(wm.y)).sqrt().atan2(wm.z);
        let phi_m = wm.y.atan2(wm.x);
        let mut u_wm = Point2f::new(
            theta_to_u(theta_m),
            phi_to_u(if self.data.isotropic {
                phi_m - phi_o
            } else {
                phi_m
            }),
        );
        u_wm.y -= u_wm.y.floor();
        Some((wm, u_wm))
    }
}

impl BxDFI for MeasuredBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) {
            return Spectrum::ZERO;
        }
        let (wo, wi) = if wo.z < 0.0 { (-(*wo), -(*wi)) } else { (*wo, *wi) };

        let theta_o = spherical_theta(&wo);
        let phi_o = wo.y.atan2(wo.x);
        let (_, u_wm) = match self.half_vector(&wo, &wi, phi_o) {
            Some(h) => h,
            None => return Spectrum::ZERO,
        };
        let u_wo = Point2f::new(theta_to_u(theta_o), phi_to_u(phi_o));

        // Invert the visible normal warp to find the spectral table sample.
        let ui = self.data.vndf.invert(u_wm, &[phi_o, theta_o]);
        let fr = self.spectrum(ui.p, phi_o, theta_o);

        fr * (self.data.ndf.evaluate(u_wm, &[])
            / (4.0 * self.data.sigma.evaluate(u_wo, &[]) * cos_theta(&wi)))
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.allows_reflection() {
            return None;
        }
        let flip_wi = wo.z <= 0.0;
        let wo = if flip_wi { -(*wo) } else { *wo };

        let theta_o = spherical_theta(&wo);
        let phi_o = wo.y.atan2(wo.x);

        // Warp by luminance, then by visible normals.
        let lum = self.data.luminance.sample(*u, &[phi_o, theta_o]);
        let vndf = self.data.vndf.sample(lum.p, &[phi_o, theta_o]);
        let u_wm = vndf.p;

        let theta_m = u_to_theta(u_wm.x);
        let mut phi_m = u_to_phi(u_wm.y);
        if self.data.isotropic {
            phi_m += phi_o;
        }
        let sin_theta_m = theta_m.sin();
        let wm = spherical_direction(sin_theta_m, theta_m.cos(), phi_m);
        let wi = reflect(&wo, &wm);
        if wi.z <= 0.0 {
            return None;
        }

        let u_wo = Point2f::new(theta_to_u(theta_o), phi_to_u(phi_o));
        let fr = self.spectrum(lum.p, phi_o, theta_o)
            * (self.data.ndf.evaluate(u_wm, &[])
                / (4.0 * self.data.sigma.evaluate(u_wo, &[]) * abs_cos_theta(&wi)));

        let jacobian = 4.0 * wo.abs_dot(&wm) * max(2.0 * sqr(PI) * u_wm.x * sin_theta_m, 1e-6);
        let pdf = lum.pdf * vndf.pdf / jacobian;
        if pdf <= 0.0 {
            return None;
        }

        let wi = if flip_wi { -wi } else { wi };
        Some(BSDFSample::new(fr, wi, pdf, BxDFFlags::GLOSSY_REFLECTION))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.allows_reflection() || !same_hemisphere(wo, wi) {
            return 0.0;
        }
        let (wo, wi) = if wo.z < 0.0 { (-(*wo), -(*wi)) } else { (*wo, *wi) };

        let theta_o = spherical_theta(&wo);
        let phi_o = wo.y.atan2(wo.x);
        let (wm, u_wm) = match self.half_vector(&wo, &wi, phi_o) {
            Some(h) => h,
            None => return 0.0,
        };

        let ui = self.data.vndf.invert(u_wm, &[phi_o, theta_o]);
        let lum_pdf = self.data.luminance.evaluate(ui.p, &[phi_o, theta_o]);

        let sin_theta_m = (sqr(wm.x) + sqr(wm.y)).sqrt();
        let jacobian = 4.0 * wi.dot(&wm) * max(2.0 * sqr(PI) * u_wm.x * sin_theta_m, 1e-6);
        ui.pdf * lum_pdf / jacobian
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::GLOSSY_REFLECTION
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for MeasuredBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ MeasuredBxDF isotropic: {} wavelengths: {} lambda: [{}, {}, {}, {}] ]",
            self.data.isotropic,
            self.data.wavelengths.len(),
            self.lambda.lambda(0),
            self.lambda.lambda(1),
            self.lambda.lambda(2),
            self.lambda.lambda(3)
        )
    }
}

/// Maps an elevation to the unit interval.
#[inline]
fn theta_to_u(theta: Float) -> Float {
    (theta * (2.0 / PI)).sqrt()
}

/// Maps an azimuth to the unit interval.
#[inline]
fn phi_to_u(phi: Float) -> Float {
    phi * INV_TWO_PI + 0.5
}

/// Inverse of `theta_to_u()`.
#[inline]
fn u_to_theta(u: Float) -> Float {
    sqr(u) * PI_OVER_TWO
}

/// Inverse of `phi_to_u()`.
#[inline]
fn u_to_phi(u: Float) -> Float {
    (2.0 * u - 1.0) * PI
}
