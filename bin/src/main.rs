#[macro_use]
extern crate log;

use bsdf_core::geometry::*;
use bsdf_core::microfacet::*;
use bsdf_core::options::*;
use bsdf_core::pbrt::*;
use bsdf_core::reflection::*;
use bsdf_core::rng::RNG;
use bsdf_core::sampling::*;
use bsdf_core::spectrum::*;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

/// Scattering models the probe can build.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq)]
enum Lobe {
    Diffuse,
    Conductor,
    Dielectric,
    ThinDielectric,
    CoatedDiffuse,
    CoatedConductor,
    Disney,
    Hair,
}

/// Builds a BxDF and reports its albedo, reciprocity error and sampling
/// consistency at several incidence angles.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Scattering model to probe.
    #[clap(value_enum, help = "Scattering model to probe.")]
    lobe: Lobe,

    /// Diffuse reflectance, base color or hair color.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.5)]
    reflectance: Float,

    /// Index of refraction of dielectric interfaces.
    #[clap(long, value_name = "FLOAT", default_value_t = 1.5)]
    eta: Float,

    /// Real part of the conductor's index of refraction.
    #[clap(long = "conductor-eta", value_name = "FLOAT", default_value_t = 0.2)]
    conductor_eta: Float,

    /// Absorption coefficient of the conductor.
    #[clap(long, value_name = "FLOAT", default_value_t = 3.9)]
    k: Float,

    /// Microfacet roughness in [0, 1]; 0 is a perfectly smooth interface.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0)]
    roughness: Float,

    /// Thickness of the medium between layers.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.01)]
    thickness: Float,

    /// Single scattering albedo of the medium between layers.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0)]
    albedo: Float,

    /// Henyey-Greenstein asymmetry of the medium between layers.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0, allow_hyphen_values = true)]
    g: Float,

    /// Maximum random walk depth of layered models.
    #[clap(long = "max-depth", value_name = "NUM", default_value_t = 10)]
    max_depth: usize,

    /// Number of random walks averaged by layered models.
    #[clap(long = "walks", value_name = "NUM", default_value_t = 1)]
    n_walks: usize,

    /// Disney metallic blend.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0)]
    metallic: Float,

    /// Disney subsurface (diffuse transmission) weight.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0)]
    subsurface: Float,

    /// Disney clearcoat weight.
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0)]
    clearcoat: Float,

    /// Hair offset across the fiber width in [-1, 1].
    #[clap(long, value_name = "FLOAT", default_value_t = 0.0, allow_hyphen_values = true)]
    h: Float,

    /// Hair longitudinal roughness.
    #[clap(long = "beta-m", value_name = "FLOAT", default_value_t = 0.3)]
    beta_m: Float,

    /// Hair azimuthal roughness.
    #[clap(long = "beta-n", value_name = "FLOAT", default_value_t = 0.3)]
    beta_n: Float,

    /// Hair scale tilt in degrees.
    #[clap(long, value_name = "DEGREES", default_value_t = 2.0)]
    alpha: Float,

    /// Samples per incidence angle.
    #[clap(long, short = 'n', value_name = "NUM", default_value_t = 16384)]
    samples: usize,

    /// Cosines of the incidence angles to probe.
    #[clap(
        long = "cos-theta",
        value_name = "FLOAT",
        num_args = 1..,
        value_delimiter = ',',
        default_values_t = vec![1.0, 0.7, 0.3, 0.1]
    )]
    cos_theta: Vec<Float>,

    #[clap(flatten)]
    options: Options,
}

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let cli = Cli::parse();
    init_options(cli.options.clone());

    if let Err(e) = probe(&cli) {
        error!("{e}");
    }
}

fn probe(cli: &Cli) -> Result<(), String> {
    if cli.samples == 0 {
        return Err("At least one sample per incidence angle is required.".to_string());
    }
    if let Some(c) = cli.cos_theta.iter().find(|c| !(**c > 0.0 && **c <= 1.0)) {
        return Err(format!("Invalid incidence cosine {c}; expected (0, 1]."));
    }

    let bxdf = build(cli)?;
    let quiet = options().quiet;
    if !quiet {
        info!("Probing {}: {}", bxdf.name(), bxdf);
        info!("Flags: {:?}", bxdf.flags());
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(cli.cos_theta.len() as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} angles")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut reports = Vec::with_capacity(cli.cos_theta.len());
    for (i, cos_theta) in cli.cos_theta.iter().enumerate() {
        let sin_theta = safe_sqrt(1.0 - sqr(*cos_theta));
        let wo = Vector3f::new(sin_theta, 0.0, *cos_theta);
        reports.push(measure(&bxdf, &wo, cli.samples, i as u64));
        progress.inc(1);
    }
    progress.finish_and_clear();

    for (cos_theta, report) in cli.cos_theta.iter().zip(reports.iter()) {
        if !quiet {
            info!(
                "cos(theta) = {:.3}: albedo {}, reciprocity error {:.2e}, pdf mismatches {}/{}",
                cos_theta,
                report.albedo,
                report.reciprocity_error,
                report.mismatched,
                report.checked
            );
        }
        if report.albedo.max_component_value() > 1.01 {
            warn!("Albedo exceeds 1 at cos(theta) = {cos_theta}: {}", report.albedo);
        }
    }
    Ok(())
}

/// Builds the requested scattering model from the command line parameters.
///
/// * `cli` - Command line parameters.
fn build(cli: &Cli) -> Result<BxDF, String> {
    let r = Spectrum::new(cli.reflectance);
    let alpha = TrowbridgeReitzDistribution::roughness_to_alpha(cli.roughness);
    let distrib = TrowbridgeReitzDistribution::new(alpha, alpha);
    let conductor = || {
        ConductorBxDF::new(
            distrib,
            Spectrum::new(cli.conductor_eta),
            Spectrum::new(cli.k),
        )
    };
    let coat = || DielectricBxDF::new(cli.eta, distrib);
    if !(cli.g > -1.0 && cli.g < 1.0) {
        return Err(format!("Invalid asymmetry parameter {}; expected (-1, 1).", cli.g));
    }

    let bxdf = match cli.lobe {
        Lobe::Diffuse => BxDF::from(DiffuseBxDF::new(r)),
        Lobe::Conductor => BxDF::from(conductor()),
        Lobe::Dielectric => BxDF::from(coat()),
        Lobe::ThinDielectric => BxDF::from(ThinDielectricBxDF::new(cli.eta)),
        Lobe::CoatedDiffuse => BxDF::from(CoatedDiffuseBxDF::new(
            coat(),
            DiffuseBxDF::new(r),
            cli.thickness,
            Spectrum::new(cli.albedo),
            cli.g,
            cli.max_depth,
            cli.n_walks,
        )),
        Lobe::CoatedConductor => BxDF::from(CoatedConductorBxDF::new(
            coat(),
            conductor(),
            cli.thickness,
            Spectrum::new(cli.albedo),
            cli.g,
            cli.max_depth,
            cli.n_walks,
        )),
        Lobe::Disney => BxDF::from(DisneyBxDF::new(DisneyParams {
            color: r,
            metallic: cli.metallic,
            roughness: cli.roughness,
            subsurface: cli.subsurface,
            clearcoat: cli.clearcoat,
            eta: cli.eta,
            lum: cli.reflectance,
            ..DisneyParams::default()
        })),
        Lobe::Hair => BxDF::from(HairBxDF::new(
            cli.h,
            cli.eta,
            HairBxDF::sigma_a_from_reflectance(&r, cli.beta_n),
            cli.beta_m,
            cli.beta_n,
            cli.alpha,
        )),
    };
    Ok(bxdf)
}

/// Results for one incidence angle.
struct Report {
    /// Directional albedo estimate.
    albedo: Spectrum,

    /// Mean relative difference between f(wo, wi) and f(wi, wo).
    reciprocity_error: Float,

    /// Number of non-specular samples checked against `pdf()`.
    checked: usize,

    /// Number of samples whose density disagreed with `pdf()`.
    mismatched: usize,
}

/// Measures one incidence angle.
///
/// * `bxdf` - The scattering model.
/// * `wo`   - Outgoing direction.
/// * `n`    - Number of samples.
/// * `seq`  - Sequence index of the random numbers.
fn measure(bxdf: &BxDF, wo: &Vector3f, n: usize, seq: u64) -> Report {
    let seed = options().seed as u32 as u64;
    let mut rng = RNG::from_sequence((seed << 32) | seq);
    let uc: Vec<Float> = (0..n).map(|_| rng.uniform_float()).collect();
    let u2: Vec<Point2f> = (0..n)
        .map(|_| Point2f::new(rng.uniform_float(), rng.uniform_float()))
        .collect();
    let albedo = bxdf.rho_hd(wo, &uc, &u2);

    let mode = TransportMode::Radiance;
    let mut checked = 0;
    let mut mismatched = 0;
    let mut reciprocity_error = 0.0;
    let mut reciprocity_count = 0;
    for (uc, u) in uc.iter().zip(u2.iter()) {
        if let Some(bs) = bxdf.sample_f(wo, *uc, u, mode, BxDFReflTransFlags::ALL) {
            if !bs.is_specular() && !bs.pdf_is_proportional {
                checked += 1;
                let pdf = bxdf.pdf(wo, &bs.wi, mode, BxDFReflTransFlags::ALL);
                if abs(pdf - bs.pdf) > 0.01 * max(1.0, bs.pdf) {
                    debug!("pdf {} != sampled pdf {} for wi {}", pdf, bs.pdf, bs.wi);
                    mismatched += 1;
                }
            }
        }

        // Reciprocity only holds for reflection.
        let wi = uniform_sample_hemisphere(u);
        let f_io = bxdf.f(wo, &wi, mode);
        let f_oi = bxdf.f(&wi, wo, mode);
        let scale = max(f_io.max_component_value(), f_oi.max_component_value());
        if scale > 0.0 {
            reciprocity_error += (f_io - f_oi).map(|v| v.abs()).max_component_value() / scale;
            reciprocity_count += 1;
        }
    }
    if reciprocity_count > 0 {
        reciprocity_error /= reciprocity_count as Float;
    }

    Report {
        albedo,
        reciprocity_error,
        checked,
        mismatched,
    }
}
