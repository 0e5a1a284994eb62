//! Process-wide options.

use arc_swap::ArcSwap;
use clap::Args;
use std::sync::Arc;

lazy_static! {
    /// The global options. Readers never block; `init_options()` swaps in a
    /// new value atomically.
    static ref OPTIONS: ArcSwap<Options> = ArcSwap::from_pointee(Options::default());
}

/// Options shared by every scattering evaluation.
#[derive(Args, Clone, Debug, Default, PartialEq)]
pub struct Options {
    /// Seed mixed into the per-call random streams of stochastic BxDFs.
    #[clap(
        long = "seed",
        value_name = "NUM",
        default_value_t = 0,
        help = "Seed for the random walks of stochastic BxDFs."
    )]
    pub seed: i32,

    /// Suppress all text output other than error messages.
    #[clap(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

/// Returns the current global options.
pub fn options() -> Arc<Options> {
    OPTIONS.load_full()
}

/// Replace the global options.
///
/// * `opts` - The new options.
pub fn init_options(opts: Options) {
    debug!("Options: seed = {}, quiet = {}", opts.seed, opts.quiet);
    OPTIONS.store(Arc::new(opts));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_seed_is_zero() {
        assert_eq!(Options::default().seed, 0);
        assert!(!Options::default().quiet);
    }
}
