//! Piecewise-linear 2D distribution.

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Result of sampling or inverting a `PiecewiseLinear2D`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PLSample {
    /// Position in [0, 1]^2.
    pub p: Point2f,

    /// Density at `p`.
    pub pdf: Float,
}

/// A bilinearly interpolated 2D function on a regular grid over [0, 1]^2,
/// optionally conditioned on `N` additional parameters that are linearly
/// interpolated between tabulated slices. When built with CDFs it can be
/// sampled and inverted as a probability density.
#[derive(Clone, Debug)]
pub struct PiecewiseLinear2D<const N: usize> {
    /// Grid resolution along x and y.
    size: [usize; 2],

    /// Size of a grid cell.
    patch_size: [Float; 2],

    /// Reciprocal of `patch_size`.
    inv_patch_size: [Float; 2],

    /// Resolution of each parameter.
    param_size: [usize; N],

    /// Stride between slices of each parameter (0 for a single value).
    param_strides: [usize; N],

    /// Tabulated parameter positions.
    param_values: Vec<Vec<Float>>,

    /// Function values for every slice.
    data: Vec<Float>,

    /// Marginal CDF in y for every slice.
    marginal_cdf: Vec<Float>,

    /// Conditional CDF in x for every row of every slice.
    conditional_cdf: Vec<Float>,

    /// Scale turning stored values into densities over [0, 1]^2.
    density_scale: Float,
}

impl<const N: usize> PiecewiseLinear2D<N> {
    /// Create a new `PiecewiseLinear2D`.
    ///
    /// * `data`         - Function values; `x_size * y_size` values per slice
    ///                    with the last parameter varying fastest.
    /// * `x_size`       - Grid resolution along x (at least 2).
    /// * `y_size`       - Grid resolution along y (at least 2).
    /// * `param_values` - Tabulated positions of each parameter.
    /// * `normalize`    - Scale each slice to integrate to 1.
    /// * `build_cdf`    - Build the CDFs needed by `sample()` and `invert()`.
    pub fn new(
        data: &[Float],
        x_size: usize,
        y_size: usize,
        param_values: [&[Float]; N],
        normalize: bool,
        build_cdf: bool,
    ) -> Result<Self, String> {
        if x_size < 2 || y_size < 2 {
            return Err(format!(
                "PiecewiseLinear2D needs at least 2x2 values, got {x_size}x{y_size}"
            ));
        }
        if build_cdf && !normalize {
            return Err("PiecewiseLinear2D CDFs require a normalized table".to_string());
        }

        let mut param_size = [0; N];
        let mut param_strides = [0; N];
        let mut slices = 1;
        for i in (0..N).rev() {
            if param_values[i].is_empty() {
                return Err(format!("PiecewiseLinear2D parameter {i} has no values"));
            }
            param_size[i] = param_values[i].len();
            param_strides[i] = if param_size[i] > 1 { slices } else { 0 };
            slices *= param_size[i];
        }

        let n_values = x_size * y_size;
        if data.len() != slices * n_values {
            return Err(format!(
                "PiecewiseLinear2D expected {} values, got {}",
                slices * n_values,
                data.len()
            ));
        }

        let mut out = Vec::with_capacity(data.len());
        let mut marginal_cdf = Vec::new();
        let mut conditional_cdf = Vec::new();
        if build_cdf {
            marginal_cdf.resize(slices * y_size, 0.0);
            conditional_cdf.resize(slices * n_values, 0.0);
        }

        for slice in 0..slices {
            let values = &data[slice * n_values..(slice + 1) * n_values];

            let mut normalization = 1.0;
            if normalize {
                let mut sum = 0.0_f64;
                for y in 0..y_size - 1 {
                    for x in 0..x_size - 1 {
                        let i = y * x_size + x;
                        let v00 = values[i] as f64;
                        let v10 = values[i + 1] as f64;
                        let v01 = values[i + x_size] as f64;
                        let v11 = values[i + 1 + x_size] as f64;
                        sum += 0.25 * (v00 + v10 + v01 + v11);
                    }
                }
                if sum <= 0.0 {
                    return Err(format!("PiecewiseLinear2D slice {slice} has no mass"));
                }
                normalization = 1.0 / sum;
            }

            let start = out.len();
            out.extend(values.iter().map(|v| (*v as f64 * normalization) as Float));
            let slice_out = &out[start..];

            if build_cdf {
                // Conditional CDFs along x for each row.
                let cond = &mut conditional_cdf[slice * n_values..(slice + 1) * n_values];
                for y in 0..y_size {
                    let mut sum = 0.0_f64;
                    let mut i = y * x_size;
                    cond[i] = 0.0;
                    for _ in 0..x_size - 1 {
                        sum += 0.5 * (slice_out[i] as f64 + slice_out[i + 1] as f64);
                        cond[i + 1] = sum as Float;
                        i += 1;
                    }
                }

                // Marginal CDF along y.
                let marginal = &mut marginal_cdf[slice * y_size..(slice + 1) * y_size];
                marginal[0] = 0.0;
                let mut sum = 0.0_f64;
                for y in 0..y_size - 1 {
                    sum += 0.5
                        * (cond[(y + 1) * x_size - 1] as f64 + cond[(y + 2) * x_size - 1] as f64);
                    marginal[y + 1] = sum as Float;
                }
            }
        }

        let patch_size = [1.0 / (x_size - 1) as Float, 1.0 / (y_size - 1) as Float];
        let inv_patch_size = [(x_size - 1) as Float, (y_size - 1) as Float];
        let density_scale = if normalize {
            inv_patch_size[0] * inv_patch_size[1]
        } else {
            1.0
        };

        Ok(Self {
            size: [x_size, y_size],
            patch_size,
            inv_patch_size,
            param_size,
            param_strides,
            param_values: param_values.iter().map(|v| v.to_vec()).collect(),
            data: out,
            marginal_cdf,
            conditional_cdf,
            density_scale,
        })
    }

    /// Returns true if `sample()` and `invert()` are available.
    pub fn has_cdf(&self) -> bool {
        !self.marginal_cdf.is_empty()
    }

    /// Interpolation weights for each parameter and the offset of the first
    /// slice involved.
    ///
    /// * `param` - Parameter values.
    fn param_weights(&self, param: &[Float; N]) -> ([[Float; 2]; N], usize) {
        let mut weights = [[1.0, 0.0]; N];
        let mut slice_offset = 0;
        for dim in 0..N {
            if self.param_size[dim] == 1 {
                continue;
            }

            let values = &self.param_values[dim];
            let index = find_interval(self.param_size[dim], |i| values[i] <= param[dim]);
            let p0 = values[index];
            let p1 = values[index + 1];
            let w1 = clamp((param[dim] - p0) / (p1 - p0), 0.0, 1.0);
            weights[dim] = [1.0 - w1, w1];
            slice_offset += self.param_strides[dim] * index;
        }
        (weights, slice_offset)
    }

    /// Multilinear lookup across parameter slices.
    ///
    /// * `data`    - The array to read.
    /// * `i0`      - Index into the first slice.
    /// * `size`    - Size of one slice of `data`.
    /// * `weights` - Parameter weights.
    /// * `dim`     - Number of parameters left to interpolate.
    fn lookup(
        &self,
        data: &[Float],
        i0: usize,
        size: usize,
        weights: &[[Float; 2]; N],
        dim: usize,
    ) -> Float {
        if dim == 0 {
            return data[i0];
        }

        let [w0, w1] = weights[dim - 1];
        let v0 = self.lookup(data, i0, size, weights, dim - 1);
        if w1 == 0.0 {
            return v0 * w0;
        }
        let i1 = i0 + self.param_strides[dim - 1] * size;
        let v1 = self.lookup(data, i1, size, weights, dim - 1);
        v0 * w0 + v1 * w1
    }

    /// Evaluate the function at `p`.
    ///
    /// * `p`     - Position in [0, 1]^2.
    /// * `param` - Parameter values.
    pub fn evaluate(&self, p: Point2f, param: &[Float; N]) -> Float {
        let (weights, slice_offset) = self.param_weights(param);
        let [sx, sy] = self.size;

        let px = p.x * self.inv_patch_size[0];
        let py = p.y * self.inv_patch_size[1];
        let ox = min(max(0.0, px) as usize, sx - 2);
        let oy = min(max(0.0, py) as usize, sy - 2);

        let (w1x, w1y) = (px - ox as Float, py - oy as Float);
        let (w0x, w0y) = (1.0 - w1x, 1.0 - w1y);

        let slice_size = sx * sy;
        let index = ox + oy * sx + slice_offset * slice_size;
        let v00 = self.lookup(&self.data, index, slice_size, &weights, N);
        let v10 = self.lookup(&self.data, index + 1, slice_size, &weights, N);
        let v01 = self.lookup(&self.data, index + sx, slice_size, &weights, N);
        let v11 = self.lookup(&self.data, index + sx + 1, slice_size, &weights, N);

        (w0y * (w0x * v00 + w1x * v10) + w1y * (w0x * v01 + w1x * v11)) * self.density_scale
    }

    /// Warp a uniform sample to the distribution.
    ///
    /// * `u`     - Uniform sample in [0, 1)^2.
    /// * `param` - Parameter values.
    pub fn sample(&self, u: Point2f, param: &[Float; N]) -> PLSample {
        debug_assert!(self.has_cdf());

        let mut sample = Point2f::new(
            clamp(u.x, 0.0, ONE_MINUS_EPSILON),
            clamp(u.y, 0.0, ONE_MINUS_EPSILON),
        );
        let (weights, slice_offset) = self.param_weights(param);
        let [sx, sy] = self.size;
        let slice_size = sx * sy;

        // Sample the row first.
        let marginal_offset = slice_offset * sy;
        let fetch_marginal =
            |i: usize| self.lookup(&self.marginal_cdf, marginal_offset + i, sy, &weights, N);
        let uy = sample.y;
        let row = find_interval(sy, |i| fetch_marginal(i) < uy);
        sample.y -= fetch_marginal(row);

        let mut offset = row * sx + slice_offset * slice_size;
        let r0 = self.lookup(&self.conditional_cdf, offset + sx - 1, slice_size, &weights, N);
        let r1 = self.lookup(&self.conditional_cdf, offset + 2 * sx - 1, slice_size, &weights, N);
        sample.y = if abs(r0 - r1) < 1e-4 * (r0 + r1) {
            2.0 * sample.y / (r0 + r1)
        } else {
            (r0 - max(0.0, r0 * r0 - 2.0 * sample.y * (r0 - r1)).sqrt()) / (r0 - r1)
        };

        // Sample the column next.
        sample.x *= (1.0 - sample.y) * r0 + sample.y * r1;
        let ty = sample.y;
        let fetch_conditional = |i: usize| {
            let v0 = self.lookup(&self.conditional_cdf, offset + i, slice_size, &weights, N);
            let v1 = self.lookup(&self.conditional_cdf, offset + sx + i, slice_size, &weights, N);
            (1.0 - ty) * v0 + ty * v1
        };
        let ux = sample.x;
        let col = find_interval(sx, |i| fetch_conditional(i) < ux);
        sample.x -= fetch_conditional(col);

        offset += col;
        let v00 = self.lookup(&self.data, offset, slice_size, &weights, N);
        let v10 = self.lookup(&self.data, offset + 1, slice_size, &weights, N);
        let v01 = self.lookup(&self.data, offset + sx, slice_size, &weights, N);
        let v11 = self.lookup(&self.data, offset + sx + 1, slice_size, &weights, N);
        let c0 = lerp(sample.y, v00, v01);
        let c1 = lerp(sample.y, v10, v11);
        sample.x = if abs(c0 - c1) < 1e-4 * (c0 + c1) {
            2.0 * sample.x / (c0 + c1)
        } else {
            (c0 - max(0.0, c0 * c0 - 2.0 * sample.x * (c0 - c1)).sqrt()) / (c0 - c1)
        };

        PLSample {
            p: Point2f::new(
                (col as Float + sample.x) * self.patch_size[0],
                (row as Float + sample.y) * self.patch_size[1],
            ),
            pdf: ((1.0 - sample.x) * c0 + sample.x * c1) * self.density_scale,
        }
    }

    /// Inverse of `sample()`: map a position back to the uniform sample that
    /// produces it.
    ///
    /// * `p`     - Position in [0, 1]^2.
    /// * `param` - Parameter values.
    pub fn invert(&self, p: Point2f, param: &[Float; N]) -> PLSample {
        debug_assert!(self.has_cdf());

        let (weights, slice_offset) = self.param_weights(param);
        let [sx, sy] = self.size;
        let slice_size = sx * sy;

        let px = p.x * self.inv_patch_size[0];
        let py = p.y * self.inv_patch_size[1];
        let pos_x = min(max(0.0, px) as usize, sx - 2);
        let pos_y = min(max(0.0, py) as usize, sy - 2);
        let mut sample = Point2f::new(px - pos_x as Float, py - pos_y as Float);

        // Invert the x component.
        let mut offset = pos_x + pos_y * sx + slice_offset * slice_size;
        let v00 = self.lookup(&self.data, offset, slice_size, &weights, N);
        let v10 = self.lookup(&self.data, offset + 1, slice_size, &weights, N);
        let v01 = self.lookup(&self.data, offset + sx, slice_size, &weights, N);
        let v11 = self.lookup(&self.data, offset + sx + 1, slice_size, &weights, N);
        let (w1x, w1y) = (sample.x, sample.y);
        let (w0x, w0y) = (1.0 - w1x, 1.0 - w1y);
        let c0 = w0y * v00 + w1y * v01;
        let c1 = w0y * v10 + w1y * v11;
        let pdf = w0x * c0 + w1x * c1;

        sample.x *= c0 + 0.5 * sample.x * (c1 - c0);
        let v0 = self.lookup(&self.conditional_cdf, offset, slice_size, &weights, N);
        let v1 = self.lookup(&self.conditional_cdf, offset + sx, slice_size, &weights, N);
        sample.x += (1.0 - sample.y) * v0 + sample.y * v1;

        offset = pos_y * sx + slice_offset * slice_size;
        let r0 = self.lookup(&self.conditional_cdf, offset + sx - 1, slice_size, &weights, N);
        let r1 = self.lookup(&self.conditional_cdf, offset + 2 * sx - 1, slice_size, &weights, N);
        sample.x /= (1.0 - sample.y) * r0 + sample.y * r1;

        // Invert the y component.
        sample.y *= r0 + 0.5 * sample.y * (r1 - r0);
        let marginal_offset = pos_y + slice_offset * sy;
        sample.y += self.lookup(&self.marginal_cdf, marginal_offset, sy, &weights, N);

        PLSample {
            p: sample,
            pdf: pdf * self.density_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn ramp() -> PiecewiseLinear2D<0> {
        // f(x, y) = 1 + x + 2y on a 3x3 grid.
        let mut data = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                data.push(1.0 + 0.5 * x as Float + y as Float);
            }
        }
        PiecewiseLinear2D::<0>::new(&data, 3, 3, [], true, true).unwrap()
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(PiecewiseLinear2D::<0>::new(&[1.0; 3], 3, 2, [], true, true).is_err());
        assert!(PiecewiseLinear2D::<0>::new(&[1.0; 2], 1, 2, [], true, true).is_err());
        assert!(PiecewiseLinear2D::<0>::new(&[1.0; 4], 2, 2, [], false, true).is_err());
    }

    #[test]
    fn normalized_density_integrates_to_one() {
        let d = ramp();
        let n = 64;
        let mut sum = 0.0;
        for j in 0..n {
            for i in 0..n {
                let p = Point2f::new(
                    (i as Float + 0.5) / n as Float,
                    (j as Float + 0.5) / n as Float,
                );
                sum += d.evaluate(p, &[]);
            }
        }
        assert!(approx_eq!(Float, sum / (n * n) as Float, 1.0, epsilon = 0.001));
    }

    #[test]
    fn parameter_slices_interpolate() {
        let lo = [1.0; 4];
        let hi = [3.0; 4];
        let data: Vec<Float> = lo.iter().chain(hi.iter()).copied().collect();
        let params: [&[Float]; 1] = [&[0.0, 1.0]];
        let d = PiecewiseLinear2D::<1>::new(&data, 2, 2, params, false, false).unwrap();
        let v = d.evaluate(Point2f::new(0.3, 0.7), &[0.5]);
        assert!(approx_eq!(Float, v, 2.0, epsilon = 0.00001));
    }

    prop_compose! {
        fn unit_square()(x in 0.0f32..1.0f32, y in 0.0f32..1.0f32) -> Point2f {
            Point2f::new(x, y)
        }
    }

    proptest! {
        #[test]
        fn sample_matches_evaluate_and_inverts(u in unit_square()) {
            let d = ramp();
            let s = d.sample(u, &[]);
            prop_assert!(approx_eq!(Float, s.pdf, d.evaluate(s.p, &[]), epsilon = 0.001));

            let inv = d.invert(s.p, &[]);
            prop_assert!(approx_eq!(Float, inv.p.x, u.x, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, inv.p.y, u.y, epsilon = 0.001));
        }
    }
}
