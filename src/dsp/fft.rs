// src/dsp/fft.rs
//! Radix-2 Cooley-Tukey FFT.
//!
//! Iterative and in place: bit-reversal permutation followed by butterfly
//! passes with twiddles `e^{-2πik/N}`. Inputs are zero-padded to the next
//! power of two. No scaling is applied, so `X_0` is the plain sum of the input.
use std::f64::consts::PI;

/// Complex spectrum stored as parallel real/imaginary arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Spectrum {
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// `|X_k|²` for bin `k`.
    pub fn power(&self, k: usize) -> f64 {
        self.real[k] * self.real[k] + self.imag[k] * self.imag[k]
    }
}

/// Forward transform of a real signal.
pub fn fft(samples: &[f64]) -> Spectrum {
    if samples.is_empty() {
        return Spectrum::default();
    }
    let n = samples.len().next_power_of_two();
    let mut real = samples.to_vec();
    real.resize(n, 0.0);
    let mut imag = vec![0.0; n];
    fft_in_place(&mut real, &mut imag);
    Spectrum { real, imag }
}

/// Transforms `real`/`imag` in place. Both slices must share a power-of-two length.
pub fn fft_in_place(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    assert_eq!(n, imag.len(), "real and imaginary parts differ in length");
    assert!(n.is_power_of_two(), "FFT size {n} is not a power of two");
    if n <= 1 {
        return;
    }

    bit_reverse_permute(real, imag);

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let step = -2.0 * PI / size as f64;
        for start in (0..n).step_by(size) {
            for k in 0..half {
                let (sin, cos) = (step * k as f64).sin_cos();
                let even = start + k;
                let odd = even + half;
                let odd_re = real[odd] * cos - imag[odd] * sin;
                let odd_im = real[odd] * sin + imag[odd] * cos;
                real[odd] = real[even] - odd_re;
                imag[odd] = imag[even] - odd_im;
                real[even] += odd_re;
                imag[even] += odd_im;
            }
        }
        size *= 2;
    }
}

fn bit_reverse_permute(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if j > i {
            real.swap(i, j);
            imag.swap(i, j);
        }
    }
}
