//! Wave order flipping

use super::WaveMatrix;

/// Reverse the order of waves when `flip` is set; identity otherwise
///
/// Samples inside each wave keep their order.
pub fn apply_flip(matrix: WaveMatrix, flip: bool) -> WaveMatrix {
    if flip {
        reverse_waves(matrix)
    } else {
        matrix
    }
}

/// Reverse the order of waves
pub fn reverse_waves(matrix: WaveMatrix) -> WaveMatrix {
    log::debug!("Reversing order of {} waves", matrix.wave_count());
    let wavelength = matrix.wavelength();
    let mut data = Vec::with_capacity(matrix.samples().len());
    for wave in matrix.samples().rchunks_exact(wavelength) {
        data.extend_from_slice(wave);
    }
    WaveMatrix { data, wavelength }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> WaveMatrix {
        WaveMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_reverse() {
        let flipped = reverse_waves(sample_matrix());
        assert_eq!(flipped.samples(), &[5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let original = sample_matrix();
        let twice = apply_flip(apply_flip(original.clone(), true), true);
        assert_eq!(twice, original);
    }

    #[test]
    fn test_no_flip_is_identity() {
        assert_eq!(apply_flip(sample_matrix(), false), sample_matrix());
    }
}
