/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Rotation about the vertical (Y) axis:
/// x' = x cos(a) - z sin(a), z' = x sin(a) + z cos(a)
pub fn yaw_rotation(angle: f64) -> [[f64; 3]; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [[cos_a, 0.0, -sin_a], [0.0, 1.0, 0.0], [sin_a, 0.0, cos_a]]
}

/// Rotation about the horizontal (X) axis:
/// y' = y cos(a) - z sin(a), z' = y sin(a) + z cos(a)
pub fn pitch_rotation(angle: f64) -> [[f64; 3]; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos_a, -sin_a], [0.0, sin_a, cos_a]]
}
