use glam::Vec3;

/// Offset used to push secondary rays off the surface they start on.
pub const EPS_RAY: f32 = 1e-3;

pub const INV_PI: f32 = std::f32::consts::FRAC_1_PI;

pub fn reflect(incoming: &Vec3, normal: &Vec3) -> Vec3 {
    return *incoming - (*normal * normal.dot(*incoming) * 2.0);
}

/**
 * Refracts `incoming` through a surface with the given relative index of refraction
 * (`eta` = n_from / n_to). Returns None on total internal reflection.
 */
pub fn refract(incoming: &Vec3, normal: &Vec3, eta: f32) -> Option<Vec3> {
    let cos_i = -normal.dot(*incoming);
    let sin2_t = eta * eta * (1.0 - cos_i * cos_i);

    if sin2_t > 1.0 {
        return None;
    }

    let cos_t = (1.0 - sin2_t).sqrt();
    return Some(*incoming * eta + *normal * (eta * cos_i - cos_t));
}

pub fn luminance(rgb: Vec3) -> f32 {
    0.212671 * rgb.x + 0.715160 * rgb.y + 0.072169 * rgb.z
}
