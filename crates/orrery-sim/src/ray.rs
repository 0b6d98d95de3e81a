use glam::DVec3;

/// Half-line in scene units. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`. `None` for a zero or non-finite
    /// direction.
    pub fn new(origin: DVec3, direction: DVec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Squared distance from `point` to the ray. Points behind the origin
    /// measure to the origin itself.
    #[inline]
    pub fn distance_sq_to_point(&self, point: DVec3) -> f64 {
        let to_point = point - self.origin;
        let along = to_point.dot(self.direction);
        if along < 0.0 {
            return to_point.length_squared();
        }
        (self.origin + self.direction * along).distance_squared(point)
    }

    /// Nearest non-negative ray parameter where the ray enters the sphere, or
    /// `None` if it misses. An origin inside the sphere hits at its exit point.
    pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_axis() -> Ray {
        Ray::new(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0)).unwrap()
    }

    #[test]
    fn test_direction_normalized() {
        assert!((x_axis().direction.length() - 1.0).abs() < 1e-12);
        assert!(Ray::new(DVec3::ZERO, DVec3::ZERO).is_none());
    }

    #[test]
    fn test_distance_to_point_beside_ray() {
        assert!((x_axis().distance_sq_to_point(DVec3::new(5.0, 3.0, 0.0)) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_behind_origin_measures_to_origin() {
        let d = x_axis().distance_sq_to_point(DVec3::new(-3.0, 4.0, 0.0));
        assert!((d - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_hit_in_front() {
        let t = x_axis().intersect_sphere(DVec3::new(10.0, 0.0, 0.0), 1.0).unwrap();
        assert!((t - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_sphere_behind_misses() {
        assert!(x_axis().intersect_sphere(DVec3::new(-10.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_sphere_off_axis_misses() {
        assert!(x_axis().intersect_sphere(DVec3::new(10.0, 2.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_origin_inside_sphere() {
        let t = x_axis().intersect_sphere(DVec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-12);
    }
}
