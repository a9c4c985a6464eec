//! Ray casting utilities
//!
//! Ray-plane and ray-cylinder intersection used to pick the tracked object
//! with a coarse proxy volume and to resolve drags against an invisible
//! ground plane when surface tracking drops out.

use glam::Vec3;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Upright cylinder used as a gross hit-test proxy for the tracked object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyCylinder {
    /// Center of the bottom cap.
    pub base: Vec3,
    /// Height along +Y.
    pub height: f32,
    pub radius: f32,
}

/// Ray-plane intersection.
///
/// Returns the hit point, or `None` when the ray is parallel to the plane or
/// the plane lies behind the ray origin.
pub fn ray_plane_intersection(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < 1e-6 {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }

    Some(ray.at(t))
}

/// Ray-cylinder intersection against a capped, upright cylinder.
///
/// # Algorithm
///
/// 1. **Side surface**: project the ray into the XZ plane (the plane
///    perpendicular to the cylinder axis) and solve the 2D quadratic
///    ```text
///    |o + t·d|² = r²
///    ```
///    keeping the nearest root whose hit height lies within the cylinder.
///
/// 2. **Caps**: intersect the ray with the top and bottom planes and accept
///    a hit whose radial distance from the axis is at most `radius`.
///
/// Looking down onto a placed object from a handheld device mostly hits the
/// top cap, so both tests are needed.
///
/// # Returns
///
/// * `Some(t)` - The ray parameter of the closest intersection.
/// * `None` - If the ray misses the cylinder or it lies behind the origin.
pub fn ray_cylinder_intersection(ray: &Ray, cylinder: &ProxyCylinder) -> Option<f32> {
    let top = cylinder.base.y + cylinder.height;
    let within_height = |y: f32| y >= cylinder.base.y - 1e-5 && y <= top + 1e-5;

    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t >= 0.0 && best.is_none_or(|b| t < b) {
            best = Some(t);
        }
    };

    // Side surface, solved in the XZ plane
    let d = Vec3::new(ray.direction.x, 0.0, ray.direction.z);
    let o = Vec3::new(ray.origin.x - cylinder.base.x, 0.0, ray.origin.z - cylinder.base.z);
    let a = d.dot(d);
    if a > 1e-12 {
        let b = 2.0 * d.dot(o);
        let c = o.dot(o) - cylinder.radius * cylinder.radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 {
            let sqrt_disc = discriminant.sqrt();
            for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                if t >= 0.0 && within_height(ray.at(t).y) {
                    consider(t);
                }
            }
        }
    }

    // Caps
    if ray.direction.y.abs() > 1e-6 {
        for cap_y in [cylinder.base.y, top] {
            let t = (cap_y - ray.origin.y) / ray.direction.y;
            let p = ray.at(t);
            let radial = Vec3::new(p.x - cylinder.base.x, 0.0, p.z - cylinder.base.z);
            if radial.length_squared() <= cylinder.radius * cylinder.radius {
                consider(t);
            }
        }
    }

    best
}
