use bevy_ecs::prelude::*;

use crate::stage::{Drift, ParticleBounds, TimeDelta, Transform3D};

/// Cloud drift: constant velocity scaled to a 60Hz reference frame, with
/// velocity reflection at the horizontal bounds. Height is never touched.
pub fn sys_drift_particles(
    dt: Res<TimeDelta>,
    bounds: Res<ParticleBounds>,
    mut query: Query<(&mut Transform3D, &mut Drift)>,
) {
    let step = dt.0 * 60.0;
    let extent = bounds.extent;
    for (mut transform, mut drift) in query.iter_mut() {
        transform.translation.x += drift.0.x * step;
        transform.translation.z += drift.0.z * step;
        if transform.translation.x.abs() > extent {
            drift.0.x = -drift.0.x;
        }
        if transform.translation.z.abs() > extent {
            drift.0.z = -drift.0.z;
        }
    }
}
