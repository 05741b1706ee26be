//! Session collaborators implemented on a Bevy `World`.
//!
//! Visuals and physics bodies are separate entities, so the session decides
//! when a body's pose is copied onto its visual. Avian runs in the
//! [`PhysicsStep`] schedule, which only advances when the session steps it.

use std::time::Duration;

use avian3d::prelude::*;
use bevy::{ecs::schedule::ScheduleLabel, prelude::*};
use racer_core::{
    BodyDesc, BodyKind, BoxVisual, Notifier, PhysicsBackend, Pose, RgbColor, SceneBackend,
};

/// Schedule that Avian's simulation runs in.
///
/// Never run by the app's main loop; [`EcsWorld::step`] runs it once per tick.
#[derive(ScheduleLabel, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhysicsStep;

/// Marker for boxes the session spawned into the scene.
#[derive(Component)]
pub struct SessionVisual;

/// Marker for rigid bodies the session added to the physics world.
#[derive(Component)]
pub struct SessionBody;

/// Marker for the camera the session controls.
#[derive(Component)]
pub struct RaceCamera;

/// Message waiting for the user to dismiss it.
///
/// While a message is pending the simulation does not advance.
#[derive(Resource, Default)]
pub struct PendingAlert {
    pub message: Option<String>,
}

impl PendingAlert {
    pub fn is_open(&self) -> bool {
        self.message.is_some()
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }
}

/// Convert a session colour to a Bevy colour.
pub fn to_bevy_color(color: RgbColor) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::srgb_u8(r, g, b)
}

fn pose_to_transform(pose: Pose) -> Transform {
    Transform::from_translation(pose.translation).with_rotation(pose.rotation)
}

/// Exclusive access to the ECS world, viewed as the session's scene,
/// physics world and notifier.
pub struct EcsWorld<'w> {
    world: &'w mut World,
}

impl<'w> EcsWorld<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }
}

impl SceneBackend for EcsWorld<'_> {
    type Visual = Entity;

    fn spawn_box(&mut self, visual: BoxVisual) -> Entity {
        let mesh = self
            .world
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::new(visual.size.x, visual.size.y, visual.size.z));
        // Flat colour, no lighting.
        let material = self
            .world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: to_bevy_color(visual.color),
                unlit: true,
                ..Default::default()
            });

        self.world
            .spawn((
                SessionVisual,
                Mesh3d(mesh),
                MeshMaterial3d(material),
                pose_to_transform(visual.pose),
            ))
            .id()
    }

    fn despawn_visual(&mut self, visual: Entity) {
        if self.world.get::<SessionVisual>(visual).is_none() {
            tracing::warn!("Tried to despawn {visual}, which is not a session visual");
            return;
        }
        self.world.despawn(visual);
    }

    fn set_visual_pose(&mut self, visual: Entity, pose: Pose) {
        let Some(mut transform) = self.world.get_mut::<Transform>(visual) else {
            tracing::warn!("Visual {visual} has no transform");
            return;
        };
        transform.translation = pose.translation;
        transform.rotation = pose.rotation;
    }

    fn set_camera_pose(&mut self, pose: Pose) {
        let mut query = self
            .world
            .query_filtered::<&mut Transform, With<RaceCamera>>();
        let Ok(mut transform) = query.single_mut(self.world) else {
            tracing::warn!("No race camera to move");
            return;
        };
        *transform = pose_to_transform(pose);
    }

    fn render(&mut self) {
        // Bevy's render app extracts and draws the world after every frame.
    }
}

impl PhysicsBackend for EcsWorld<'_> {
    type Body = Entity;

    fn set_gravity(&mut self, gravity: Vec3) {
        self.world.insert_resource(Gravity(gravity));
    }

    fn add_body(&mut self, desc: BodyDesc) -> Entity {
        let size = desc.half_extents * 2.0;
        let mut body = self.world.spawn((
            SessionBody,
            Collider::cuboid(size.x, size.y, size.z),
            Position(desc.pose.translation),
            Rotation(desc.pose.rotation),
            pose_to_transform(desc.pose),
            GlobalTransform::from(pose_to_transform(desc.pose)),
            LinearVelocity::default(),
            AngularVelocity::default(),
        ));
        match desc.kind {
            BodyKind::Dynamic => {
                body.insert((RigidBody::Dynamic, Mass(desc.mass)));
            }
            BodyKind::Static => {
                body.insert(RigidBody::Static);
            }
        }
        body.id()
    }

    fn remove_body(&mut self, body: Entity) {
        if self.world.get::<SessionBody>(body).is_none() {
            tracing::warn!("Tried to remove {body}, which is not a session body");
            return;
        }
        self.world.despawn(body);
    }

    fn set_body_pose(&mut self, body: Entity, pose: Pose) {
        let Ok(mut entity) = self.world.get_entity_mut(body) else {
            tracing::warn!("Tried to move missing body {body}");
            return;
        };
        // Keep both transforms in step so the transform-to-position sync does not undo the move.
        if let Some(mut position) = entity.get_mut::<Position>() {
            position.0 = pose.translation;
        }
        if let Some(mut rotation) = entity.get_mut::<Rotation>() {
            rotation.0 = pose.rotation;
        }
        if let Some(mut transform) = entity.get_mut::<Transform>() {
            *transform = pose_to_transform(pose);
        }
        if let Some(mut global) = entity.get_mut::<GlobalTransform>() {
            *global = GlobalTransform::from(pose_to_transform(pose));
        }
    }

    fn set_linear_velocity(&mut self, body: Entity, velocity: Vec3) {
        if let Some(mut linear) = self.world.get_mut::<LinearVelocity>(body) {
            linear.0 = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: Entity, velocity: Vec3) {
        if let Some(mut angular) = self.world.get_mut::<AngularVelocity>(body) {
            angular.0 = velocity;
        }
    }

    fn linear_velocity(&self, body: Entity) -> Option<Vec3> {
        self.world.get::<LinearVelocity>(body).map(|v| v.0)
    }

    fn angular_velocity(&self, body: Entity) -> Option<Vec3> {
        self.world.get::<AngularVelocity>(body).map(|v| v.0)
    }

    fn body_pose(&self, body: Entity) -> Option<Pose> {
        let position = self.world.get::<Position>(body)?;
        let rotation = self.world.get::<Rotation>(body)?;
        Some(Pose {
            translation: position.0,
            rotation: rotation.0,
        })
    }

    fn step(&mut self, dt: f32) {
        // Avian takes its timestep from the generic `Time` clock, so present
        // a clock that advanced by exactly `dt` while the schedule runs.
        let saved = *self.world.resource::<Time>();
        let mut clock = Time::<()>::default();
        clock.advance_by(Duration::from_secs_f32(dt));
        *self.world.resource_mut::<Time>() = clock;

        self.world.run_schedule(PhysicsStep);

        *self.world.resource_mut::<Time>() = saved;
    }
}

impl Notifier for EcsWorld<'_> {
    fn notify(&mut self, message: &str) {
        tracing::warn!("{message}");
        match self.world.get_resource_mut::<PendingAlert>() {
            Some(mut alert) => alert.message = Some(message.to_string()),
            None => tracing::error!("No alert surface available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use racer_core::{Session, SessionConfig};

    use super::*;
    use crate::testing::physics_app;

    const DT: f32 = 1.0 / 60.0;

    fn dynamic_box(y: f32) -> BodyDesc {
        BodyDesc {
            kind: BodyKind::Dynamic,
            mass: 1.0,
            half_extents: Vec3::new(0.25, 0.25, 0.5),
            pose: Pose::from_translation(Vec3::new(0.0, y, 0.0)),
        }
    }

    #[test]
    fn test_to_bevy_color() {
        assert_eq!(
            to_bevy_color(RgbColor::RED).to_srgba(),
            Srgba::rgb_u8(255, 0, 0)
        );
        assert_eq!(
            to_bevy_color(RgbColor(0x00_80_ff)).to_srgba(),
            Srgba::rgb_u8(0, 0x80, 0xff)
        );
    }

    #[test]
    fn test_pose_to_transform() {
        let pose = Pose {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
        };
        let transform = pose_to_transform(pose);
        assert_eq!(transform.translation, pose.translation);
        assert_eq!(transform.rotation, pose.rotation);
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_pending_alert_dismiss() {
        let mut alert = PendingAlert::default();
        assert!(!alert.is_open());
        alert.message = Some("hello".into());
        assert!(alert.is_open());
        alert.dismiss();
        assert!(!alert.is_open());
    }

    #[test]
    fn test_step_moves_dynamic_body_under_gravity() {
        let mut app = physics_app();
        let world = app.world_mut();
        let elapsed_before = world.resource::<Time>().elapsed();

        let mut ecs = EcsWorld::new(world);
        ecs.set_gravity(Vec3::new(0.0, -9.82, 0.0));
        let body = ecs.add_body(dynamic_box(1.0));
        for _ in 0..10 {
            ecs.step(DT);
        }
        let pose = ecs.body_pose(body).unwrap();
        let velocity = ecs.linear_velocity(body).unwrap();

        assert!(pose.translation.y < 1.0, "body should fall, got {pose:?}");
        assert!(velocity.y < 0.0);
        // The app clock is restored after every step.
        assert_eq!(app.world().resource::<Time>().elapsed(), elapsed_before);
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut app = physics_app();
        let mut ecs = EcsWorld::new(app.world_mut());
        ecs.set_gravity(Vec3::new(0.0, -9.82, 0.0));
        let body = ecs.add_body(BodyDesc {
            kind: BodyKind::Static,
            mass: 0.0,
            half_extents: Vec3::new(0.5, 0.1, 5.0),
            pose: Pose::IDENTITY,
        });
        for _ in 0..10 {
            ecs.step(DT);
        }

        assert_eq!(ecs.body_pose(body).unwrap().translation, Vec3::ZERO);
    }

    #[test]
    fn test_set_body_pose_updates_all_transforms() {
        let mut app = physics_app();
        let mut ecs = EcsWorld::new(app.world_mut());
        let body = ecs.add_body(dynamic_box(1.0));
        let pose = Pose {
            translation: Vec3::new(2.0, 3.0, -4.0),
            rotation: Quat::from_rotation_y(1.0),
        };
        ecs.set_body_pose(body, pose);

        let world = app.world();
        assert_eq!(world.get::<Position>(body).unwrap().0, pose.translation);
        assert_eq!(world.get::<Rotation>(body).unwrap().0, pose.rotation);
        assert_eq!(*world.get::<Transform>(body).unwrap(), pose_to_transform(pose));
        assert_eq!(
            world.get::<GlobalTransform>(body).unwrap().translation(),
            pose.translation
        );
    }

    #[test]
    fn test_removed_segment_leaves_no_entities() {
        let mut app = physics_app();
        let mut session: Session<Entity, Entity> = Session::new(SessionConfig::default(), 1);
        let mut ecs = EcsWorld::new(app.world_mut());
        session.add_track_segment(&mut ecs);
        let segment = *session.track().last().unwrap();
        session.remove_track_segment(&mut ecs);
        ecs.step(DT);

        let world = app.world();
        assert!(world.get_entity(segment.visual).is_err());
        assert!(world.get_entity(segment.body).is_err());
    }

    #[test]
    fn test_despawn_ignores_foreign_entities() {
        let mut app = physics_app();
        let world = app.world_mut();
        let foreign = world.spawn(Transform::default()).id();

        let mut ecs = EcsWorld::new(world);
        ecs.despawn_visual(foreign);
        ecs.remove_body(foreign);

        assert!(app.world().get_entity(foreign).is_ok());
    }

    #[test]
    fn test_notify_opens_alert() {
        let mut app = physics_app();
        EcsWorld::new(app.world_mut()).notify("hello");
        assert_eq!(
            app.world().resource::<PendingAlert>().message.as_deref(),
            Some("hello")
        );
    }
}
