//! In-memory world for exercising sessions without an engine.
//!
//! Records every scene and notification request. Physics is a plain
//! explicit-Euler integrator with no collisions, which is enough to observe
//! that bodies move and that visuals follow them.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::{
    Session,
    backend::{BodyDesc, BodyKind, BoxVisual, Notifier, PhysicsBackend, Pose, SceneBackend},
};

pub(crate) type TestSession = Session<usize, usize>;

#[derive(Clone, Debug)]
pub(crate) struct TestBody {
    pub desc: BodyDesc,
    pub pose: Pose,
    pub linear: Vec3,
    pub angular: Vec3,
}

#[derive(Default)]
pub(crate) struct RecordingWorld {
    next_id: usize,
    visuals: HashMap<usize, (BoxVisual, Pose)>,
    bodies: HashMap<usize, TestBody>,
    pub gravity: Vec3,
    pub camera: Option<Pose>,
    pub despawned_visuals: Vec<usize>,
    pub removed_bodies: Vec<usize>,
    pub notifications: Vec<String>,
    pub steps: Vec<f32>,
    pub renders: usize,
}

impl RecordingWorld {
    fn allocate(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    pub fn visual_pose(&self, visual: usize) -> Option<Pose> {
        self.visuals.get(&visual).map(|(_, pose)| *pose)
    }

    pub fn body(&self, body: usize) -> Option<&TestBody> {
        self.bodies.get(&body)
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl SceneBackend for RecordingWorld {
    type Visual = usize;

    fn spawn_box(&mut self, visual: BoxVisual) -> usize {
        let id = self.allocate();
        self.visuals.insert(id, (visual, visual.pose));
        id
    }

    fn despawn_visual(&mut self, visual: usize) {
        if self.visuals.remove(&visual).is_some() {
            self.despawned_visuals.push(visual);
        }
    }

    fn set_visual_pose(&mut self, visual: usize, pose: Pose) {
        if let Some((_, current)) = self.visuals.get_mut(&visual) {
            *current = pose;
        }
    }

    fn set_camera_pose(&mut self, pose: Pose) {
        self.camera = Some(pose);
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

impl PhysicsBackend for RecordingWorld {
    type Body = usize;

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn add_body(&mut self, desc: BodyDesc) -> usize {
        let id = self.allocate();
        self.bodies.insert(
            id,
            TestBody {
                desc,
                pose: desc.pose,
                linear: Vec3::ZERO,
                angular: Vec3::ZERO,
            },
        );
        id
    }

    fn remove_body(&mut self, body: usize) {
        if self.bodies.remove(&body).is_some() {
            self.removed_bodies.push(body);
        }
    }

    fn set_body_pose(&mut self, body: usize, pose: Pose) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.pose = pose;
        }
    }

    fn set_linear_velocity(&mut self, body: usize, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.linear = velocity;
        }
    }

    fn set_angular_velocity(&mut self, body: usize, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.angular = velocity;
        }
    }

    fn linear_velocity(&self, body: usize) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.linear)
    }

    fn angular_velocity(&self, body: usize) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.angular)
    }

    fn body_pose(&self, body: usize) -> Option<Pose> {
        self.bodies.get(&body).map(|b| b.pose)
    }

    fn step(&mut self, dt: f32) {
        self.steps.push(dt);
        for body in self.bodies.values_mut() {
            if body.desc.kind == BodyKind::Static {
                continue;
            }
            body.linear += self.gravity * dt;
            body.pose.translation += body.linear * dt;
            body.pose.rotation =
                (Quat::from_scaled_axis(body.angular * dt) * body.pose.rotation).normalize();
        }
    }
}

impl Notifier for RecordingWorld {
    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}
