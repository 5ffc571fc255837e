//! Animation channel playback into host keyframes.
//!
//! Each channel is sampled at its own keys only: every key is axis-converted,
//! reconciled against the target bone's bind context, written to the pose bone
//! and keyed at `time * frame_rate`. Once a channel is done its interpolation
//! is set on the keyframes it inserted.

use glam::Quat;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::document::{Animation, Channel, ChannelData, Document};
use crate::errors::{ImportIssue, ImportLog};
use crate::host::{HostMode, KeyframeInterpolation, ModeScope, PoseValue, SceneHost};
use crate::math::axis;
use crate::rig::bind_pose::BuiltArmature;
use crate::rig::reconcile::{BindContext, PoseReconciler, parent_bind_matrix};
use crate::settings::NonJointParentPolicy;

pub struct AnimationPlayer<'a, H: SceneHost> {
    host: &'a mut H,
    reconciler: PoseReconciler,
    policy: NonJointParentPolicy,
    frame_rate: f32,
}

impl<'a, H: SceneHost> AnimationPlayer<'a, H> {
    pub fn new(
        host: &'a mut H,
        reconciler: PoseReconciler,
        policy: NonJointParentPolicy,
        frame_rate: f32,
    ) -> Self {
        Self {
            host,
            reconciler,
            policy,
            frame_rate,
        }
    }

    /// Plays one animation onto every armature that owns one of its targets.
    ///
    /// Returns the number of keyframes inserted.
    pub fn play(
        &mut self,
        document: &Document,
        animation: &Animation,
        armatures: &[BuiltArmature<H>],
        log: &mut ImportLog,
    ) -> usize {
        let mut actions: FxHashMap<usize, H::Action> = FxHashMap::default();
        let mut inserted = 0;

        for channel in &animation.channels {
            let Some(node) = document.node(channel.node) else {
                continue;
            };

            let Some(skin) = node.armature_skin() else {
                if node.is_joint {
                    log.record(ImportIssue::UnboundChannelTarget {
                        animation: animation.index,
                        node: channel.node,
                    });
                } else {
                    log::debug!(
                        "Animation {}: skipping channel on non-joint node {}",
                        animation.index,
                        channel.node
                    );
                }
                continue;
            };

            let Some((armature, bone)) = armatures
                .iter()
                .find(|a| a.skin == skin)
                .and_then(|a| Some((a, a.bone(channel.node)?)))
            else {
                log.record(ImportIssue::UnboundChannelTarget {
                    animation: animation.index,
                    node: channel.node,
                });
                continue;
            };

            if let Err(reason) = channel.check() {
                log.record(ImportIssue::MalformedChannel {
                    animation: animation.index,
                    node: channel.node,
                    path: channel.path(),
                    reason,
                });
                continue;
            }
            if !channel.is_sorted() {
                log::warn!(
                    "Animation {}: {:?} keys of node {} are not sorted; reordering",
                    animation.index,
                    channel.path(),
                    channel.node
                );
            }

            let action = *actions
                .entry(skin)
                .or_insert_with(|| self.action_for(animation, armature));

            let Some(bind) = node.armature_bone_bind_matrix() else {
                continue;
            };
            let parent_bind = parent_bind_matrix(document, &*self.host, channel.node, self.policy, log);
            let ctx = BindContext::new(&parent_bind, bind);

            inserted += self.play_channel(channel, &ctx, armature.armature, bone, action);
        }

        inserted
    }

    /// Reuses the action named after the animation and armature, or creates
    /// it, and assigns it to the armature.
    fn action_for(&mut self, animation: &Animation, armature: &BuiltArmature<H>) -> H::Action {
        let name = animation.container_name(&armature.name);
        let action = if let Some(existing) = self.host.find_action(&name) {
            log::debug!("Reusing action '{name}'");
            existing
        } else {
            self.host.create_action(&name)
        };
        self.host.assign_action(armature.armature, action);
        action
    }

    fn play_channel(
        &mut self,
        channel: &Channel,
        ctx: &BindContext,
        armature: H::Armature,
        bone: H::Bone,
        action: H::Action,
    ) -> usize {
        let keys = self.reconcile_keys(channel, ctx);
        let Some((_, first)) = keys.first() else {
            return 0;
        };
        let property = first.property();
        let frame_rate = self.frame_rate;

        let mut scope = ModeScope::enter(&mut *self.host, armature, HostMode::Pose);
        let mut keyframes: SmallVec<[H::Keyframe; 16]> = SmallVec::with_capacity(keys.len());
        let mut seen = FxHashSet::default();
        for &(time, value) in &keys {
            scope.set_pose_value(bone, value);
            let keyframe =
                scope.insert_keyframe(action, bone, property, time * frame_rate, property.group());
            // Repeated key times land on the same keyframe.
            if seen.insert(keyframe) {
                keyframes.push(keyframe);
            }
        }

        let mode = KeyframeInterpolation::from(channel.interpolation());
        for &keyframe in &keyframes {
            scope.set_keyframe_interpolation(keyframe, mode);
        }

        keyframes.len()
    }

    /// Reconciled pose values of every key, in increasing time.
    fn reconcile_keys(&self, channel: &Channel, ctx: &BindContext) -> Vec<(f32, PoseValue)> {
        let reconciler = &self.reconciler;
        match &channel.data {
            ChannelData::Translation(track) => track
                .keyframes()
                .map(|(t, v)| {
                    let location = reconciler.location(axis::location_to_target(v), ctx);
                    (t, PoseValue::Location(location))
                })
                .collect(),
            ChannelData::Rotation(track) => {
                let mut previous: Option<Quat> = None;
                track
                    .keyframes()
                    .map(|(t, q)| {
                        let rotation =
                            reconciler.rotation(axis::quaternion_to_target(q), ctx, previous);
                        previous = Some(rotation);
                        (t, PoseValue::Rotation(rotation))
                    })
                    .collect()
            }
            ChannelData::Scale(track) => track
                .keyframes()
                .map(|(t, s)| (t, PoseValue::Scale(reconciler.scale(axis::scale_to_target(s), ctx))))
                .collect(),
        }
    }
}
