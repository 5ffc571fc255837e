//! Animation Tests
//!
//! Tests for:
//! - KeyframeTrack validation, cubic-spline value layout and key ordering
//! - Frame mapping (time × frame rate)
//! - Action naming and reuse
//! - Per-channel interpolation
//! - Malformed and unbound channels

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3};

use rigport::document::{
    Animation, Channel, ChannelData, ChannelPath, Document, Interpolation, KeyframeTrack, Skin,
};
use rigport::errors::ImportIssue;
use rigport::host::{BoneProperty, KeyframeInterpolation, MemoryHost, PoseValue, SceneHost};
use rigport::math::Trs;
use rigport::rig::RigImporter;
use rigport::settings::{ImportSettings, RotationContinuity};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Root joint at the origin with one child joint one unit up (glTF space).
fn two_joint_chain() -> (Document, usize, usize) {
    let mut doc = Document::new();
    let root = doc.add_node(Some("root"), Trs::IDENTITY);
    let child = doc.add_node(
        Some("child"),
        Trs::new(Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE),
    );
    doc.attach(child, root);
    doc.add_skin(Skin::new(
        0,
        vec![root, child],
        vec![
            Mat4::IDENTITY,
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        ],
    ));
    (doc, root, child)
}

fn rotation_channel(node: usize, times: Vec<f32>, values: Vec<Quat>, mode: Interpolation) -> Channel {
    Channel::new(node, ChannelData::Rotation(KeyframeTrack::new(times, values, mode)))
}

fn translation_channel(node: usize, times: Vec<f32>, values: Vec<Vec3>, mode: Interpolation) -> Channel {
    Channel::new(node, ChannelData::Translation(KeyframeTrack::new(times, values, mode)))
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_check_rejects_value_count_mismatch() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO], Interpolation::Linear);
    assert!(track.check().is_err());

    let cubic = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO; 6], Interpolation::CubicSpline);
    assert!(cubic.check().is_ok());
}

#[test]
fn track_cubic_spline_reads_middle_value() {
    let values = vec![
        Vec3::splat(-1.0),
        Vec3::splat(1.0),
        Vec3::splat(-2.0),
        Vec3::splat(-3.0),
        Vec3::splat(2.0),
        Vec3::splat(-4.0),
    ];
    let track = KeyframeTrack::new(vec![0.0, 1.0], values, Interpolation::CubicSpline);

    assert_eq!(track.value_at(0), Some(Vec3::splat(1.0)));
    assert_eq!(track.value_at(1), Some(Vec3::splat(2.0)));
    assert_eq!(track.tangents_at(1), Some((Vec3::splat(-3.0), Vec3::splat(-4.0))));
    assert_eq!(track.value_at(2), None);
}

#[test]
fn track_keyframes_are_time_ordered() {
    let track = KeyframeTrack::new(
        vec![1.0, 0.0, 0.5],
        vec![10.0_f32, 0.0, 5.0],
        Interpolation::Linear,
    );
    assert!(!track.is_sorted());

    let keys: Vec<(f32, f32)> = track.keyframes().collect();
    assert_eq!(keys, vec![(0.0, 0.0), (0.5, 5.0), (1.0, 10.0)]);
    assert!(approx(track.duration(), 1.0));
}

#[test]
fn animation_container_name_falls_back_to_index() {
    let named = Animation::new(0, Some("Walk".to_string()), Vec::new());
    assert_eq!(named.container_name("Rig"), "Walk_Rig");

    let unnamed = Animation::new(3, None, Vec::new());
    assert_eq!(unnamed.container_name("Rig"), "Animation_3_Rig");
}

// ============================================================================
// Playback
// ============================================================================

#[test]
fn keys_land_on_time_times_frame_rate() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Bob".to_string()),
        vec![translation_channel(
            child,
            vec![0.0, 0.5, 1.0],
            vec![Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 1.0, 0.0)],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let report = RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();
    assert_eq!(report.keyframes, 3);

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "child").unwrap();
    let action = host.action_by_name("Bob_Armature_0").unwrap();
    let keys = host.keyframes_of(action, bone, BoneProperty::Location);

    let frames: Vec<f32> = keys.iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0.0, 12.0, 24.0]);
    assert!(keys.iter().all(|k| k.group == "location"));

    // One unit above the bind position, along target +Z.
    match keys[1].value {
        PoseValue::Location(v) => assert!(v.abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), EPSILON), "{v:?}"),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn two_joint_chain_rotation_end_to_end() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Wave".to_string()),
        vec![rotation_channel(
            child,
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_x(FRAC_PI_2)],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let settings = ImportSettings::default().with_frame_rate(30.0);
    let report = RigImporter::new(&mut host, settings).import(&mut doc).unwrap();
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.bones, 2);

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "child").unwrap();
    let action = host.action_by_name("Wave_Armature_0").unwrap();
    assert_eq!(host.armatures[arm].action, Some(action));

    let keys = host.keyframes_of(action, bone, BoneProperty::RotationQuaternion);
    assert_eq!(keys.len(), 2);
    assert!(approx(keys[1].frame, 30.0));
    assert_eq!(keys[1].group, "rotation");
    assert!(keys.iter().all(|k| k.interpolation == KeyframeInterpolation::Linear));

    match keys[1].value {
        PoseValue::Rotation(q) => {
            let expected = Quat::from_rotation_x(FRAC_PI_2);
            assert!(q.abs_diff_eq(expected, EPSILON) || q.abs_diff_eq(-expected, EPSILON), "{q:?}");
        }
        other => panic!("unexpected value {other:?}"),
    }
    assert_eq!(host.mode_violations(), 0);
}

#[test]
fn single_rotation_key_end_to_end() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Raise".to_string()),
        vec![rotation_channel(
            child,
            vec![1.0],
            vec![Quat::from_rotation_x(FRAC_PI_2)],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let settings = ImportSettings::default().with_frame_rate(30.0);
    let report = RigImporter::new(&mut host, settings).import(&mut doc).unwrap();
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.keyframes, 1);

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "child").unwrap();
    let action = host.action_by_name("Raise_Armature_0").unwrap();

    let keys = host.keyframes_of(action, bone, BoneProperty::RotationQuaternion);
    assert_eq!(keys.len(), 1);
    assert!(approx(keys[0].frame, 30.0));
    assert_eq!(keys[0].interpolation, KeyframeInterpolation::Linear);
    match keys[0].value {
        PoseValue::Rotation(q) => {
            let expected = Quat::from_rotation_x(FRAC_PI_2);
            assert!(q.abs_diff_eq(expected, EPSILON) || q.abs_diff_eq(-expected, EPSILON), "{q:?}");
        }
        other => panic!("unexpected value {other:?}"),
    }
    assert_eq!(host.mode_violations(), 0);
}

#[test]
fn repeated_key_times_count_once() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Hold".to_string()),
        vec![translation_channel(
            child,
            vec![0.0, 0.5, 0.5, 1.0],
            vec![Vec3::new(0.0, 1.0, 0.0); 4],
            Interpolation::Step,
        )],
    ));

    let mut host = MemoryHost::new();
    let report = RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "child").unwrap();
    let action = host.action_by_name("Hold_Armature_0").unwrap();
    let keys = host.keyframes_of(action, bone, BoneProperty::Location);

    assert_eq!(keys.len(), 3);
    assert_eq!(report.keyframes, keys.len());
    let frames: Vec<f32> = keys.iter().map(|k| k.frame).collect();
    assert_eq!(frames, vec![0.0, 12.0, 24.0]);
}

#[test]
fn interpolation_is_applied_per_channel() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Mixed".to_string()),
        vec![
            translation_channel(
                child,
                vec![0.0, 1.0],
                vec![Vec3::new(0.0, 1.0, 0.0); 2],
                Interpolation::Step,
            ),
            // Cubic-spline values carry in/out tangents around each key.
            rotation_channel(
                child,
                vec![0.0, 1.0],
                vec![
                    Quat::IDENTITY,
                    Quat::IDENTITY,
                    Quat::IDENTITY,
                    Quat::IDENTITY,
                    Quat::from_rotation_y(0.5),
                    Quat::IDENTITY,
                ],
                Interpolation::CubicSpline,
            ),
        ],
    ));

    let mut host = MemoryHost::new();
    RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "child").unwrap();
    let action = host.action_by_name("Mixed_Armature_0").unwrap();

    let location = host.keyframes_of(action, bone, BoneProperty::Location);
    let rotation = host.keyframes_of(action, bone, BoneProperty::RotationQuaternion);
    assert_eq!(location.len(), 2);
    assert_eq!(rotation.len(), 2);
    assert!(location.iter().all(|k| k.interpolation == KeyframeInterpolation::Constant));
    assert!(rotation.iter().all(|k| k.interpolation == KeyframeInterpolation::Bezier));

    // glTF +Y is target +Z.
    match rotation[1].value {
        PoseValue::Rotation(q) => assert!(q.abs_diff_eq(Quat::from_rotation_z(0.5), EPSILON), "{q:?}"),
        other => panic!("unexpected value {other:?}"),
    }
}

#[test]
fn existing_action_is_reused() {
    let (mut doc, root, _) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Idle".to_string()),
        vec![rotation_channel(
            root,
            vec![0.0],
            vec![Quat::IDENTITY],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let existing = host.create_action("Idle_Armature_0");

    RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();

    assert_eq!(host.actions.len(), 1);
    let arm = host.armature_by_name("Armature_0").unwrap();
    assert_eq!(host.armatures[arm].action, Some(existing));
    assert_eq!(host.actions[existing].keyframes.len(), 1);
}

#[test]
fn unnamed_animation_uses_index_name() {
    let (mut doc, root, _) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        None,
        vec![rotation_channel(root, vec![0.0], vec![Quat::IDENTITY], Interpolation::Step)],
    ));

    let mut host = MemoryHost::new();
    RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();
    assert!(host.action_by_name("Animation_0_Armature_0").is_some());
}

#[test]
fn hemisphere_continuity_flips_keys() {
    let (mut doc, root, _) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Spin".to_string()),
        vec![rotation_channel(
            root,
            vec![0.0, 1.0, 2.0],
            vec![
                Quat::from_rotation_z(0.1),
                -Quat::from_rotation_z(0.2),
                Quat::from_rotation_z(0.3),
            ],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let settings = ImportSettings::default().with_rotation_continuity(RotationContinuity::Hemisphere);
    RigImporter::new(&mut host, settings).import(&mut doc).unwrap();

    let arm = host.armature_by_name("Armature_0").unwrap();
    let bone = host.bone_by_name(arm, "root").unwrap();
    let action = host.action_by_name("Spin_Armature_0").unwrap();
    let rotations: Vec<Quat> = host
        .keyframes_of(action, bone, BoneProperty::RotationQuaternion)
        .iter()
        .filter_map(|k| match k.value {
            PoseValue::Rotation(q) => Some(q),
            _ => None,
        })
        .collect();

    assert_eq!(rotations.len(), 3);
    for pair in rotations.windows(2) {
        assert!(pair[0].dot(pair[1]) > 0.0, "{pair:?}");
    }
}

#[test]
fn malformed_channel_is_reported_and_skipped() {
    let (mut doc, _, child) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Broken".to_string()),
        vec![translation_channel(
            child,
            vec![0.0, 1.0],
            vec![Vec3::ZERO],
            Interpolation::Linear,
        )],
    ));

    let mut host = MemoryHost::new();
    let report = RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();

    assert_eq!(report.keyframes, 0);
    assert!(report.issues.iter().any(|i| matches!(
        i,
        ImportIssue::MalformedChannel {
            path: ChannelPath::Translation,
            ..
        }
    )));
}

#[test]
fn channel_on_plain_node_is_skipped_silently() {
    let (mut doc, _, _) = two_joint_chain();
    let prop = doc.add_node(Some("prop"), Trs::IDENTITY);
    doc.add_animation(Animation::new(
        0,
        Some("Prop".to_string()),
        vec![translation_channel(prop, vec![0.0], vec![Vec3::ONE], Interpolation::Linear)],
    ));

    let mut host = MemoryHost::new();
    let report = RigImporter::new(&mut host, ImportSettings::default())
        .import(&mut doc)
        .unwrap();

    assert_eq!(report.keyframes, 0);
    assert!(report.is_clean());
    assert!(host.action_by_name("Prop_Armature_0").is_none());
}

#[test]
fn animations_can_be_disabled() {
    let (mut doc, root, _) = two_joint_chain();
    doc.add_animation(Animation::new(
        0,
        Some("Idle".to_string()),
        vec![rotation_channel(root, vec![0.0], vec![Quat::IDENTITY], Interpolation::Linear)],
    ));

    let mut host = MemoryHost::new();
    let settings = ImportSettings {
        import_animations: false,
        ..ImportSettings::default()
    };
    let report = RigImporter::new(&mut host, settings).import(&mut doc).unwrap();

    assert_eq!(report.keyframes, 0);
    assert!(host.actions.is_empty());
}
