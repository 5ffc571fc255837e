use crate::document::Document;
use crate::errors::{ImportIssue, ImportLog, Result, Severity};
use crate::host::SceneHost;
use crate::rig::bind_pose::{BindPoseBuilder, BuiltArmature};
use crate::rig::player::AnimationPlayer;
use crate::rig::reconcile::PoseReconciler;
use crate::rig::skin_binder::SkinBinder;
use crate::rig::texture;
use crate::settings::ImportSettings;

/// Summary of one import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Final armature names, in skin order.
    pub armatures: Vec<String>,
    pub bones: usize,
    pub keyframes: usize,
    pub weight_assignments: usize,
    pub issues: Vec<ImportIssue>,
}

impl ImportReport {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity() == Severity::Error)
            .count()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Imports the rigs of a document into a host scene.
///
/// ```rust,ignore
/// let mut host = MemoryHost::new();
/// let report = RigImporter::new(&mut host, ImportSettings::default()).import(&mut document)?;
/// ```
pub struct RigImporter<'h, H: SceneHost> {
    host: &'h mut H,
    settings: ImportSettings,
}

impl<'h, H: SceneHost> RigImporter<'h, H> {
    pub fn new(host: &'h mut H, settings: ImportSettings) -> Self {
        Self { host, settings }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Validates `document`, then builds every skin (armature, bind pose,
    /// vertex groups, weights, modifier) before playing the animations.
    ///
    /// Only document validation fails the import; per-joint, per-primitive
    /// and per-channel problems end up in [`ImportReport::issues`].
    pub fn import(&mut self, document: &mut Document) -> Result<ImportReport> {
        document.validate()?;

        let reconciler = PoseReconciler::new(self.settings.rotation_continuity);
        let policy = self.settings.non_joint_parent;
        let mut log = ImportLog::new();
        let mut report = ImportReport::default();

        let mut armatures: Vec<BuiltArmature<H>> = Vec::with_capacity(document.skins.len());
        for skin_index in 0..document.skins.len() {
            let built =
                BindPoseBuilder::new(&mut *self.host, reconciler, policy).build(document, skin_index, &mut log);

            report.weight_assignments += SkinBinder::new(&mut *self.host).bind(
                document,
                &built,
                self.settings.import_skin_weights,
                &mut log,
            );

            report.bones += built.bones.len();
            report.armatures.push(built.name.clone());
            armatures.push(built);
        }

        if self.settings.import_animations {
            let mut player =
                AnimationPlayer::new(&mut *self.host, reconciler, policy, self.settings.frame_rate);
            for animation in &document.animations {
                report.keyframes += player.play(document, animation, &armatures, &mut log);
            }
        }

        report.issues = log.into_issues();
        log::info!(
            "Imported {} armatures, {} bones, {} keyframes, {} weights ({} issues)",
            report.armatures.len(),
            report.bones,
            report.keyframes,
            report.weight_assignments,
            report.issues.len()
        );
        Ok(report)
    }

    /// See [`texture::wire_texture`].
    pub fn wire_texture(
        &mut self,
        document: &Document,
        texture: usize,
        material: H::Material,
        label: Option<&str>,
    ) -> Option<H::TextureNode> {
        texture::wire_texture(&mut *self.host, document, texture, material, label)
    }
}
