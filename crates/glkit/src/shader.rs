//! A linked program that follows its source files.
//!
//! [`Shader`] owns one program plus the two paths it was built from and the
//! modification times seen when it was last built. The render loop calls
//! [`Shader::check_for_changes`] once per frame; when either file's time
//! differs from the stored one the program is relinked and swapped in place.
//!
//! A failed relink never escapes as an error and never disturbs the running
//! program: the old program, the old times and the old paths all stay as they
//! were, and the failure is logged and handed back in [`ReloadOutcome`].
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use kitconfig::ReloadSettings;

use crate::backend::GlBackend;
use crate::compile::create_program;
use crate::error::{GlError, Result};
use crate::handles::ProgramId;
use crate::watch::{FsProbe, ModificationProbe, SourceWatcher};

#[derive(Debug)]
pub enum ReloadOutcome {
    /// Neither source file moved.
    Unchanged,
    /// The sources changed and the new program replaced `previous`.
    Reloaded {
        previous: ProgramId,
        current: ProgramId,
    },
    /// The sources changed but could not be built; the old program is kept.
    Failed(GlError),
}

impl ReloadOutcome {
    pub fn is_reloaded(&self) -> bool {
        matches!(self, Self::Reloaded { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Revision {
    vertex: SystemTime,
    fragment: SystemTime,
}

#[derive(Debug)]
pub struct Shader {
    program: ProgramId,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
    built_from: Revision,
    settings: ReloadSettings,
    failed_revision: Option<Revision>,
    released: bool,
}

fn observe(probe: &impl ModificationProbe, path: &Path) -> Result<SystemTime> {
    probe.modified(path).map_err(|source| GlError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    })
}

impl Shader {
    pub fn new(
        gl: &impl GlBackend,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        Self::with_settings(gl, vertex_path, fragment_path, ReloadSettings::default())
    }

    pub fn with_settings(
        gl: &impl GlBackend,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
        settings: ReloadSettings,
    ) -> Result<Self> {
        Self::with_probe(gl, vertex_path, fragment_path, settings, &FsProbe)
    }

    /// Builds the initial program, taking modification times from `probe`.
    ///
    /// Times are sampled before the sources are read, so an edit racing with
    /// construction shows up as a change on the first check.
    pub fn with_probe(
        gl: &impl GlBackend,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
        settings: ReloadSettings,
        probe: &impl ModificationProbe,
    ) -> Result<Self> {
        let vertex_path = vertex_path.into();
        let fragment_path = fragment_path.into();
        let built_from = Revision {
            vertex: observe(probe, &vertex_path)?,
            fragment: observe(probe, &fragment_path)?,
        };
        let program = create_program(gl, &vertex_path, &fragment_path)?;

        Ok(Self {
            program,
            vertex_path,
            fragment_path,
            built_from,
            settings,
            failed_revision: None,
            released: false,
        })
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }

    /// `(vertex, fragment)` times the current program was built from.
    pub fn modification_times(&self) -> (SystemTime, SystemTime) {
        (self.built_from.vertex, self.built_from.fragment)
    }

    /// Binds the program for subsequent draw calls.
    pub fn use_program(&self, gl: &impl GlBackend) {
        gl.use_program(Some(self.program));
    }

    /// Sets a float uniform on the currently bound program.
    ///
    /// Names the linker optimised away resolve to nothing and are ignored.
    pub fn set_float(&self, gl: &impl GlBackend, name: &str, value: f32) {
        match gl.uniform_location(self.program, name) {
            Some(location) => gl.uniform_1_f32(location, value),
            None => tracing::trace!(program = %self.program, name, "uniform not found"),
        }
    }

    pub fn check_for_changes(&mut self, gl: &impl GlBackend) -> ReloadOutcome {
        self.check_for_changes_with(gl, &FsProbe)
    }

    /// Stats each source once and relinks if either time differs.
    pub fn check_for_changes_with(
        &mut self,
        gl: &impl GlBackend,
        probe: &impl ModificationProbe,
    ) -> ReloadOutcome {
        let observed = match (
            observe(probe, &self.vertex_path),
            observe(probe, &self.fragment_path),
        ) {
            (Ok(vertex), Ok(fragment)) => Revision { vertex, fragment },
            (Err(err), _) | (_, Err(err)) => {
                tracing::warn!(error = %err, "cannot stat shader source; keeping current program");
                return ReloadOutcome::Failed(err);
            }
        };

        if observed == self.built_from {
            return ReloadOutcome::Unchanged;
        }

        match create_program(gl, &self.vertex_path, &self.fragment_path) {
            Ok(current) => {
                let previous = std::mem::replace(&mut self.program, current);
                gl.delete_program(previous);
                if self.settings.refresh_timestamps {
                    self.built_from = observed;
                }
                self.failed_revision = None;
                tracing::info!(
                    %previous,
                    %current,
                    vertex = %self.vertex_path.display(),
                    fragment = %self.fragment_path.display(),
                    "reloaded shader program"
                );
                ReloadOutcome::Reloaded { previous, current }
            }
            Err(err) => {
                if self.failed_revision == Some(observed) {
                    tracing::debug!(error = %err, "shader sources still fail to build");
                } else {
                    tracing::warn!(
                        vertex = %self.vertex_path.display(),
                        fragment = %self.fragment_path.display(),
                        error = %err,
                        "shader reload failed; keeping current program"
                    );
                }
                self.failed_revision = Some(observed);
                ReloadOutcome::Failed(err)
            }
        }
    }

    /// Runs [`Shader::check_for_changes`] only if `watcher` reported an edit
    /// since the last call.
    pub fn reload_if_signalled(
        &mut self,
        gl: &impl GlBackend,
        watcher: &SourceWatcher,
    ) -> ReloadOutcome {
        let signals = watcher.drain();
        if signals.is_empty() {
            return ReloadOutcome::Unchanged;
        }
        tracing::trace!(count = signals.len(), "source watcher signalled");
        self.check_for_changes(gl)
    }

    /// Deletes the program. Consuming `self` makes a second delete impossible.
    pub fn destroy(mut self, gl: &impl GlBackend) {
        gl.delete_program(self.program);
        self.released = true;
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                program = %self.program,
                "shader dropped without destroy(); program leaked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::fs;
    use std::io;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::recording::{GlCall, RecordingGl};

    const VERTEX: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FRAGMENT: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
    const BROKEN: &str = "#version 330 core\nvoid main() { c = vec4(1.0);\n";

    #[derive(Default)]
    struct StubProbe {
        times: RefCell<HashMap<PathBuf, SystemTime>>,
        stats: Cell<usize>,
    }

    impl StubProbe {
        fn touch(&self, path: &Path, secs: u64) {
            self.times.borrow_mut().insert(
                path.to_path_buf(),
                SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            );
        }
    }

    impl ModificationProbe for StubProbe {
        fn modified(&self, path: &Path) -> io::Result<SystemTime> {
            self.stats.set(self.stats.get() + 1);
            self.times
                .borrow()
                .get(path)
                .copied()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    struct Fixture {
        _dir: TempDir,
        vert: PathBuf,
        frag: PathBuf,
        probe: StubProbe,
        gl: RecordingGl,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let vert = dir.path().join("quad.vert");
        let frag = dir.path().join("quad.frag");
        fs::write(&vert, VERTEX).unwrap();
        fs::write(&frag, FRAGMENT).unwrap();
        let probe = StubProbe::default();
        probe.touch(&vert, 100);
        probe.touch(&frag, 100);
        Fixture {
            _dir: dir,
            vert,
            frag,
            probe,
            gl: RecordingGl::new(),
        }
    }

    impl Fixture {
        fn shader(&self, settings: ReloadSettings) -> Shader {
            Shader::with_probe(&self.gl, &self.vert, &self.frag, settings, &self.probe).unwrap()
        }
    }

    #[test]
    fn use_binds_current_program() {
        let fx = fixture();
        let shader = fx.shader(ReloadSettings::default());
        fx.gl.clear_calls();

        shader.use_program(&fx.gl);

        assert_eq!(fx.gl.calls(), vec![GlCall::UseProgram(Some(shader.program()))]);
        shader.destroy(&fx.gl);
    }

    #[test]
    fn broken_source_fails_construction_without_leaks() {
        let fx = fixture();
        fs::write(&fx.frag, BROKEN).unwrap();

        let err = Shader::with_probe(
            &fx.gl,
            &fx.vert,
            &fx.frag,
            ReloadSettings::default(),
            &fx.probe,
        )
        .unwrap_err();

        assert!(matches!(err, GlError::ShaderCompile { .. }));
        assert_eq!(fx.gl.live_shaders(), 0);
        assert!(fx.gl.live_programs().is_empty());
    }

    #[test]
    fn unchanged_sources_stat_once_each_and_never_relink() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());
        let links = fx.gl.link_count();

        for _ in 0..2 {
            fx.probe.stats.set(0);
            assert!(matches!(
                shader.check_for_changes_with(&fx.gl, &fx.probe),
                ReloadOutcome::Unchanged
            ));
            assert_eq!(fx.probe.stats.get(), 2);
        }

        assert_eq!(fx.gl.link_count(), links);
        shader.destroy(&fx.gl);
    }

    #[test]
    fn vertex_edit_reloads_exactly_once() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());
        let original = shader.program();

        fx.probe.touch(&fx.vert, 200);
        let outcome = shader.check_for_changes_with(&fx.gl, &fx.probe);

        match outcome {
            ReloadOutcome::Reloaded { previous, current } => {
                assert_eq!(previous, original);
                assert_eq!(current, shader.program());
                assert_ne!(current, original);
            }
            other => panic!("expected reload, got {other:?}"),
        }
        assert_eq!(
            shader.modification_times().0,
            SystemTime::UNIX_EPOCH + Duration::from_secs(200)
        );
        assert_eq!(fx.gl.live_programs(), vec![shader.program()]);

        assert!(matches!(
            shader.check_for_changes_with(&fx.gl, &fx.probe),
            ReloadOutcome::Unchanged
        ));
        shader.destroy(&fx.gl);
    }

    #[test]
    fn older_timestamp_still_counts_as_change() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());

        fx.probe.touch(&fx.frag, 50);

        assert!(shader
            .check_for_changes_with(&fx.gl, &fx.probe)
            .is_reloaded());
        shader.destroy(&fx.gl);
    }

    #[test]
    fn failed_reload_keeps_program_and_times() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());
        let original = shader.program();
        let times = shader.modification_times();

        fs::write(&fx.frag, BROKEN).unwrap();
        fx.probe.touch(&fx.frag, 300);
        let outcome = shader.check_for_changes_with(&fx.gl, &fx.probe);

        assert!(matches!(
            outcome,
            ReloadOutcome::Failed(GlError::ShaderCompile { .. })
        ));
        assert_eq!(shader.program(), original);
        assert_eq!(shader.modification_times(), times);
        assert_eq!(fx.gl.live_programs(), vec![original]);

        fx.gl.clear_calls();
        shader.use_program(&fx.gl);
        assert_eq!(fx.gl.calls(), vec![GlCall::UseProgram(Some(original))]);
        shader.destroy(&fx.gl);
    }

    #[test]
    fn link_failure_during_reload_is_contained() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());
        let original = shader.program();

        fx.gl.fail_next_link("error: too many varyings");
        fx.probe.touch(&fx.vert, 400);

        assert!(matches!(
            shader.check_for_changes_with(&fx.gl, &fx.probe),
            ReloadOutcome::Failed(GlError::ProgramLink { .. })
        ));
        assert_eq!(shader.program(), original);

        // The same revision is retried on the next check and now links.
        assert!(shader
            .check_for_changes_with(&fx.gl, &fx.probe)
            .is_reloaded());
        shader.destroy(&fx.gl);
    }

    #[test]
    fn vanished_source_is_reported_not_raised() {
        let fx = fixture();
        let mut shader = fx.shader(ReloadSettings::default());
        fx.probe.times.borrow_mut().remove(&fx.vert);

        assert!(matches!(
            shader.check_for_changes_with(&fx.gl, &fx.probe),
            ReloadOutcome::Failed(GlError::ShaderLoad { .. })
        ));
        shader.destroy(&fx.gl);
    }

    #[test]
    fn stale_timestamps_relink_on_every_check() {
        let fx = fixture();
        let settings = ReloadSettings {
            refresh_timestamps: false,
            ..ReloadSettings::default()
        };
        let mut shader = fx.shader(settings);

        fx.probe.touch(&fx.vert, 500);

        assert!(shader.check_for_changes_with(&fx.gl, &fx.probe).is_reloaded());
        assert!(shader.check_for_changes_with(&fx.gl, &fx.probe).is_reloaded());
        assert_eq!(fx.gl.live_programs().len(), 1);
        shader.destroy(&fx.gl);
    }

    #[test]
    fn set_float_targets_known_uniforms_only() {
        let fx = fixture();
        fx.gl.declare_uniform("u_time");
        let shader = fx.shader(ReloadSettings::default());
        fx.gl.clear_calls();

        shader.set_float(&fx.gl, "u_time", 1.5);
        shader.set_float(&fx.gl, "u_missing", 2.0);

        assert_eq!(
            fx.gl.calls(),
            vec![GlCall::Uniform1f(crate::handles::UniformLocation(0), 1.5)]
        );
        shader.destroy(&fx.gl);
    }

    #[test]
    fn destroy_deletes_program_once() {
        let fx = fixture();
        let shader = fx.shader(ReloadSettings::default());
        let program = shader.program();

        shader.destroy(&fx.gl);

        let deletes = fx
            .gl
            .calls()
            .into_iter()
            .filter(|call| *call == GlCall::DeleteProgram(program))
            .count();
        assert_eq!(deletes, 1);
        assert!(fx.gl.live_programs().is_empty());
    }
}
