use std::path::Path;

use crate::device::{GpuDriver, ProgramHandle, ShaderHandle, ShaderStage};

use super::{read_source, ShaderError};

/// Builds shader programs through a [`GpuDriver`].
///
/// Shader objects never outlive the call that created them: a failed compile
/// deletes its shader, and linking detaches and deletes both stages whatever
/// the outcome. The caller owns only the returned program.
pub struct ShaderCompiler<'d, D: GpuDriver + ?Sized> {
    driver: &'d mut D,
}

impl<'d, D: GpuDriver + ?Sized> ShaderCompiler<'d, D> {
    pub fn new(driver: &'d mut D) -> Self {
        Self { driver }
    }

    /// Creates and compiles one stage.
    pub fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        let shader = self
            .driver
            .create_shader(stage)
            .ok_or(ShaderError::Create { what: stage.name() })?;

        self.driver.compile_shader(shader, source);
        if self.driver.shader_compiled(shader) {
            log::debug!("compiled {stage} {shader:?}");
            return Ok(shader);
        }

        let log = self.driver.shader_info_log(shader);
        log::error!("::{stage}: compilation failed\n{log}");
        self.driver.delete_shader(shader);
        Err(ShaderError::Compile { stage, log })
    }

    /// Links two compiled stages into a program.
    ///
    /// Takes ownership of both shaders: they are detached and deleted before
    /// this returns, linked or not.
    pub fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, ShaderError> {
        let Some(program) = self.driver.create_program() else {
            self.driver.delete_shader(vertex);
            self.driver.delete_shader(fragment);
            return Err(ShaderError::Create { what: "shader program" });
        };

        self.driver.attach_shader(program, vertex);
        self.driver.attach_shader(program, fragment);
        self.driver.link_program(program);
        let linked = self.driver.program_linked(program);

        self.driver.detach_shader(program, vertex);
        self.driver.detach_shader(program, fragment);
        self.driver.delete_shader(vertex);
        self.driver.delete_shader(fragment);

        if linked {
            log::debug!("linked {program:?}");
            return Ok(program);
        }

        let log = self.driver.program_info_log(program);
        log::error!("::Error: shader program linking failed\n{log}");
        self.driver.delete_program(program);
        Err(ShaderError::Link { log })
    }

    /// Reads, compiles and links a vertex/fragment pair.
    ///
    /// Both files are read before the driver is touched.
    pub fn create_program_from_files(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<ProgramHandle, ShaderError> {
        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;

        let vertex = self.compile_shader(ShaderStage::Vertex, &vertex_source)?;
        let fragment = match self.compile_shader(ShaderStage::Fragment, &fragment_source) {
            Ok(f) => f,
            Err(e) => {
                self.driver.delete_shader(vertex);
                return Err(e);
            }
        };

        self.link_program(vertex, fragment)
    }

    /// Releases a program. The handle is consumed so it cannot be deleted twice.
    pub fn delete_program(&mut self, program: ProgramHandle) {
        self.driver.use_program(None);
        self.driver.delete_program(program);
        log::debug!("deleted {program:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{Call, MockDriver};
    use std::fs;
    use std::path::PathBuf;

    const VS: &str = "@vertex fn vs_main() {}";
    const FS: &str = "@fragment fn fs_main() {}";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("enginger-compiler-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn valid_source_compiles() {
        let mut driver = MockDriver::new();
        let shader = ShaderCompiler::new(&mut driver)
            .compile_shader(ShaderStage::Vertex, VS)
            .unwrap();
        assert!(driver.shader_compiled(shader));
    }

    #[test]
    fn invalid_source_leaves_no_shader_object() {
        let mut driver = MockDriver::new().reject_source("oops", "0:1: syntax error");
        let err = ShaderCompiler::new(&mut driver)
            .compile_shader(ShaderStage::Fragment, "oops")
            .unwrap_err();

        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert_eq!(log, "0:1: syntax error");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
        assert!(driver.shaders.is_empty());
    }

    #[test]
    fn long_info_log_is_not_truncated() {
        let long = "x".repeat(4096);
        let mut driver = MockDriver::new().reject_source("bad", &long);
        let err = ShaderCompiler::new(&mut driver)
            .compile_shader(ShaderStage::Vertex, "bad")
            .unwrap_err();
        assert!(matches!(err, ShaderError::Compile { log, .. } if log.len() == 4096));
    }

    #[test]
    fn exhausted_driver_reports_create_error() {
        let mut driver = MockDriver::new().allocation_budget(0);
        let err = ShaderCompiler::new(&mut driver)
            .compile_shader(ShaderStage::Vertex, VS)
            .unwrap_err();
        assert!(matches!(err, ShaderError::Create { .. }));
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_disposes_both_shaders() {
        let mut driver = MockDriver::new();
        let mut compiler = ShaderCompiler::new(&mut driver);
        let v = compiler.compile_shader(ShaderStage::Vertex, VS).unwrap();
        let f = compiler.compile_shader(ShaderStage::Fragment, FS).unwrap();
        let program = compiler.link_program(v, f).unwrap();

        assert!(driver.program_linked(program));
        assert!(driver.shaders.is_empty());
        assert!(driver.programs[&program.raw()].attached.is_empty());
        assert!(driver.calls.contains(&Call::DetachShader(program.raw(), v.raw())));
        assert!(driver.calls.contains(&Call::DetachShader(program.raw(), f.raw())));
    }

    #[test]
    fn link_failure_deletes_program_and_shaders() {
        let mut driver = MockDriver::new().fail_link("varying mismatch");
        let mut compiler = ShaderCompiler::new(&mut driver);
        let v = compiler.compile_shader(ShaderStage::Vertex, VS).unwrap();
        let f = compiler.compile_shader(ShaderStage::Fragment, FS).unwrap();
        let err = compiler.link_program(v, f).unwrap_err();

        assert!(matches!(err, ShaderError::Link { ref log } if log == "varying mismatch"));
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn delete_program_unbinds_and_releases() {
        let mut driver = MockDriver::new();
        let mut compiler = ShaderCompiler::new(&mut driver);
        let v = compiler.compile_shader(ShaderStage::Vertex, VS).unwrap();
        let f = compiler.compile_shader(ShaderStage::Fragment, FS).unwrap();
        let program = compiler.link_program(v, f).unwrap();
        compiler.delete_program(program);

        assert_eq!(driver.live_objects(), 0);
        assert_eq!(driver.current_program, None);
    }

    // ── from files ────────────────────────────────────────────────────────

    #[test]
    fn program_from_files() {
        let dir = scratch_dir("files");
        fs::write(dir.join("v.wgsl"), VS).unwrap();
        fs::write(dir.join("f.wgsl"), FS).unwrap();

        let mut driver = MockDriver::new();
        let program = ShaderCompiler::new(&mut driver)
            .create_program_from_files(dir.join("v.wgsl"), dir.join("f.wgsl"))
            .unwrap();

        assert!(driver.program_linked(program));
        assert_eq!(driver.live_objects(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_vertex_file_makes_no_driver_call() {
        let dir = scratch_dir("missing-vertex");
        fs::write(dir.join("f.wgsl"), FS).unwrap();

        let mut driver = MockDriver::new();
        let err = ShaderCompiler::new(&mut driver)
            .create_program_from_files(dir.join("v.wgsl"), dir.join("f.wgsl"))
            .unwrap_err();

        assert!(matches!(err, ShaderError::Read { .. }));
        assert!(driver.calls.is_empty());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn failed_fragment_releases_vertex_shader() {
        let dir = scratch_dir("bad-fragment");
        fs::write(dir.join("v.wgsl"), VS).unwrap();
        fs::write(dir.join("f.wgsl"), "broken").unwrap();

        let mut driver = MockDriver::new().reject_source("broken", "error");
        let err = ShaderCompiler::new(&mut driver)
            .create_program_from_files(dir.join("v.wgsl"), dir.join("f.wgsl"))
            .unwrap_err();

        assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Fragment, .. }));
        assert_eq!(driver.live_objects(), 0);
        fs::remove_dir_all(dir).unwrap();
    }
}
